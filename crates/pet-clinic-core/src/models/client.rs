//! Client (owner + pet) models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Kind of pet a client brings in. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    Dog,
    Cat,
    Parrot,
}

impl PetType {
    /// Every pet type, in display order.
    pub const ALL: [PetType; 3] = [PetType::Dog, PetType::Cat, PetType::Parrot];

    /// Wire/storage spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            PetType::Dog => "dog",
            PetType::Cat => "cat",
            PetType::Parrot => "parrot",
        }
    }
}

impl fmt::Display for PetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a string that is not one of the known pet types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pet type: {0}")]
pub struct UnknownPetType(pub String);

impl FromStr for PetType {
    type Err = UnknownPetType;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dog" => Ok(PetType::Dog),
            "cat" => Ok(PetType::Cat),
            "parrot" => Ok(PetType::Parrot),
            other => Err(UnknownPetType(other.to_string())),
        }
    }
}

/// Validated user-supplied fields of a client record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    /// Owner name
    pub name: String,
    /// Owner phone number (free-form)
    pub phone: String,
    /// Pet name
    pub pet_name: String,
    /// Pet date of birth; no range check
    pub pet_birth_date: NaiveDate,
    /// Pet kind
    pub pet_type: PetType,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub pet_name: Option<String>,
    pub pet_birth_date: Option<NaiveDate>,
    pub pet_type: Option<PetType>,
    pub notes: Option<String>,
}

impl ClientPatch {
    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.pet_name.is_none()
            && self.pet_birth_date.is_none()
            && self.pet_type.is_none()
            && self.notes.is_none()
    }

    /// Number of fields the patch will write.
    pub fn field_count(&self) -> usize {
        [
            self.name.is_some(),
            self.phone.is_some(),
            self.pet_name.is_some(),
            self.pet_birth_date.is_some(),
            self.pet_type.is_some(),
            self.notes.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// A stored client record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    /// Store-assigned UUID, hyphenated lowercase
    pub id: String,
    pub name: String,
    pub phone: String,
    pub pet_name: String,
    pub pet_birth_date: NaiveDate,
    pub pet_type: PetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Fixed at creation
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

impl ClientRecord {
    /// Build a fresh record from validated input, with a new id and both
    /// timestamps set to `now`.
    pub fn new(input: ClientInput, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(6);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            phone: input.phone,
            pet_name: input.pet_name,
            pet_birth_date: input.pet_birth_date,
            pet_type: input.pet_type,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// The user-supplied part of the record.
    pub fn input(&self) -> ClientInput {
        ClientInput {
            name: self.name.clone(),
            phone: self.phone.clone(),
            pet_name: self.pet_name.clone(),
            pet_birth_date: self.pet_birth_date,
            pet_type: self.pet_type,
            notes: self.notes.clone(),
        }
    }

    /// Apply a patch in place. Only supplied fields are replaced.
    pub fn apply(&mut self, patch: ClientPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(pet_name) = patch.pet_name {
            self.pet_name = pet_name;
        }
        if let Some(pet_birth_date) = patch.pet_birth_date {
            self.pet_birth_date = pet_birth_date;
        }
        if let Some(pet_type) = patch.pet_type {
            self.pet_type = pet_type;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
    }

    /// Refresh `updated_at`. The new value is strictly later than the old one
    /// even if the clock has not moved (or moved backwards).
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.updated_at + Duration::microseconds(1);
        self.updated_at = now.trunc_subsecs(6).max(floor);
    }
}

/// Sparse list filter. Empty strings and empty sets mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilters {
    /// Case-insensitive substring of the owner name
    pub name: Option<String>,
    /// Case-insensitive substring of the pet name
    pub pet_name: Option<String>,
    /// Allowed pet types
    pub pet_types: Vec<PetType>,
}

/// Column a listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSortBy {
    Name,
    PetName,
}

impl FromStr for ClientSortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(ClientSortBy::Name),
            "petName" => Ok(ClientSortBy::PetName),
            other => Err(format!("sortBy must be one of: name, petName (got {other})")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("sortDirection must be one of: asc, desc (got {other})")),
        }
    }
}

/// Listing order. Ties are always broken newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientOrder {
    /// `createdAt` descending
    #[default]
    Newest,
    /// Case-insensitive column sort
    By {
        sort_by: ClientSortBy,
        direction: SortDirection,
    },
}
