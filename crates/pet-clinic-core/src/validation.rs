//! Payload validation for client create/update requests.
//!
//! Input arrives as an arbitrary JSON value. Validation reads each field,
//! normalises it, and collects every problem it finds so the caller can
//! report all of them at once.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{ClientInput, ClientPatch, PetType};

/// Fields an update payload may carry.
pub const UPDATABLE_FIELDS: [&str; 6] = [
    "name",
    "phone",
    "petName",
    "petBirthDate",
    "petType",
    "notes",
];

/// Error text for a pet type outside the enumeration.
pub const PET_TYPE_MESSAGE: &str = "petType must be one of: dog, cat, parrot";

/// One or more field-level validation messages, in the order found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed: {}", .0.join("; "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    fn single(message: &str) -> Self {
        Self(vec![message.to_string()])
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }
}

pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// Validate a create payload.
pub fn validate_create(payload: &Value) -> ValidationResult<ClientInput> {
    let Some(fields) = payload.as_object() else {
        return Err(ValidationErrors::single("payload must be an object"));
    };

    let mut errors = Vec::new();
    let name = read_required_string(fields.get("name"), "name", &mut errors);
    let phone = read_required_string(fields.get("phone"), "phone", &mut errors);
    let pet_name = read_required_string(fields.get("petName"), "petName", &mut errors);
    let pet_birth_date = read_date(fields.get("petBirthDate"), "petBirthDate", &mut errors);
    let pet_type = read_pet_type(fields.get("petType"), &mut errors);
    let notes = read_optional_string(fields.get("notes"), "notes", &mut errors);

    match (pet_birth_date, pet_type) {
        (Some(pet_birth_date), Some(pet_type)) if errors.is_empty() => Ok(ClientInput {
            name,
            phone,
            pet_name,
            pet_birth_date,
            pet_type,
            notes,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

/// Validate a partial update payload.
pub fn validate_update(payload: &Value) -> ValidationResult<ClientPatch> {
    let Some(fields) = payload.as_object() else {
        return Err(ValidationErrors::single("payload must be an object"));
    };

    if fields.is_empty() {
        return Err(ValidationErrors::single(
            "at least one field must be provided for update",
        ));
    }

    let mut errors: Vec<String> = fields
        .keys()
        .filter(|key| !UPDATABLE_FIELDS.contains(&key.as_str()))
        .map(|key| format!("unknown field: {key}"))
        .collect();

    if !has_recognized_field(fields) {
        errors.push("at least one field must be provided for update".to_string());
        return Err(ValidationErrors(errors));
    }

    let mut patch = ClientPatch::default();

    if let Some(value) = fields.get("name") {
        patch.name = non_empty(read_required_string(Some(value), "name", &mut errors));
    }
    if let Some(value) = fields.get("phone") {
        patch.phone = non_empty(read_required_string(Some(value), "phone", &mut errors));
    }
    if let Some(value) = fields.get("petName") {
        patch.pet_name = non_empty(read_required_string(Some(value), "petName", &mut errors));
    }
    if let Some(value) = fields.get("petBirthDate") {
        patch.pet_birth_date = read_date(Some(value), "petBirthDate", &mut errors);
    }
    if let Some(value) = fields.get("petType") {
        patch.pet_type = read_pet_type(Some(value), &mut errors);
    }
    if let Some(value) = fields.get("notes") {
        patch.notes = read_optional_string(Some(value), "notes", &mut errors);
    }

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    // Only `notes` can vanish here: a blank note normalises to absent.
    if patch.is_empty() {
        return Err(ValidationErrors::single(
            "no valid fields were provided for update",
        ));
    }

    Ok(patch)
}

/// Parse a pet birth date: `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to
/// its UTC calendar date.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

fn has_recognized_field(fields: &Map<String, Value>) -> bool {
    fields
        .keys()
        .any(|key| UPDATABLE_FIELDS.contains(&key.as_str()))
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn read_required_string(value: Option<&Value>, field: &str, errors: &mut Vec<String>) -> String {
    match value.and_then(Value::as_str).map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => {
            errors.push(format!("{field} is required"));
            String::new()
        }
    }
}

fn read_optional_string(
    value: Option<&Value>,
    field: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    let value = value?;
    let Some(raw) = value.as_str() else {
        errors.push(format!("{field} must be a string"));
        return None;
    };
    non_empty(raw.trim().to_string())
}

fn read_pet_type(value: Option<&Value>, errors: &mut Vec<String>) -> Option<PetType> {
    let Some(raw) = value.and_then(Value::as_str) else {
        errors.push("petType is required".to_string());
        return None;
    };
    match raw.parse::<PetType>() {
        Ok(pet_type) => Some(pet_type),
        Err(_) => {
            errors.push(PET_TYPE_MESSAGE.to_string());
            None
        }
    }
}

fn read_date(value: Option<&Value>, field: &str, errors: &mut Vec<String>) -> Option<NaiveDate> {
    let Some(raw) = value.and_then(Value::as_str) else {
        errors.push(format!("{field} is required"));
        return None;
    };
    let parsed = parse_birth_date(raw);
    if parsed.is_none() {
        errors.push(format!("{field} must be a valid date"));
    }
    parsed
}
