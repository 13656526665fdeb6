//! Filter predicates for client listings.
//!
//! A [`ClientPredicate`] is built from sparse [`ClientFilters`] and is
//! independent of any store. The SQLite layer renders it to a `WHERE`
//! clause; [`ClientPredicate::matches`] evaluates it in memory.
//!
//! Substring matching lowercases both sides with full Unicode case mapping.
//! The SQLite layer calls [`contains_ignore_case`] through a registered SQL
//! function, so both evaluations agree.

use crate::models::{ClientFilters, ClientRecord, PetType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPredicate {
    /// Matches every record
    All,
    /// Case-insensitive substring of the owner name
    NameContains(String),
    /// Case-insensitive substring of the pet name
    PetNameContains(String),
    /// Pet type is one of the listed values
    PetTypeIn(Vec<PetType>),
    /// Every inner predicate matches
    And(Vec<ClientPredicate>),
}

/// Build the predicate for a set of filters.
pub fn build_filter(filters: &ClientFilters) -> ClientPredicate {
    let mut clauses = Vec::new();

    if let Some(name) = filters.name.as_deref().filter(|s| !s.is_empty()) {
        clauses.push(ClientPredicate::NameContains(name.to_string()));
    }
    if let Some(pet_name) = filters.pet_name.as_deref().filter(|s| !s.is_empty()) {
        clauses.push(ClientPredicate::PetNameContains(pet_name.to_string()));
    }
    if !filters.pet_types.is_empty() {
        let mut pet_types = filters.pet_types.clone();
        pet_types.sort();
        pet_types.dedup();
        clauses.push(ClientPredicate::PetTypeIn(pet_types));
    }

    match clauses.len() {
        0 => ClientPredicate::All,
        1 => clauses.remove(0),
        _ => ClientPredicate::And(clauses),
    }
}

impl ClientPredicate {
    /// Evaluate against a record in memory.
    pub fn matches(&self, record: &ClientRecord) -> bool {
        match self {
            ClientPredicate::All => true,
            ClientPredicate::NameContains(needle) => contains_ignore_case(&record.name, needle),
            ClientPredicate::PetNameContains(needle) => {
                contains_ignore_case(&record.pet_name, needle)
            }
            ClientPredicate::PetTypeIn(pet_types) => pet_types.contains(&record.pet_type),
            ClientPredicate::And(inner) => inner.iter().all(|p| p.matches(record)),
        }
    }
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
