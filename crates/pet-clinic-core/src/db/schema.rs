//! SQLite schema definition.

/// Complete database schema for the pet clinic.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Clients (owner + pet)
-- ============================================================================

CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,                         -- UUID, hyphenated lowercase
    name TEXT NOT NULL CHECK (length(name) > 0),
    phone TEXT NOT NULL CHECK (length(phone) > 0),
    pet_name TEXT NOT NULL CHECK (length(pet_name) > 0),
    pet_birth_date TEXT NOT NULL,                -- YYYY-MM-DD
    pet_type TEXT NOT NULL CHECK (pet_type IN ('dog', 'cat', 'parrot')),
    notes TEXT,
    created_at TEXT NOT NULL,                    -- RFC 3339, microseconds, UTC
    updated_at TEXT NOT NULL,
    CHECK (created_at <= updated_at)
);

CREATE INDEX IF NOT EXISTS idx_clients_created_at ON clients(created_at);
CREATE INDEX IF NOT EXISTS idx_clients_name ON clients(name COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_clients_pet_name ON clients(pet_name COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_clients_pet_type ON clients(pet_type);
"#;
