//! Client database operations.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{
    ClientOrder, ClientPatch, ClientRecord, ClientSortBy, PetType, SortDirection,
};
use crate::query::{contains_ignore_case, ClientPredicate};

/// SQL function `contains_ci(haystack, needle)` backing the name filters.
const CONTAINS_CI: &str = "contains_ci";

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, phone, pet_name, pet_birth_date, pet_type,
           notes, created_at, updated_at
    FROM clients
"#;

impl Database {
    /// Insert a new client.
    pub fn insert_client(&self, client: &ClientRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO clients (
                id, name, phone, pet_name, pet_birth_date, pet_type,
                notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                client.id,
                client.name,
                client.phone,
                client.pet_name,
                format_date(client.pet_birth_date),
                client.pet_type.as_str(),
                client.notes,
                format_timestamp(client.created_at),
                format_timestamp(client.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Get a client by ID.
    pub fn get_client(&self, id: &str) -> DbResult<Option<ClientRecord>> {
        select_client(&self.conn, id)
    }

    /// List clients matching a predicate.
    pub fn list_clients(
        &self,
        predicate: &ClientPredicate,
        order: ClientOrder,
    ) -> DbResult<Vec<ClientRecord>> {
        let mut bound = Vec::new();
        let where_sql = render_predicate(predicate, &mut bound);
        let sql = format!(
            "{SELECT_COLUMNS} WHERE {where_sql} ORDER BY {}",
            order_by(order)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bound), ClientRow::from_row)?;

        let mut clients = Vec::new();
        for row in rows {
            clients.push(row?.try_into()?);
        }
        Ok(clients)
    }

    /// Apply a partial update and return the stored post-image.
    ///
    /// Returns `None` if no client has this ID.
    pub fn update_client(
        &mut self,
        id: &str,
        patch: ClientPatch,
        now: DateTime<Utc>,
    ) -> DbResult<Option<ClientRecord>> {
        let tx = self.conn.transaction()?;

        let Some(mut client) = select_client(&tx, id)? else {
            return Ok(None);
        };
        client.apply(patch);
        client.touch(now);

        tx.execute(
            r#"
            UPDATE clients SET
                name = ?2,
                phone = ?3,
                pet_name = ?4,
                pet_birth_date = ?5,
                pet_type = ?6,
                notes = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
            params![
                client.id,
                client.name,
                client.phone,
                client.pet_name,
                format_date(client.pet_birth_date),
                client.pet_type.as_str(),
                client.notes,
                format_timestamp(client.updated_at),
            ],
        )?;

        let stored = select_client(&tx, id)?;
        tx.commit()?;
        Ok(stored)
    }

    /// Delete a client.
    pub fn delete_client(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM clients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Count all clients.
    pub fn count_clients(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Register the SQL functions client queries rely on.
pub(super) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CONTAINS_CI,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx: &Context<'_>| {
            let haystack: Option<String> = ctx.get(0)?;
            let needle: String = ctx.get(1)?;
            Ok(haystack.is_some_and(|h| contains_ignore_case(&h, &needle)))
        },
    )
}

fn select_client(conn: &Connection, id: &str) -> DbResult<Option<ClientRecord>> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?"),
        [id],
        ClientRow::from_row,
    )
    .optional()?
    .map(|row| row.try_into())
    .transpose()
}

/// Render a predicate as a SQL boolean expression, pushing bound values.
fn render_predicate(predicate: &ClientPredicate, bound: &mut Vec<Value>) -> String {
    match predicate {
        ClientPredicate::All => "1".to_string(),
        ClientPredicate::NameContains(needle) => {
            bound.push(Value::Text(needle.clone()));
            format!("{CONTAINS_CI}(name, ?)")
        }
        ClientPredicate::PetNameContains(needle) => {
            bound.push(Value::Text(needle.clone()));
            format!("{CONTAINS_CI}(pet_name, ?)")
        }
        ClientPredicate::PetTypeIn(pet_types) if pet_types.is_empty() => "0".to_string(),
        ClientPredicate::PetTypeIn(pet_types) => {
            let placeholders = vec!["?"; pet_types.len()].join(", ");
            bound.extend(
                pet_types
                    .iter()
                    .map(|pet_type| Value::Text(pet_type.as_str().to_string())),
            );
            format!("pet_type IN ({placeholders})")
        }
        ClientPredicate::And(inner) if inner.is_empty() => "1".to_string(),
        ClientPredicate::And(inner) => inner
            .iter()
            .map(|p| format!("({})", render_predicate(p, bound)))
            .collect::<Vec<_>>()
            .join(" AND "),
    }
}

fn order_by(order: ClientOrder) -> String {
    let newest = "created_at DESC, rowid DESC";
    match order {
        ClientOrder::Newest => newest.to_string(),
        ClientOrder::By { sort_by, direction } => {
            let column = match sort_by {
                ClientSortBy::Name => "name",
                ClientSortBy::PetName => "pet_name",
            };
            let direction = match direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            format!("{column} COLLATE NOCASE {direction}, {newest}")
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Intermediate row struct for database mapping.
struct ClientRow {
    id: String,
    name: String,
    phone: String,
    pet_name: String,
    pet_birth_date: String,
    pet_type: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ClientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ClientRow {
            id: row.get(0)?,
            name: row.get(1)?,
            phone: row.get(2)?,
            pet_name: row.get(3)?,
            pet_birth_date: row.get(4)?,
            pet_type: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl TryFrom<ClientRow> for ClientRecord {
    type Error = DbError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| DbError::Corrupt {
            id: row.id.clone(),
            reason,
        };

        let pet_type: PetType = row
            .pet_type
            .parse()
            .map_err(|e| corrupt(format!("{e}")))?;
        let pet_birth_date = NaiveDate::parse_from_str(&row.pet_birth_date, "%Y-%m-%d")
            .map_err(|e| corrupt(format!("bad pet_birth_date {:?}: {e}", row.pet_birth_date)))?;
        let created_at = parse_timestamp(&row.created_at)
            .map_err(|e| corrupt(format!("bad created_at {:?}: {e}", row.created_at)))?;
        let updated_at = parse_timestamp(&row.updated_at)
            .map_err(|e| corrupt(format!("bad updated_at {:?}: {e}", row.updated_at)))?;

        Ok(ClientRecord {
            id: row.id,
            name: row.name,
            phone: row.phone,
            pet_name: row.pet_name,
            pet_birth_date,
            pet_type,
            notes: row.notes,
            created_at,
            updated_at,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}
