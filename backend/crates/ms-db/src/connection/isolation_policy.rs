use crate::{DbError, Result};

use error_location::ErrorLocation;

use std::panic::Location;

use sqlx::SqliteConnection;

/// Tables whose rows are visible and writable only under a matching tenant marker
pub const DEFAULT_ISOLATED_TABLES: &[&str] = &["clients", "orders"];

/// Message raised by the write guards; surfaced in `sqlx::Error::Database`
pub const ISOLATION_VIOLATION: &str = "tenant isolation violation";

/// Message raised when a bound marker is rewritten
pub const MARKER_REBIND: &str = "tenant marker already bound";

const MARKER: &str = "(SELECT tenant_id FROM tenant_scope WHERE slot = 1)";

const MARKER_TABLE_DDL: &str = "\
CREATE TEMP TABLE IF NOT EXISTS tenant_scope (
    slot INTEGER PRIMARY KEY CHECK(slot = 1),
    tenant_id TEXT NOT NULL CHECK(
        length(tenant_id) BETWEEN 1 AND 128
        AND tenant_id NOT GLOB '*[^A-Za-z0-9_-]*'
    )
)";

const READ_LAYOUT: &str =
    "SELECT name, dflt_value, pk FROM pragma_table_info(?, 'main') ORDER BY cid";

/// One column of an isolated storage table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Default expression as declared, e.g. `'open'` or `strftime(...)`
    pub default: Option<String>,
    pub primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Columns of one isolated table, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub table: String,
    pub columns: Vec<Column>,
}

/// Row-isolation objects installed on every pooled connection.
///
/// SQLite has no row-level security, so the policy is emulated with
/// connection-local objects that the engine itself enforces. For an isolated
/// table `orders` the rows are stored in `main.orders_all`, and:
///
/// - `temp.tenant_scope` holds at most one row: the marker for this connection.
///   Once set it can be neither updated nor overwritten, only cleared.
/// - `temp.orders` is a view over `orders_all` filtered to the marker's tenant.
///   The TEMP schema is searched first, so `SELECT ... FROM orders` reads only the
///   bound tenant's rows. With no marker it reads nothing.
/// - INSTEAD OF triggers forward writes on `orders` to `orders_all`.
/// - BEFORE INSERT/UPDATE/DELETE triggers on `orders_all` abort any write whose
///   `tenant_id` differs from the marker, including every write made while no
///   marker is set.
///
/// Every object lives in the TEMP schema, so it is private to the connection and
/// dies with it.
#[derive(Debug, Clone)]
pub struct IsolationPolicy {
    tables: Vec<String>,
}

impl IsolationPolicy {
    #[track_caller]
    pub fn new<I, S>(tables: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tables: Vec<String> = tables.into_iter().map(Into::into).collect();

        if tables.is_empty() {
            return Err(DbError::InvalidPolicy {
                message: "at least one isolated table is required".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(bad) = tables.iter().find(|t| !is_identifier(t)) {
            return Err(DbError::InvalidPolicy {
                message: format!("'{bad}' is not a valid table identifier"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self { tables })
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Table in `main` that actually holds the rows behind `table`
    pub fn storage_table(table: &str) -> String {
        format!("{table}_all")
    }

    /// DDL for the marker table, guards, views and forwarding triggers, in
    /// execution order
    #[track_caller]
    pub fn statements(&self, layouts: &[TableLayout]) -> Result<Vec<String>> {
        let mut statements = vec![
            MARKER_TABLE_DDL.to_string(),
            format!(
                "CREATE TEMP TRIGGER IF NOT EXISTS tenant_scope_no_update \
                 BEFORE UPDATE ON tenant_scope \
                 BEGIN SELECT RAISE(ABORT, '{MARKER_REBIND}'); END"
            ),
            format!(
                "CREATE TEMP TRIGGER IF NOT EXISTS tenant_scope_single_insert \
                 BEFORE INSERT ON tenant_scope \
                 WHEN EXISTS (SELECT 1 FROM tenant_scope) \
                 BEGIN SELECT RAISE(ABORT, '{MARKER_REBIND}'); END"
            ),
        ];

        for table in &self.tables {
            let Some(layout) = layouts.iter().find(|l| &l.table == table) else {
                return Err(DbError::InvalidPolicy {
                    message: format!("no column layout for '{table}'"),
                    location: ErrorLocation::from(Location::caller()),
                });
            };
            statements.extend(table_statements(layout)?);
        }

        Ok(statements)
    }

    /// Install the policy on a freshly opened connection
    pub async fn install(&self, conn: &mut SqliteConnection) -> Result<()> {
        let mut layouts = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            layouts.push(read_layout(conn, table).await?);
        }

        for statement in self.statements(&layouts)? {
            sqlx::query(&statement).execute(&mut *conn).await?;
        }

        Ok(())
    }
}

impl Default for IsolationPolicy {
    fn default() -> Self {
        Self {
            tables: DEFAULT_ISOLATED_TABLES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

async fn read_layout(conn: &mut SqliteConnection, table: &str) -> Result<TableLayout> {
    let rows = sqlx::query_as::<_, (String, Option<String>, i64)>(READ_LAYOUT)
        .bind(IsolationPolicy::storage_table(table))
        .fetch_all(&mut *conn)
        .await?;

    let columns = rows
        .into_iter()
        .map(|(name, default, pk)| Column {
            name,
            default,
            primary_key: pk > 0,
        })
        .collect();

    Ok(TableLayout {
        table: table.to_string(),
        columns,
    })
}

#[track_caller]
fn table_statements(layout: &TableLayout) -> Result<Vec<String>> {
    let table = &layout.table;
    let storage = IsolationPolicy::storage_table(table);

    if !layout.columns.iter().any(|c| c.name == "tenant_id") {
        return Err(DbError::InvalidPolicy {
            message: format!("'{storage}' is missing or has no tenant_id column"),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    if let Some(bad) = layout.columns.iter().find(|c| !is_identifier(&c.name)) {
        return Err(DbError::InvalidPolicy {
            message: format!("'{storage}.{}' is not a valid column identifier", bad.name),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let keys: Vec<&str> = layout
        .columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| c.name.as_str())
        .collect();
    if keys.is_empty() {
        return Err(DbError::InvalidPolicy {
            message: format!("'{storage}' needs a primary key"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let names: Vec<&str> = layout.columns.iter().map(|c| c.name.as_str()).collect();
    let values: Vec<String> = layout
        .columns
        .iter()
        .map(|c| match &c.default {
            // A view has no defaults of its own, so omitted columns arrive as NULL
            Some(default) => format!("coalesce(NEW.{}, ({default}))", c.name),
            None => format!("NEW.{}", c.name),
        })
        .collect();
    let assignments: Vec<String> = names.iter().map(|n| format!("{n} = NEW.{n}")).collect();
    let key_match = keys
        .iter()
        .map(|k| format!("{k} = OLD.{k}"))
        .collect::<Vec<_>>()
        .join(" AND ");

    Ok(vec![
        guard(&storage, "INSERT", "NEW.tenant_id IS NOT {marker}"),
        guard(
            &storage,
            "UPDATE",
            "OLD.tenant_id IS NOT {marker} OR NEW.tenant_id IS NOT {marker}",
        ),
        guard(&storage, "DELETE", "OLD.tenant_id IS NOT {marker}"),
        format!(
            "CREATE TEMP VIEW IF NOT EXISTS {table} AS \
             SELECT * FROM main.{storage} WHERE tenant_id = {MARKER}"
        ),
        format!(
            "CREATE TEMP TRIGGER IF NOT EXISTS {table}_forward_insert \
             INSTEAD OF INSERT ON {table} \
             BEGIN INSERT INTO {storage} ({}) VALUES ({}); END",
            names.join(", "),
            values.join(", "),
        ),
        format!(
            "CREATE TEMP TRIGGER IF NOT EXISTS {table}_forward_update \
             INSTEAD OF UPDATE ON {table} \
             BEGIN UPDATE {storage} SET {} WHERE {key_match}; END",
            assignments.join(", "),
        ),
        format!(
            "CREATE TEMP TRIGGER IF NOT EXISTS {table}_forward_delete \
             INSTEAD OF DELETE ON {table} \
             BEGIN DELETE FROM {storage} WHERE {key_match}; END"
        ),
    ])
}

fn guard(table: &str, operation: &str, condition: &str) -> String {
    let condition = condition.replace("{marker}", MARKER);

    format!(
        "CREATE TEMP TRIGGER IF NOT EXISTS {table}_tenant_{op}_guard \
         BEFORE {operation} ON {table} \
         WHEN {condition} \
         BEGIN SELECT RAISE(ABORT, '{ISOLATION_VIOLATION}'); END",
        op = operation.to_lowercase(),
    )
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
