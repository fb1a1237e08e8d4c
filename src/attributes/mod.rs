pub(crate) mod columns;
pub(crate) mod database;
pub(crate) mod reconcile;
pub(crate) mod aggregate;

/// Quotes a value as an SQL string literal.
pub(crate) fn sql_string(value: &str) -> String {
    format!("'{}'",value.replace('\'', "''"))
}
