//! Identifier and literal rendering for administrative SQL.
//!
//! DDL such as `CREATE USER` or `CREATE DATABASE` cannot take bind
//! parameters, so names and passwords from the config file are quoted here
//! before being spliced into statement text.

/// `"name"` with embedded double quotes doubled.
pub fn pg_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `'value'` with embedded single quotes doubled.
pub fn pg_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `` `name` `` with embedded backticks doubled.
pub fn mysql_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

pub fn mysql_literal(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\0', "\\0")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    format!("'{}'", escaped)
}

/// `'user'@'%'`, the account form used for grants on the restore side.
pub fn mysql_account(user: &str) -> String {
    format!("{}@'%'", mysql_literal(user))
}
