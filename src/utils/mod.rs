use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::errors::{AppError, Result};

// Any printable characters; SQL Server's identifier limit is 128 characters.
static DATABASE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\p{Cc}]{1,128}$").expect("database name pattern is valid"));

/// Checks a database name and returns it bracket-quoted for interpolation into T-SQL.
///
/// A closing bracket inside the name is doubled, so the quoted form always ends at the final `]`.
pub fn quote_identifier(name: &str) -> Result<String> {
    if !DATABASE_NAME.is_match(name) {
        return Err(AppError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("[{}]", name.replace(']', "]]")))
}

/// Returns the path as the text the server will open. Lossy conversion would name another file.
pub fn disk_path(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| AppError::NonUtf8Path(path.to_path_buf()))
}
