//! Column-name normalization.
//!
//! SQL Server hands back whatever casing the schema author picked
//! (`UserID`, `createdAt`, `HTTPStatus`). Records are keyed by the
//! snake_case form so callers never care.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static WORD_AFTER_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"));
static UPPER_AFTER_LOWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));

/// Convert a driver-reported column name to snake_case.
///
/// ```rust
/// use mssql_db::naming::normalize;
///
/// assert_eq!(normalize("UserID"), "user_id");
/// assert_eq!(normalize("HTTPStatusCode"), "http_status_code");
/// assert_eq!(normalize("Name"), "name");
/// ```
#[must_use]
pub fn normalize(name: &str) -> String {
    let words = WORD_AFTER_ANY.replace_all(name, "${1}_${2}");
    let split = UPPER_AFTER_LOWER.replace_all(&words, "${1}_${2}");
    split.to_lowercase()
}

/// Placeholder given to a column the driver reports without a name.
#[must_use]
pub fn placeholder_name(index: usize) -> String {
    format!("COLUMN_{index}")
}

/// Normalize a full column list, naming anonymous columns by position.
///
/// `SELECT COUNT(*), MAX(Id) AS MaxId` yields `["column_0", "max_id"]`.
pub fn column_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name: Cow<'_, str> = match name.as_ref() {
                "" => Cow::Owned(placeholder_name(i)),
                named => Cow::Borrowed(named),
            };
            normalize(&name)
        })
        .collect()
}
