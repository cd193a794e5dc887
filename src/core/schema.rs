use crate::domain::model::ParsedTable;
use crate::utils::error::{LeadError, Result};

/// Columns every upload must carry, compared case-insensitively.
pub const REQUIRED_COLUMNS: [&str; 3] = ["FirstName", "Phone", "Notes"];

/// Reports every required column absent from `headers`, in the order of
/// [`REQUIRED_COLUMNS`].
pub fn check_headers(headers: &[String]) -> Result<()> {
    let present: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !present.iter().any(|h| h == &required.to_lowercase()))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LeadError::MissingColumns { columns: missing })
    }
}

/// Header presence only; cell contents are not inspected.
pub fn validate(table: &ParsedTable) -> Result<()> {
    if table.rows.is_empty() {
        return Err(LeadError::EmptyFile);
    }
    check_headers(&table.headers)
}
