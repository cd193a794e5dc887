use crate::domain::model::{LeadRecord, RawRow};

/// Maps raw rows onto [`LeadRecord`]s. Output index `i` is input row `i`.
///
/// Headers match case-insensitively. When several columns match the same field
/// the leftmost one wins. Values are trimmed and a missing column becomes an
/// empty string.
pub fn normalize(rows: &[RawRow]) -> Vec<LeadRecord> {
    rows.iter().map(normalize_row).collect()
}

pub fn normalize_row(row: &RawRow) -> LeadRecord {
    let field = |name: &str| {
        row.data
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim().to_string())
            .unwrap_or_default()
    };

    LeadRecord {
        first_name: field("firstname"),
        phone: field("phone"),
        notes: field("notes"),
    }
}
