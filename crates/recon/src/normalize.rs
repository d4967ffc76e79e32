//! Cell value normalization.

/// Spreadsheet placeholders for a missing cell.
const MISSING_MARKERS: &[&str] = &["nan", "none", "null", "<na>"];

/// Clean a raw cell value into its canonical string form.
///
/// - missing or a NaN-like placeholder → `""`
/// - a value whose text after the first `.` is exactly `0` keeps only the
///   text before it (`"1203.0"` → `"1203"`, `"SiteA.0"` → `"SiteA"`)
/// - anything else is returned unchanged
///
/// Idempotent: `clean(Some(&clean(x))) == clean(x)`.
pub fn clean(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if is_missing(value) {
        return String::new();
    }
    let mut parts = value.split('.');
    match (parts.next(), parts.next()) {
        (Some(head), Some("0")) if is_missing(head) => String::new(),
        (Some(head), Some("0")) => head.to_string(),
        _ => value.to_string(),
    }
}

/// Shorthand for a present value.
pub fn clean_str(value: &str) -> String {
    clean(Some(value))
}

fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    MISSING_MARKERS.iter().any(|m| trimmed.eq_ignore_ascii_case(m))
}
