//! Output file naming.

/// Make a value safe for use in a file name.
///
/// Path separators become underscores and surrounding whitespace is
/// trimmed; an empty result falls back to `output`.
#[must_use]
pub fn safe_filename(value: &str) -> String {
    let cleaned = value.replace(['\\', '/'], "_");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "output".to_owned()
    } else {
        cleaned.to_owned()
    }
}

/// Standard name of the generated manual for a software name and version.
#[must_use]
pub fn output_filename(software_name: &str, version: &str) -> String {
    format!(
        "{}_{}_软件说明书.docx",
        safe_filename(software_name),
        safe_filename(version)
    )
}
