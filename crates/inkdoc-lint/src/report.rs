use std::io::{self, Write};

use crate::issue::Issue;

/// Default cap on printed issue lines.
pub const DEFAULT_MAX_ISSUES: usize = 200;

/// Write the check report.
///
/// An empty issue list prints a single `[OK]` line. Otherwise a `[WARN]`
/// header carries the printed and total counts, followed by up to
/// `max_issues` issue lines.
pub fn write_report<W: Write>(out: &mut W, issues: &[Issue], max_issues: usize) -> io::Result<()> {
    if issues.is_empty() {
        writeln!(out, "[OK] no issues found.")?;
        return Ok(());
    }
    writeln!(
        out,
        "[WARN] issues found: {}/{}",
        issues.len().min(max_issues),
        issues.len()
    )?;
    for issue in issues.iter().take(max_issues) {
        writeln!(out, "{issue}")?;
    }
    Ok(())
}
