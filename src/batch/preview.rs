//! Truncated textual previews of batches. Presentation only.

use std::fmt::{self, Write};

use crate::value::Row;

/// Rows shown by `Display` implementations
pub const DEFAULT_PREVIEW_ROWS: usize = 2;

/// Writes `header[` followed by at most `max_rows` rows and a note on how
/// many rows were left out, then `]`.
pub(crate) fn write_preview<W: Write>(
    out: &mut W,
    header: &str,
    rows: &[Row],
    max_rows: usize,
) -> fmt::Result {
    write!(out, "{}[", header)?;
    if rows.is_empty() {
        return write!(out, "]");
    }

    for row in rows.iter().take(max_rows) {
        write!(out, "\n  {},", row)?;
    }
    if rows.len() > max_rows {
        write!(out, "\n  ... ({} more rows)", rows.len() - max_rows)?;
    }
    write!(out, "\n]")
}

pub(crate) fn render(header: &str, rows: &[Row], max_rows: usize) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_preview(&mut out, header, rows, max_rows);
    out
}
