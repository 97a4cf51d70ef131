use std::io::{self, Write};

use crate::validator::ValidationResult;

pub fn header(index: usize) -> String {
    format!("--- Validation result for code block {} ---", index)
}

/// Write one block's section of the console report.
///
/// Validator stdout is always printed, followed by a newline. The `Errors:`
/// section only appears when stderr is non-empty.
pub fn write_block<W: Write + ?Sized>(
    out: &mut W,
    index: usize,
    result: &ValidationResult,
) -> io::Result<()> {
    writeln!(out, "{}", header(index))?;
    writeln!(out, "{}", result.stdout)?;
    if !result.stderr.is_empty() {
        writeln!(out, "Errors:")?;
        writeln!(out, "{}", result.stderr)?;
    }
    out.flush()
}

/// Section for a block whose validator could not be started.
pub fn write_launch_failure<W: Write + ?Sized>(
    out: &mut W,
    index: usize,
    message: &str,
) -> io::Result<()> {
    writeln!(out, "{}", header(index))?;
    writeln!(out, "Errors:")?;
    writeln!(out, "{}", message)?;
    out.flush()
}

pub fn write_no_blocks<W: Write + ?Sized>(out: &mut W, language: &str) -> io::Result<()> {
    writeln!(out, "No {} code blocks found.", language.to_uppercase())?;
    out.flush()
}
