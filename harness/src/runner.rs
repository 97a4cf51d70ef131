use std::io::Write;
use std::path::Path;

use fences::{CodeBlock, Document, Extraction, Extractor};

use crate::error::HarnessError;
use crate::report;
use crate::temp::BlockFile;
use crate::validator::{ValidationResult, Validator};

/// What to do when the validator cannot be started for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first launch failure. Later blocks are not attempted.
    #[default]
    Abort,
    /// Report the failure in that block's section and carry on.
    KeepGoing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchFailure {
    pub index: usize,
    pub message: String,
}

/// Tally of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Blocks whose validator ran to completion.
    pub checked: usize,
    /// Of those, how many exited with anything other than 0.
    pub nonzero_exits: usize,
    /// Only populated under `FailurePolicy::KeepGoing`.
    pub launch_failures: Vec<LaunchFailure>,
}

impl RunSummary {
    fn record(&mut self, result: &ValidationResult) {
        self.checked += 1;
        if !result.success() {
            self.nonzero_exits += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The document held no matching fences. Nothing was run.
    NoBlocks,
    Checked(RunSummary),
}

/// Feeds blocks to a validator one at a time, in order.
pub struct Harness<V> {
    validator: V,
    policy: FailurePolicy,
}

impl<V: Validator> Harness<V> {
    pub fn new(validator: V) -> Self {
        Harness {
            validator,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Check every block and write the report to `out`.
    ///
    /// A non-zero validator exit is just more output. A launch failure ends
    /// the run under `Abort`, after the in-flight temp file has been removed.
    pub fn run<W: Write + ?Sized>(
        &self,
        blocks: &[CodeBlock],
        out: &mut W,
    ) -> Result<RunSummary, HarnessError> {
        let mut summary = RunSummary::default();

        for block in blocks {
            match self.check_block(block, out) {
                Ok(result) => summary.record(&result),
                Err(err) if err.is_launch() && self.policy == FailurePolicy::KeepGoing => {
                    let message = err.to_string();
                    tracing::warn!(
                        block = block.index,
                        error = %message,
                        "validator did not start, continuing"
                    );
                    report::write_launch_failure(out, block.index, &message)
                        .map_err(HarnessError::Report)?;
                    summary.launch_failures.push(LaunchFailure {
                        index: block.index,
                        message,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            checked = summary.checked,
            nonzero = summary.nonzero_exits,
            launch_failures = summary.launch_failures.len(),
            "run complete"
        );
        Ok(summary)
    }

    fn check_block<W: Write + ?Sized>(
        &self,
        block: &CodeBlock,
        out: &mut W,
    ) -> Result<ValidationResult, HarnessError> {
        // Dropping `file` on any early return below removes it.
        let file = BlockFile::create(block)?;
        tracing::debug!(
            block = block.index,
            file = %file.path().display(),
            bytes = block.text.len(),
            "block written"
        );

        let result = self.validator.validate(file.path())?;
        tracing::info!(block = block.index, status = ?result.status, "validator finished");

        report::write_block(out, block.index, &result).map_err(HarnessError::Report)?;
        file.remove();
        Ok(result)
    }
}

/// Read `path`, extract its blocks and run them all.
///
/// `inspect` sees the document and extraction before any validator runs, so
/// callers can surface extraction warnings ahead of the report.
pub fn check_document<V, W, F>(
    path: &Path,
    extractor: &Extractor,
    harness: &Harness<V>,
    out: &mut W,
    inspect: F,
) -> Result<Outcome, HarnessError>
where
    V: Validator,
    W: Write + ?Sized,
    F: FnOnce(&Document, &Extraction),
{
    let document = Document::read(path)?;
    let extraction = extractor.extract(&document, 0);
    inspect(&document, &extraction);

    if extraction.is_empty() {
        report::write_no_blocks(out, extractor.language()).map_err(HarnessError::Report)?;
        return Ok(Outcome::NoBlocks);
    }

    let summary = harness.run(&extraction.blocks, out)?;
    Ok(Outcome::Checked(summary))
}
