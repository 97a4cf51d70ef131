use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};

use fences::{CodeBlock, Document, ExtractMode, Extractor};
use harness::{
    CommandValidator, FailurePolicy, Harness, HarnessError, Outcome, RunSummary, ValidationResult,
    Validator, check_document,
};

/// Records every file it is handed and answers from a script.
struct FakeValidator {
    seen: RefCell<Vec<(PathBuf, String)>>,
    respond: fn(&str) -> Result<ValidationResult, HarnessError>,
}

impl FakeValidator {
    fn new(respond: fn(&str) -> Result<ValidationResult, HarnessError>) -> Self {
        FakeValidator {
            seen: RefCell::new(Vec::new()),
            respond,
        }
    }

    fn paths(&self) -> Vec<PathBuf> {
        self.seen.borrow().iter().map(|(p, _)| p.clone()).collect()
    }

    fn contents(&self) -> Vec<String> {
        self.seen.borrow().iter().map(|(_, c)| c.clone()).collect()
    }
}

impl Validator for FakeValidator {
    fn validate(&self, path: &Path) -> Result<ValidationResult, HarnessError> {
        let content =
            std::fs::read_to_string(path).expect("temp file should exist during validation");
        // The previous block's file must already be gone.
        if let Some((prev, _)) = self.seen.borrow().last() {
            assert!(!prev.exists(), "previous temp file still present: {}", prev.display());
        }
        self.seen.borrow_mut().push((path.to_path_buf(), content.clone()));
        (self.respond)(&content)
    }
}

fn ok_on_stdout(_: &str) -> Result<ValidationResult, HarnessError> {
    Ok(ValidationResult {
        status: Some(0),
        stdout: "OK".to_string(),
        stderr: String::new(),
    })
}

fn schema_error_for_bad(content: &str) -> Result<ValidationResult, HarnessError> {
    if content.contains("bad") {
        Ok(ValidationResult {
            status: Some(1),
            stdout: String::new(),
            stderr: "Invalid schema".to_string(),
        })
    } else {
        ok_on_stdout(content)
    }
}

fn cannot_launch(_: &str) -> Result<ValidationResult, HarnessError> {
    Err(HarnessError::Launch {
        program: "missing-validator".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    })
}

fn blocks(texts: &[&str]) -> Vec<CodeBlock> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| CodeBlock {
            index: i + 1,
            text: t.to_string(),
            span: 0..0,
        })
        .collect()
}

fn run_report<V: Validator>(
    harness: &Harness<V>,
    texts: &[&str],
) -> (Result<RunSummary, HarnessError>, String) {
    let mut out = Vec::new();
    let result = harness.run(&blocks(texts), &mut out);
    (result, String::from_utf8(out).unwrap())
}

/// Output sink that refuses every write, like a closed pipe.
struct FailingWriter;

impl std::io::Write for FailingWriter {
    fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn write_doc(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("models.md");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{}", content).unwrap();
    path
}

#[test]
fn two_valid_blocks_report() {
    let harness = Harness::new(FakeValidator::new(ok_on_stdout));
    let (result, report) = run_report(&harness, &["{\"a\":1}", "{\"b\":2}"]);

    let summary = result.expect("run failed");
    assert_eq!(summary.checked, 2);
    assert_eq!(summary.nonzero_exits, 0);
    assert_eq!(
        report,
        "--- Validation result for code block 1 ---\nOK\n\
         --- Validation result for code block 2 ---\nOK\n"
    );
    assert!(!report.contains("Errors:"));
}

#[test]
fn one_invocation_per_block_in_order_with_exact_content() {
    let harness = Harness::new(FakeValidator::new(ok_on_stdout));
    let (result, _) = run_report(&harness, &["{\"a\":1}", "", "{\"a\":1}"]);
    result.expect("run failed");

    let validator = harness.validator();
    assert_eq!(validator.contents(), vec!["{\"a\":1}", "", "{\"a\":1}"]);

    let paths = validator.paths();
    assert_eq!(paths.len(), 3);
    for path in &paths {
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
        assert!(!path.exists(), "temp file left behind: {}", path.display());
    }
    assert_ne!(paths[0], paths[1]);
    assert_ne!(paths[1], paths[2]);
}

#[test]
fn stderr_gets_errors_section_and_run_continues() {
    let harness = Harness::new(FakeValidator::new(schema_error_for_bad));
    let (result, report) = run_report(&harness, &["{\"bad\": true}", "{\"good\": true}"]);

    let summary = result.expect("run failed");
    assert_eq!(summary.checked, 2);
    assert_eq!(summary.nonzero_exits, 1);
    assert_eq!(
        report,
        "--- Validation result for code block 1 ---\n\nErrors:\nInvalid schema\n\
         --- Validation result for code block 2 ---\nOK\n"
    );
}

#[test]
fn launch_failure_aborts_by_default_and_cleans_up() {
    let harness = Harness::new(FakeValidator::new(cannot_launch));
    let (result, report) = run_report(&harness, &["{}", "{}", "{}"]);

    assert!(matches!(result, Err(HarnessError::Launch { .. })));
    assert!(report.is_empty());

    let paths = harness.validator().paths();
    assert_eq!(paths.len(), 1, "later blocks must not be attempted");
    assert!(!paths[0].exists());
}

#[test]
fn launch_failure_keep_going_attempts_every_block() {
    let harness =
        Harness::new(FakeValidator::new(cannot_launch)).with_policy(FailurePolicy::KeepGoing);
    let (result, report) = run_report(&harness, &["{}", "{}"]);

    let summary = result.expect("keep-going run should finish");
    assert_eq!(summary.checked, 0);
    let failed: Vec<usize> = summary.launch_failures.iter().map(|f| f.index).collect();
    assert_eq!(failed, vec![1, 2]);
    assert!(report.contains(
        "--- Validation result for code block 2 ---\n\
         Errors:\nfailed to launch validator 'missing-validator'"
    ));
    for path in harness.validator().paths() {
        assert!(!path.exists());
    }
}

#[test]
fn report_is_identical_across_runs() {
    let harness = Harness::new(FakeValidator::new(schema_error_for_bad));
    let texts = ["{\"bad\": 1}", "{}", ""];
    let (_, first) = run_report(&harness, &texts);
    let (_, second) = run_report(&harness, &texts);
    assert_eq!(first, second);
}

#[test]
fn document_without_fences_reports_none() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = write_doc(dir.path(), "# Models\n\nNothing here.\n");
    let extractor = Extractor::new("json", ExtractMode::Textual).unwrap();
    let harness = Harness::new(FakeValidator::new(ok_on_stdout));

    let mut out = Vec::new();
    let outcome = check_document(&path, &extractor, &harness, &mut out, |_, _| {}).unwrap();

    assert_eq!(outcome, Outcome::NoBlocks);
    assert_eq!(String::from_utf8(out).unwrap(), "No JSON code blocks found.\n");
    assert!(harness.validator().paths().is_empty());
}

#[test]
fn document_blocks_flow_through_to_validator() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = write_doc(
        dir.path(),
        "# A\n```json\n  {\"a\":1}\n```\n# B\n```json\n```\n",
    );
    let extractor = Extractor::new("json", ExtractMode::Textual).unwrap();
    let harness = Harness::new(FakeValidator::new(ok_on_stdout));

    let mut inspected = 0;
    let mut out = Vec::new();
    let outcome = check_document(&path, &extractor, &harness, &mut out, |doc: &Document, ex| {
        assert!(doc.source.starts_with("# A"));
        inspected = ex.blocks.len();
    })
    .unwrap();

    assert_eq!(inspected, 2);
    assert!(matches!(outcome, Outcome::Checked(ref s) if s.checked == 2));
    assert_eq!(harness.validator().contents(), vec!["{\"a\":1}", ""]);
}

#[test]
fn missing_document_is_fatal() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let extractor = Extractor::new("json", ExtractMode::Textual).unwrap();
    let harness = Harness::new(FakeValidator::new(ok_on_stdout));

    let mut out = Vec::new();
    let err = check_document(&dir.path().join("nope.md"), &extractor, &harness, &mut out, |_, _| {
        panic!("nothing to inspect")
    })
    .unwrap_err();

    assert!(matches!(err, HarnessError::Document(_)));
    assert!(out.is_empty());
}

#[test]
fn command_validator_display() {
    let validator = CommandValidator::new("java").args(["-jar", "validator.jar"]);
    assert_eq!(validator.display(), "java -jar validator.jar");
}

#[test]
fn command_validator_missing_program() {
    let validator = CommandValidator::new("fencecheck-definitely-not-a-real-program");
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let err = validator.validate(&dir.path().join("x.json")).unwrap_err();
    assert!(err.is_launch());
}

#[cfg(unix)]
#[test]
fn command_validator_passes_path_last() {
    // `cat <path>` echoes the temp file back.
    let harness = Harness::new(CommandValidator::new("cat"));
    let (result, report) = run_report(&harness, &["{\"a\":1}"]);
    result.expect("run failed");
    assert_eq!(report, "--- Validation result for code block 1 ---\n{\"a\":1}\n");
}

#[cfg(unix)]
#[test]
fn command_validator_captures_stderr_and_exit_code() {
    let validator = CommandValidator::new("sh")
        .arg("-c")
        .arg("echo checked \"$1\" >/dev/null; echo Invalid schema >&2; exit 3")
        .arg("sh");
    let harness = Harness::new(validator);
    let (result, report) = run_report(&harness, &["{}", "{}"]);

    let summary = result.expect("non-zero exits are not harness failures");
    assert_eq!(summary.checked, 2);
    assert_eq!(summary.nonzero_exits, 2);
    assert_eq!(report.matches("Errors:\nInvalid schema\n").count(), 2);
}

#[cfg(unix)]
#[test]
fn command_validator_result_fields() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = dir.path().join("m.json");
    std::fs::write(&file, "{}").unwrap();

    let validator = CommandValidator::new("sh")
        .arg("-c")
        .arg("printf 'seen %s' \"$(cat \"$1\")\"; printf oops >&2")
        .arg("sh");
    let result = validator.validate(&file).unwrap();
    assert_eq!(result.status, Some(0));
    assert!(result.success());
    assert_eq!(result.stdout, "seen {}");
    assert_eq!(result.stderr, "oops");
}

#[test]
fn report_write_failure_is_fatal_and_removes_temp_file() {
    let harness = Harness::new(FakeValidator::new(ok_on_stdout));
    let mut out = FailingWriter;
    let result = harness.run(&blocks(&["{}", "{}"]), &mut out);

    assert!(matches!(result, Err(HarnessError::Report(_))));
    let paths = harness.validator().paths();
    assert_eq!(paths.len(), 1);
    assert!(!paths[0].exists());
}
