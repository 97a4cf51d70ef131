mod config;

use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use fences::{Document, ExtractMode, Extractor, FenceWarning};
use harness::{Harness, Outcome, check_document, report};

use crate::config::{Overrides, Settings};

const SUBCOMMANDS: &[&str] = &["run", "list", "help"];

/// Exit code for fatal harness errors and for runs where a validator never started.
const EXIT_FATAL: i32 = 2;
const EXIT_NO_BLOCKS: i32 = 1;

#[derive(Parser)]
#[command(
    name = "fencecheck",
    version,
    about = "Run the fenced JSON examples of a markdown document through an external validator"
)]
struct Cli {
    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate every fenced block (default)
    Run(RunArgs),

    /// List the fenced blocks without running the validator
    List(SourceArgs),
}

#[derive(clap::Args, Default)]
struct SourceArgs {
    /// Markdown document to scan
    document: Option<PathBuf>,

    /// Config file (defaults to ./fencecheck.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fence language tag to look for
    #[arg(short, long)]
    language: Option<String>,

    /// How fences are found: textual or markdown
    #[arg(long)]
    mode: Option<ExtractMode>,
}

#[derive(clap::Args, Default)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Keep going when the validator cannot be started for a block
    #[arg(short, long, overrides_with = "no_keep_going")]
    keep_going: bool,

    /// Stop at the first block whose validator cannot be started
    #[arg(long, overrides_with = "keep_going")]
    no_keep_going: bool,

    /// Validator command; the temp file path is appended (after --)
    #[arg(last = true)]
    validator: Vec<String>,
}

impl SourceArgs {
    fn into_overrides(self) -> Overrides {
        Overrides {
            document: self.document,
            config: self.config,
            language: self.language,
            mode: self.mode,
            ..Overrides::default()
        }
    }
}

fn main() {
    // `fencecheck docs/models.md` means `fencecheck run docs/models.md`.
    let mut args: Vec<String> = std::env::args().collect();
    let implicit_run = args
        .iter()
        .skip(1)
        .find(|a| !a.starts_with('-'))
        .is_some_and(|first_pos| !SUBCOMMANDS.contains(&first_pos.as_str()));
    if implicit_run {
        args.insert(1, "run".to_string());
    }

    let cli = Cli::parse_from(&args);
    init_tracing(cli.verbose);

    let code = match cli.command.unwrap_or_else(|| Command::Run(RunArgs::default())) {
        Command::Run(run_args) => do_run(run_args, cli.no_color),
        Command::List(source) => do_list(source, cli.no_color),
    };
    process::exit(code);
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(overrides: Overrides) -> Option<(Settings, Extractor)> {
    let settings = match Settings::load(overrides) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return None;
        }
    };
    match Extractor::new(&settings.language, settings.mode) {
        Ok(extractor) => Some((settings, extractor)),
        Err(e) => {
            eprintln!("error: {}", e);
            None
        }
    }
}

fn do_run(args: RunArgs, no_color: bool) -> i32 {
    let mut overrides = args.source.into_overrides();
    overrides.keep_going = match (args.keep_going, args.no_keep_going) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    overrides.validator = args.validator;

    let Some((settings, extractor)) = load_settings(overrides) else {
        return EXIT_FATAL;
    };
    tracing::info!(
        document = %settings.document.display(),
        validator = %settings.validator.display(),
        mode = %settings.mode,
        "checking document"
    );

    let harness = Harness::new(settings.validator).with_policy(settings.policy);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = check_document(&settings.document, &extractor, &harness, &mut out, |doc, ex| {
        emit_warnings(doc, &ex.warnings, no_color)
    });

    match result {
        Ok(Outcome::NoBlocks) => EXIT_NO_BLOCKS,
        Ok(Outcome::Checked(summary)) if !summary.launch_failures.is_empty() => {
            let _ = out.flush();
            eprintln!(
                "error: validator could not be started for {} of {} block(s)",
                summary.launch_failures.len(),
                summary.launch_failures.len() + summary.checked
            );
            EXIT_FATAL
        }
        Ok(Outcome::Checked(_)) => 0,
        Err(e) => {
            let _ = out.flush();
            eprintln!("error: {}", e);
            EXIT_FATAL
        }
    }
}

fn do_list(args: SourceArgs, no_color: bool) -> i32 {
    let Some((settings, extractor)) = load_settings(args.into_overrides()) else {
        return EXIT_FATAL;
    };

    let document = match Document::read(&settings.document) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {}", e);
            return EXIT_FATAL;
        }
    };
    let extraction = extractor.extract(&document, 0);
    emit_warnings(&document, &extraction.warnings, no_color);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if extraction.is_empty() {
        let _ = report::write_no_blocks(&mut out, extractor.language());
        return EXIT_NO_BLOCKS;
    }

    for block in &extraction.blocks {
        let _ = writeln!(
            out,
            "{}\tline {}\t{} bytes",
            block.index,
            document.line_of(block.span.start),
            block.text.len()
        );
    }
    0
}

fn emit_warnings(document: &Document, warnings: &[FenceWarning], no_color: bool) {
    if warnings.is_empty() {
        return;
    }

    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    // Extraction ran with file id 0, which is the first id SimpleFiles hands out.
    let mut files = SimpleFiles::new();
    files.add(document.name.clone(), document.source.clone());

    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for warning in warnings {
        let diagnostic = warning.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
    }
}
