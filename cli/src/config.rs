use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use fences::ExtractMode;
use fences::extract::DEFAULT_LANGUAGE;
use harness::{CommandValidator, FailurePolicy};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fencecheck.toml";

pub const DEFAULT_DOCUMENT: &str = "docs/03-example-models.md";
pub const DEFAULT_VALIDATOR_PROGRAM: &str = "java";
pub const DEFAULT_VALIDATOR_ARGS: &[&str] = &[
    "-jar",
    "validator/java/target/codephy-validator-0.1.0-jar-with-dependencies.jar",
];

/// Contents of a `fencecheck.toml`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub document: Option<PathBuf>,

    #[serde(default)]
    pub language: Option<String>,

    /// "textual" or "markdown".
    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub keep_going: Option<bool>,

    #[serde(default)]
    pub validator: Option<ValidatorConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,
}

/// Values given on the command line. These win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub document: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub language: Option<String>,
    pub mode: Option<ExtractMode>,
    pub keep_going: Option<bool>,
    /// Full validator command line; replaces the configured one when non-empty.
    pub validator: Vec<String>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug)]
pub struct Settings {
    pub document: PathBuf,
    pub language: String,
    pub mode: ExtractMode,
    pub policy: FailurePolicy,
    pub validator: CommandValidator,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load the explicit config file, or the default one if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(FileConfig::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config '{}'", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config '{}'", path.display()))?;
        tracing::debug!(config = %path.display(), "loaded configuration");
        Ok(config)
    }
}

impl Settings {
    pub fn load(overrides: Overrides) -> Result<Self> {
        let file = FileConfig::load(overrides.config.as_deref())?;
        Self::resolve(overrides, file)
    }

    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let mode = match (overrides.mode, file.mode) {
            (Some(mode), _) => mode,
            (None, Some(name)) => name.parse().map_err(anyhow::Error::msg)?,
            (None, None) => ExtractMode::default(),
        };

        let language = overrides
            .language
            .or(file.language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        if language.trim().is_empty() {
            bail!("language tag must not be empty");
        }

        let keep_going = overrides.keep_going.or(file.keep_going).unwrap_or(false);
        let policy = if keep_going {
            FailurePolicy::KeepGoing
        } else {
            FailurePolicy::Abort
        };

        let validator = match overrides.validator.split_first() {
            Some((program, args)) => CommandValidator::new(program).args(args),
            None => match file.validator {
                Some(v) => {
                    if v.program.is_empty() {
                        bail!("validator.program must not be empty");
                    }
                    CommandValidator::new(v.program).args(v.args)
                }
                None => CommandValidator::new(DEFAULT_VALIDATOR_PROGRAM)
                    .args(DEFAULT_VALIDATOR_ARGS.iter().copied()),
            },
        };

        let document = overrides
            .document
            .or(file.document)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT));

        Ok(Settings {
            document,
            language,
            mode,
            policy,
            validator,
        })
    }
}
