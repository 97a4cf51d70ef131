pub mod error;
pub mod report;
pub mod runner;
pub mod temp;
pub mod validator;

pub use error::HarnessError;
pub use runner::{FailurePolicy, Harness, LaunchFailure, Outcome, RunSummary, check_document};
pub use temp::BlockFile;
pub use validator::{CommandValidator, ValidationResult, Validator};
