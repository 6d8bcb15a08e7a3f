pub mod config;
pub mod errors;
pub mod filters;
pub mod input;
pub mod replace;
pub mod results;
pub mod search;

pub use config::{CliOverrides, FdsConfig, ReplaceFlags};
pub use errors::{FdsError, FdsResult};
pub use input::{resolve_args, validate, Args, ConsolePrompt, Prompt, SharedPrompt, Subject};
pub use replace::confirm::ConfirmAnswer;
pub use replace::file::replace_in_file;
pub use replace::Replacement;
pub use results::{FanOutReport, FileOutcome, Match};
pub use search::{collect_files, replace_in_files, Pattern};
