pub mod builder;
pub mod error;
pub mod relay;
pub mod runner;

pub use builder::{ProcessCommand, ProcessCommandBuilder};
pub use error::ProcessError;
pub use relay::{is_progress_line, OutputRelay};
pub use runner::ToolRunner;
