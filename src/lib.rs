// Library surface: the writing engine plus the plumbing shared by the binary
// and the integration tests. Bin-only types (App, Cli, ui) stay in main.rs.
pub mod app_dirs;
pub mod config;
pub mod draft;
pub mod error;
pub mod limits;
pub mod logging;
pub mod report;
pub mod runtime;
pub mod segment;
pub mod session;
pub mod util;

pub use error::{QuillError, Result};
pub use limits::{LimitStatus, LineThresholds};
pub use report::{LineResult, ResultsReport};
pub use segment::{segment, LineCapacity};
pub use session::{EditOutcome, Session, SessionConfig, TickOutcome};
