//! Command handlers for the duplodocs CLI.

mod ask;
mod serve;
mod stats;
mod sync;

pub use ask::AskCommand;
pub use serve::ServeCommand;
pub use stats::StatsCommand;
pub use sync::SyncCommand;
