//! Sync command handler.

use clap::Args;
use duplodocs_assistant::Assistant;
use duplodocs_core::AppResult;

/// Re-embed the documentation corpus into the vector index
#[derive(Args, Debug)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn execute(&self, assistant: &Assistant) -> AppResult<()> {
        let chunks = assistant.resync().await?;
        println!(
            "Re-embedded {} chunks from {} documents",
            chunks,
            assistant.documentation().len()
        );
        Ok(())
    }
}
