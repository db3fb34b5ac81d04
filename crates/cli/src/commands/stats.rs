//! Stats command handler.

use clap::Args;
use duplodocs_assistant::Assistant;
use duplodocs_core::AppResult;

/// Show corpus and index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, assistant: &Assistant) -> AppResult<()> {
        let documents = assistant.documentation().len();
        let chunks = assistant.chunk_count().await?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "documents": documents,
                    "chunks": chunks,
                }))?
            );
        } else {
            println!("documents: {}", documents);
            println!("chunks:    {}", chunks);
        }

        Ok(())
    }
}
