//! Ask command handler.

use clap::Args;
use duplodocs_assistant::Assistant;
use duplodocs_core::AppResult;

/// Resolve a single query and print the answer
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to resolve
    pub query: String,

    /// Print the raw response as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, assistant: &Assistant) -> AppResult<()> {
        let response = assistant.resolve(&self.query).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }

        println!("{}", response.answer);
        println!();
        println!(
            "confidence: {:.2}  internet: {}",
            response.confidence_score, response.used_internet_search
        );

        if !response.sources.is_empty() {
            println!("sources:");
            for source in &response.sources {
                match &source.url {
                    Some(url) => println!("  - {} ({})", source.title, url),
                    None => println!("  - {}", source.title),
                }
            }
        }

        Ok(())
    }
}
