//! Command handlers for the promptvault CLI.
//!
//! Each command takes the shared store, runs, and returns the prompt it
//! produced; `main` prints it.

pub mod get;
pub mod put;

// Re-export command types for convenience
pub use get::GetCommand;
pub use put::PutCommand;

use promptvault_core::AppResult;
use promptvault_prompt::Prompt;

/// Print a prompt as JSON on stdout.
pub fn print_prompt(prompt: &Prompt, pretty: bool) -> AppResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(prompt)?
    } else {
        serde_json::to_string(prompt)?
    };
    println!("{}", json);
    Ok(())
}
