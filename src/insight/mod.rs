//! Everything that talks to, or prepares text for, the hosted language model.

pub mod assistant;
pub mod client;
pub mod extract;
pub mod prompt;

pub use assistant::build_sql_prompt;
pub use client::{OpenRouterClient, TextGenerator, UnconfiguredGenerator};
pub use extract::{extract_sql, ExtractError};
pub use prompt::build_prompt;
