//! Model integration: prompt rendering, the model client and response parsing

pub mod client;
pub mod parser;
pub mod prompts;

pub use client::{DisabledModel, GeminiClient, ModelClient};
pub use parser::{parse, ParseStage, ParsedModelOutput};
pub use prompts::build_prompt;
