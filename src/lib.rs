// Citewright - LLM-backed drafting service for military performance statements

pub mod config;
pub mod edit;
pub mod errors;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod server;
pub mod style;
