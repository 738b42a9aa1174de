pub mod api;
pub mod cli;
pub mod config;
pub mod llm;
pub mod page;
pub mod session;
