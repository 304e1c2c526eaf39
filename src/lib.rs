pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod project;
pub mod prompt;
pub mod shell;
pub mod version;
