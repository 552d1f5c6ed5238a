pub mod api;
pub mod cli;
pub mod commands;
mod context;
mod locks;
pub mod logging;
mod prompting;
pub mod server;

pub use context::{AppContext, Collaborators, PipelineSettings};
pub use locks::KeywordLocks;
