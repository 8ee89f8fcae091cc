pub mod config;
pub mod directive;
pub mod project;
pub mod task;

pub use config::*;
pub use directive::*;
pub use project::*;
pub use task::*;
