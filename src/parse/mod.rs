pub mod directive;
pub mod inherit;
pub mod line_scanner;
pub mod metadata;
pub mod project;
pub mod span;
pub mod tags;
pub mod task_builder;
pub mod task_parser;

use std::fmt;

pub use directive::parse_directive;
pub use line_scanner::{LineKind, RawLine, scan};
pub use metadata::{Extraction, MetadataExtractor, extract};
pub use tags::{TagScan, TagScanner};
pub use task_builder::TaskBuilder;
pub use task_parser::ConfigurableTaskParser;

/// A configured safety bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    ParseIterations,
    MetadataIterations,
    StackOperations,
    StackSize,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Limit::ParseIterations => "max_parse_iterations",
            Limit::MetadataIterations => "max_metadata_iterations",
            Limit::StackOperations => "max_stack_operations",
            Limit::StackSize => "max_stack_size",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{limit} ({max}) exceeded at line {}", .line + 1)]
    LimitExceeded { limit: Limit, max: usize, line: usize },
}
