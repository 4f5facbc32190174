pub mod chart;
pub mod config;
pub mod parser;
pub mod prompt;
pub mod render;
pub mod report;
pub mod transcript;

pub use chart::{ChartDescriptor, ChartKind, DataPoint, RenderOptions};
pub use parser::{parse_message_content, ContentParser, FillerPolicy, ParseResult, ParserOptions};
