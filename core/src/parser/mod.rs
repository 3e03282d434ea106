pub mod entry;
pub mod parser;
pub mod filters;

pub use entry::{LogEntry, LogLevel, LogSource};
pub use parser::{keyword_spans, OutputParser};
pub use filters::{LogFilter, LevelFilter, PatternFilter, SourceFilter};
