// src/common.rs
//
// common imports, type aliases, and other globals (avoids circular imports)

pub use std::fs::File;
pub use std::path::Path;

// TODO: use `std::path::Path` for `FPath`
/// `F`ake `Path` or `F`ile `Path`
pub type FPath = String;

/// A general-purpose counter.
pub type Count = u64;

/// One raw line of a fatal error log, line terminator stripped.
pub type LogLine = String;

/// Ordinal position of a line within the log file, first line is `1`.
pub type LineNum = usize;

/// A quantity of bytes derived from a size+unit log token.
pub type ByteSz = u64;

/// Hard cap on stored unidentified log lines.
///
/// A throttle against pathological or truncated inputs, not an error;
/// lines beyond the cap are silently dropped.
pub const UNIDENTIFIED_LOG_LINES_MAX: usize = 1000;
