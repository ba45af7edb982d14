use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading a code table. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to read code table '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("code table '{}' is not valid {encoding}", path.display())]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },
    #[error("unknown text encoding '{0}'")]
    UnknownEncoding(String),
    #[error("line {line}: expected '<symbol> <code>', got {content:?}")]
    MalformedRecord { line: usize, content: String },
    #[error("line {line}: symbol {symbol:?} is not a single character")]
    InvalidSymbol { line: usize, symbol: String },
    #[error("line {line}: missing code after symbol")]
    EmptyCode { line: usize },
}
