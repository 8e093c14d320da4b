//! Error type for header generation
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The output header (or its temporary sibling) could not be created
    #[error("cannot create output file {}", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A shader binary could not be read
    #[error("cannot read shader binary {}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing to the header stream failed
    #[error("failed to write header")]
    Write(#[from] io::Error),

    /// The finished header could not be moved into place
    #[error("cannot move finished header to {}", .path.display())]
    PersistOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Path has no file name, or it is not valid UTF-8
    #[error("{} has no usable file name", .0.display())]
    InvalidFileName(PathBuf),

    /// The derived symbol is not a C identifier
    #[error("symbol `{symbol}` derived from {} is not a valid C identifier", .path.display())]
    InvalidSymbol { path: PathBuf, symbol: String },

    /// Two inputs map to the same symbol
    #[error(
        "symbol `{symbol}` is derived from both {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateSymbol {
        symbol: String,
        first: PathBuf,
        second: PathBuf,
    },
}
