//! Error types for loading, exporting and configuring the lookup service

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the source spreadsheet
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source file does not exist
    #[error("data file not found: {0}")]
    NotFound(PathBuf),

    /// The source file exists but could not be read
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The workbook could not be parsed
    #[error("failed to read workbook: {0}")]
    Excel(String),

    /// The CSV file could not be parsed
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The file extension is not a spreadsheet format we read
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The first sheet has no header row
    #[error("spreadsheet is empty")]
    Empty,

    /// A column the lookup needs is absent from the header row
    #[error("missing required column '{0}'")]
    MissingColumn(String),
}

/// Errors raised while serializing a result for download
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write xlsx: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing command-line configuration
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid search trigger '{0}' (expected 'auto' or 'button')")]
    InvalidTrigger(String),

    #[error("invalid bind address '{0}'")]
    InvalidAddress(String),
}
