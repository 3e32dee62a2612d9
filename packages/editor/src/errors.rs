//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] mentor_parser::error::ParseError),

    #[error("Print error: {0}")]
    Print(#[from] mentor_parser::error::PrintError),
}
