//! Error types for asset path parsing.

use thiserror::Error;

/// Why a path could not be turned into a catalog record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The path does not follow the collection's directory template.
    #[error("malformed path: {0}")]
    MalformedPath(String),

    /// The simulation token is not one of the known simulations.
    #[error("unknown simulation identifier '{0}'")]
    UnknownSimulation(String),
}

impl ParseError {
    /// Short name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::MalformedPath(_) => "MalformedPath",
            ParseError::UnknownSimulation(_) => "UnknownSimulation",
        }
    }
}
