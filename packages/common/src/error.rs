use spark_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures shared by everything that reads templates from disk
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CommonError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CommonError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: ParseError) -> Self {
        CommonError::Parse {
            path: path.into(),
            source,
        }
    }
}
