use std::path::PathBuf;

use thiserror::Error;

/// A path or URL that could not be percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed percent-encoding at byte {offset} of {input:?}")]
    Malformed { input: String, offset: usize },
    #[error("percent-decoded {input:?} is not valid UTF-8")]
    InvalidUtf8 { input: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: DecodeError,
    },
    #[error("line {line}: expected `<source> <destination>`, found {fields} field(s)")]
    MalformedRule { line: usize, fields: usize },
    #[error("redirect source {source_path:?} escapes the output directory")]
    UnsafePath { source_path: String },
    #[error("invalid redirect options: {0}")]
    Options(#[from] toml::de::Error),
    #[error(transparent)]
    Render(#[from] askama::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to generate {} redirect page(s): {}", .0.len(), list_pages(.0))]
    Pages(Vec<PageError>),
}

/// Failure to produce a single redirect page.
#[derive(Debug, Error)]
#[error("{}: {cause}", .path.display())]
pub struct PageError {
    pub path: PathBuf,
    pub cause: Box<Error>,
}

fn list_pages(errors: &[PageError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
