use thiserror::Error;

/// Failures raised while fetching, locating tags, or reconciling statuses.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("page unreachable: {url} ({reason})")]
    PageUnreachable { url: String, reason: String },

    #[error("HTTP {status} for: {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("tag not found: {selector}")]
    TagNotFound { selector: String },

    #[error("invalid selector: {selector}")]
    InvalidSelector { selector: String },

    #[error("tag {selector} has no '{attr}' attribute")]
    MissingAttribute { selector: String, attr: String },

    #[error("no sidebar list containing 'All versions' was found")]
    VersionsListNotFound,

    #[error("unexpected status '{status}' for code '{code}' at {url}")]
    UnexpectedStatus {
        url: String,
        code: String,
        status: String,
    },

    #[error("row has {actual} fields, header has {expected}")]
    RowArity { expected: usize, actual: usize },

    #[error("invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ParserError {
    /// Transport-level failures are the ones a best-effort fetch may swallow.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ParserError::PageUnreachable { .. } | ParserError::HttpStatus { .. }
        )
    }

    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        ParserError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;
