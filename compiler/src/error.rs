use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("No <protocol> element found")]
    MissingProtocol,

    #[error(
        "Found multiple definitions of interface [{interface}] in [{first}] and [{second}]. \
         Protocol resolution would not be possible"
    )]
    DuplicateInterface {
        interface: String,
        first:     String,
        second:    String,
    },

    #[error("Cannot resolve protocol for [{0}] interface")]
    UnknownInterface(String),

    #[error("interfaces [{}] involved in a cycle(s)", .0.join(", "))]
    Cycle(Vec<String>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
