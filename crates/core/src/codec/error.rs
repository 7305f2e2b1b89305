use std::fmt;

#[derive(Debug)]
pub enum CodecError {
    MissingHeader,
    MalformedHeader {
        line: String,
    },
    ColumnCount {
        line_no: usize,
        expected: usize,
        got: usize,
    },
    InvalidPrice {
        line_no: usize,
        column: &'static str,
        value: String,
    },
    /// A record the format cannot store without losing or corrupting it.
    Unrepresentable {
        company: String,
        date: String,
        reason: &'static str,
    },
    Json(serde_json::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => {
                write!(f, "ledger text is empty (expected a \"# YYYY-MM-DD\" header)")
            }
            Self::MalformedHeader { line } => {
                write!(f, "line 1: expected \"# YYYY-MM-DD\" header, got {line:?}")
            }
            Self::ColumnCount {
                line_no,
                expected,
                got,
            } => write!(f, "line {line_no}: expected {expected} columns, got {got}"),
            Self::InvalidPrice {
                line_no,
                column,
                value,
            } => write!(f, "line {line_no}: {column} is not a number: {value:?}"),
            Self::Unrepresentable {
                company,
                date,
                reason,
            } => write!(f, "cannot store record {company:?} ({date}): {reason}"),
            Self::Json(err) => write!(f, "invalid JSON ledger: {err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
