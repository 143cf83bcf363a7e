use thiserror::Error;

/// Terminal conditions raised while parsing ipmitool output.
///
/// "No matching line" is never an error: the pattern dialects return an
/// empty or default result for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line is structurally too short to hold the dialect's fields.
    #[error("malformed line: '{line}'")]
    MalformedLine { line: String },

    /// A field that must be numeric could not be converted.
    #[error("cannot convert '{value}' to a number in line: '{line}'")]
    Conversion { line: String, value: String },
}

impl ParseError {
    pub(crate) fn malformed(line: &str) -> Self {
        Self::MalformedLine {
            line: line.to_string(),
        }
    }

    pub(crate) fn conversion(line: &str, value: &str) -> Self {
        Self::Conversion {
            line: line.to_string(),
            value: value.to_string(),
        }
    }
}
