use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (missing key field, bad cutoff, etc.).
    ConfigValidation(String),
    /// A technology name that is not one of lte / nr / bbu.
    UnknownTechnology(String),
    /// Search or view asked for a canonical field the technology doesn't define.
    UnknownField { technology: String, field: String },
    /// Search value was empty after trimming.
    EmptyQuery,
    /// Change request asked for a parameter with no configured template.
    UnknownParameter { technology: String, parameter: String },
    /// A source file could not be read into a table.
    Load { file: String, message: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl ReconError {
    /// Usage errors are the caller's fault (bad query, unknown field) rather
    /// than a data or environment problem.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::EmptyQuery | Self::UnknownField { .. } | Self::UnknownParameter { .. }
        )
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownTechnology(name) => {
                write!(f, "unknown technology: {name} (expected lte, nr or bbu)")
            }
            Self::UnknownField { technology, field } => {
                write!(f, "technology '{technology}': unknown field '{field}'")
            }
            Self::EmptyQuery => write!(f, "search value must not be empty"),
            Self::UnknownParameter { technology, parameter } => {
                write!(f, "technology '{technology}': no change request defined for '{parameter}'")
            }
            Self::Load { file, message } => write!(f, "cannot load '{file}': {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
