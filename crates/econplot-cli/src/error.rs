use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] econplot_core::ValidationError),

    #[error("usage error: {0}")]
    Usage(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Usage(_) => 2,
            Self::Serialization(_) => 10,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_and_serialization_share_exit_code() {
        let io = CliError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(io.exit_code(), 10);

        let usage = CliError::Usage(String::from("scatter needs two series"));
        assert_eq!(usage.exit_code(), 2);
        assert_eq!(usage.to_string(), "usage error: scatter needs two series");
    }
}
