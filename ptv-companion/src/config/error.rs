//! Configuration error types.

/// Errors from reading, writing or decoding the configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the backing file failed
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored or received document is not valid JSON of the expected shape
    #[error("invalid config document: {message}")]
    Invalid { message: String },

    /// The web view response was not valid percent-encoded UTF-8
    #[error("invalid web view response: {message}")]
    Encoding { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ConfigError::Invalid {
            message: "missing field `token`".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config document: missing field `token`"
        );

        let err = ConfigError::Io {
            path: "/tmp/x.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("config I/O error at /tmp/x.json"));
    }
}
