use thiserror::Error;

/// Errors produced by the library.
#[derive(Error, Debug)]
pub enum Error {
    /// A radius, size, stroke or coordinate is outside its valid range.
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// What was wrong with the input.
        reason: String,
    },

    /// The font-metrics lookup could not resolve the requested font.
    #[error("Unable to resolve font '{family}' for text measurement")]
    FontResolution {
        /// The font family (or font file) that was requested.
        family: String,
    },

    /// The document could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// True for `InvalidGeometry`.
    pub fn is_geometry(&self) -> bool {
        matches!(self, Self::InvalidGeometry { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = Error::geometry("circle radius must be positive, got -1");
        assert_eq!(
            err.to_string(),
            "Invalid geometry: circle radius must be positive, got -1"
        );
        assert!(err.is_geometry());

        let err = Error::FontResolution {
            family: "Arial".to_string(),
        };
        assert!(err.to_string().contains("'Arial'"));
        assert!(!err.is_geometry());
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
