/// Core error types for the Cuereel pipeline.
use std::path::PathBuf;

/// A specialized Result type for Cuereel operations.
pub type CuereelResult<T> = Result<T, CuereelError>;

/// Top-level error type encompassing all Cuereel subsystems.
#[derive(Debug, thiserror::Error)]
pub enum CuereelError {
    #[error("time format error: {message} in '{token}'")]
    TimeFormat { message: String, token: String },

    #[error("script format error: {message} at line {line}")]
    ScriptFormat { message: String, line: usize },

    #[error("asset fetch error: {message} ({url})")]
    AssetFetch { message: String, url: String },

    #[error("media decode error: {message} ({path:?})")]
    MediaDecode { message: String, path: PathBuf },

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CuereelError {
    /// Create a time-format error naming the offending token.
    pub fn time_format(message: impl Into<String>, token: impl Into<String>) -> Self {
        CuereelError::TimeFormat {
            message: message.into(),
            token: token.into(),
        }
    }

    /// Create a script-format error with a 1-based source line.
    pub fn script_format(message: impl Into<String>, line: usize) -> Self {
        CuereelError::ScriptFormat {
            message: message.into(),
            line,
        }
    }

    /// Create an asset-fetch error.
    pub fn asset_fetch(message: impl Into<String>, url: impl Into<String>) -> Self {
        CuereelError::AssetFetch {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a media-decode error.
    pub fn media_decode(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        CuereelError::MediaDecode {
            message: message.into(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_format_error_display() {
        let err = CuereelError::time_format("non-numeric field", "00:xx:05 --> 00:00:10");
        assert_eq!(
            err.to_string(),
            "time format error: non-numeric field in '00:xx:05 --> 00:00:10'"
        );
    }

    #[test]
    fn test_script_format_error_display() {
        let err = CuereelError::script_format("cue block has more than two content lines", 12);
        assert_eq!(
            err.to_string(),
            "script format error: cue block has more than two content lines at line 12"
        );
    }

    #[test]
    fn test_media_decode_error_display() {
        let err = CuereelError::media_decode("unreadable stream", "/cache/cue0001_ab12.webm");
        assert!(err.to_string().contains("unreadable stream"));
    }
}
