/// Typed errors for portal API operations
use thiserror::Error;

/// Result type alias for portal operations
pub type PortalResult<T> = Result<T, PortalError>;

/// Errors that can occur while talking to the device portal
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered with HTTP {code}")]
    Status { endpoint: &'static str, code: u16 },

    #[error("Could not decode {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Value for header {header} cannot be sent")]
    InvalidHeader { header: &'static str },

    #[error("Invalid portal URL '{0}'")]
    InvalidUrl(String),
}

impl PortalError {
    /// Short text for the error banner, without the nested source chain
    pub fn summary(&self) -> String {
        match self {
            PortalError::Http { endpoint, source } if source.is_timeout() => {
                format!("{endpoint}: device did not answer in time")
            }
            PortalError::Http { endpoint, source } if source.is_connect() => {
                format!("{endpoint}: device unreachable")
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_endpoint_and_code() {
        let err = PortalError::Status {
            endpoint: "/config.json",
            code: 500,
        };
        assert_eq!(err.to_string(), "/config.json answered with HTTP 500");
        assert_eq!(err.summary(), err.to_string());
    }

    #[test]
    fn decode_error_keeps_source() {
        let source = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = PortalError::Decode {
            endpoint: "/ap.json",
            source,
        };
        assert!(err.to_string().starts_with("Could not decode /ap.json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
