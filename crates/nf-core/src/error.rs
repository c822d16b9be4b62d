use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Download failed for {link}: {message}")]
    Download { link: String, message: String },

    #[error("Extraction error ({strategy}): {message}")]
    Extraction { strategy: String, message: String },

    #[error("Tool error: {tool} - {message}")]
    Tool { tool: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    pub fn download(link: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            link: link.into(),
            message: message.into(),
        }
    }

    pub fn extraction(strategy: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            strategy: strategy.into(),
            message: message.into(),
        }
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Map an unsuccessful HTTP status from an upstream API to an error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => Error::auth(message),
            429 => Error::rate_limit(message),
            400 => Error::invalid_request(message),
            _ => Error::api(status, message),
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::api(500, "Upstream exploded");
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Upstream exploded"));

        let err = Error::download("https://example.com/a", "status 404");
        assert_eq!(
            err.to_string(),
            "Download failed for https://example.com/a: status 404"
        );
    }

    #[test]
    fn test_from_status() {
        assert!(Error::from_status(401, "apiKeyInvalid").is_auth_error());
        assert!(matches!(Error::from_status(429, "rateLimited"), Error::RateLimit(_)));
        assert!(matches!(Error::from_status(400, "parameterInvalid"), Error::InvalidRequest(_)));
        assert!(matches!(
            Error::from_status(503, "down"),
            Error::Api { status: 503, .. }
        ));
    }
}
