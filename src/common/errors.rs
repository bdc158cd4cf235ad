use std::collections::BTreeMap;
use std::fmt;

/// Status, body and headers of a non-success API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorDetails {
    pub status: u16,
    /// The `error` field of the JSON body, or the raw body when there is none.
    pub message: String,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ApiErrorDetails {
    pub fn new(status: u16, body: String, headers: BTreeMap<String, String>) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .and_then(|error| error.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.clone());

        Self {
            status,
            message,
            body,
            headers,
        }
    }
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} - {}", self.status, self.message)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CryptowatchError {
    #[error("Missing path parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid query parameter: {0}")]
    InvalidParameter(String),

    #[error("API key error: {0}")]
    ApiKey(String),

    #[error("Failed to structure response: {message} (payload: '{payload}')")]
    ResponseStructure { message: String, payload: String },

    #[error("Resource not found: {0}")]
    ApiResourceNotFound(ApiErrorDetails),

    #[error("Rate limit exceeded: {0}")]
    ApiRateLimit(ApiErrorDetails),

    #[error("Server error: {0}")]
    ApiServer(ApiErrorDetails),

    #[error("Request error: {0}")]
    ApiRequest(ApiErrorDetails),

    #[error("API error: {0}")]
    Api(ApiErrorDetails),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CryptowatchError {
    /// Classify a non-success HTTP status.
    pub fn from_status(details: ApiErrorDetails) -> Self {
        match details.status {
            404 => CryptowatchError::ApiResourceNotFound(details),
            429 => CryptowatchError::ApiRateLimit(details),
            500..=599 => CryptowatchError::ApiServer(details),
            400..=499 => CryptowatchError::ApiRequest(details),
            _ => CryptowatchError::Api(details),
        }
    }

    /// Details of the HTTP response, for the API error variants.
    pub fn api_details(&self) -> Option<&ApiErrorDetails> {
        match self {
            CryptowatchError::ApiResourceNotFound(details)
            | CryptowatchError::ApiRateLimit(details)
            | CryptowatchError::ApiServer(details)
            | CryptowatchError::ApiRequest(details)
            | CryptowatchError::Api(details) => Some(details),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(status: u16, body: &str) -> ApiErrorDetails {
        ApiErrorDetails::new(status, body.to_string(), BTreeMap::new())
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            CryptowatchError::from_status(details(404, "")),
            CryptowatchError::ApiResourceNotFound(_)
        ));
        assert!(matches!(
            CryptowatchError::from_status(details(429, "")),
            CryptowatchError::ApiRateLimit(_)
        ));
        assert!(matches!(
            CryptowatchError::from_status(details(503, "")),
            CryptowatchError::ApiServer(_)
        ));
        assert!(matches!(
            CryptowatchError::from_status(details(400, "")),
            CryptowatchError::ApiRequest(_)
        ));
        assert!(matches!(
            CryptowatchError::from_status(details(302, "")),
            CryptowatchError::Api(_)
        ));
    }

    #[test]
    fn test_message_prefers_error_field() {
        let d = details(404, r#"{"error":"Instrument not found"}"#);
        assert_eq!(d.message, "Instrument not found");
        assert_eq!(d.to_string(), "HTTP 404 - Instrument not found");

        let d = details(502, "Bad Gateway");
        assert_eq!(d.message, "Bad Gateway");
    }

    #[test]
    fn test_api_details_only_for_api_errors() {
        let err = CryptowatchError::from_status(details(500, "boom"));
        assert_eq!(err.api_details().map(|d| d.status), Some(500));
        assert!(
            CryptowatchError::InvalidPeriod("x".to_string())
                .api_details()
                .is_none()
        );
    }
}
