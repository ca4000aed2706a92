use reqwest::StatusCode;

/// A failed round trip to the backend.
///
/// Network failures and rejected requests share this one shape so callers
/// only need to show the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    status: Option<u16>,
}

impl TransportError {
    /// A response outside the success range, with the server's explanation
    /// if it gave one.
    #[must_use]
    pub fn status(code: u16, detail: Option<String>) -> Self {
        let reason = StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("unknown status");
        let message = match detail {
            Some(detail) => format!("server responded with {code} {reason}: {detail}"),
            None => format!("server responded with {code} {reason}"),
        };
        Self {
            message,
            status: Some(code),
        }
    }

    /// A failure that never produced a response.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// The HTTP status, if the server responded.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        self.status
    }

    /// A human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return Self::status(status.as_u16(), None);
        }
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            "could not connect to the story server".to_string()
        } else if error.is_decode() {
            format!("could not decode the server response: {error}")
        } else {
            format!("request failed: {error}")
        };
        Self::other(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_includes_reason_and_detail() {
        let error = TransportError::status(404, Some("Story not found".to_string()));
        assert_eq!(
            error.to_string(),
            "server responded with 404 Not Found: Story not found"
        );
        assert_eq!(error.status_code(), Some(404));
    }

    #[test]
    fn other_has_no_status() {
        let error = TransportError::other("boom");
        assert_eq!(error.message(), "boom");
        assert_eq!(error.status_code(), None);
    }
}
