use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Submission rejected: {0}")]
    Validation(String),

    #[error("Request failed: {0}")]
    Fetch(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data.
    /// Bodies can echo user-entered text, so the cut must land on a
    /// char boundary.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    /// Classify a non-2xx response. 404 means the keyed resource does not
    /// exist; any other 4xx is a rejected submission; everything else is
    /// an unclassified fetch failure.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            404 => ApiError::NotFound(truncated),
            400..=499 => ApiError::Validation(truncated),
            _ => ApiError::Fetch(format!("Status {}: {}", status, truncated)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "no such car"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "make is required"),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad vin"),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ApiError::Fetch(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::Fetch(_)
        ));
    }

    #[test]
    fn test_body_truncation_on_char_boundary() {
        // 200 euro signs = 600 bytes, with a character straddling the
        // 500-byte cut point.
        let multibyte_body = "\u{20ac}".repeat(200);
        match ApiError::from_status(reqwest::StatusCode::BAD_REQUEST, &multibyte_body) {
            ApiError::Validation(msg) => {
                assert!(msg.contains("truncated"));
                assert!(msg.contains("600 total bytes"));
                // The kept prefix is whole characters only.
                assert!(msg.starts_with('\u{20ac}'));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_body_truncation() {
        let long_body = "x".repeat(2000);
        match ApiError::from_status(reqwest::StatusCode::NOT_FOUND, &long_body) {
            ApiError::NotFound(msg) => {
                assert!(msg.len() < 600);
                assert!(msg.contains("truncated"));
                assert!(msg.contains("2000 total bytes"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
