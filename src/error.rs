//! Error types returned by the inference client.

use std::fmt;

/// Detail used when a failed response carries no usable `detail` field.
pub const FALLBACK_DETAIL: &str = "Erro ao processar imagem";

/// A non-success response from the inference server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Builds the error from a failed response body.
    ///
    /// The server answers failures with `{"detail": ...}`. A string detail is
    /// taken verbatim; validation errors carry a structured detail, which is
    /// kept in its compact JSON form. Anything else falls back to
    /// [`FALLBACK_DETAIL`].
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| match value.get("detail") {
                Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
                Some(serde_json::Value::Null) | None => None,
                Some(serde_json::Value::String(_)) => None,
                Some(other) => Some(other.to_string()),
            })
            .unwrap_or_else(|| FALLBACK_DETAIL.to_string());

        Self { status, detail }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.detail)
    }
}

impl std::error::Error for ApiError {}

/// Why an image reference could not be turned into a payload.
#[derive(Debug)]
pub enum EncodingErrorKind {
    /// Reading the local file failed
    Read(std::io::Error),
    /// Fetching a remote blob failed before a response arrived
    Fetch(reqwest::Error),
    /// Fetching a remote blob returned a non-success status
    FetchStatus(u16),
    /// A data URI had no `,` separating header and payload
    MalformedDataUri,
    /// A base64 data URI payload could not be decoded
    InvalidBase64(base64::DecodeError),
    /// The reference resolved to zero bytes
    Empty,
    /// The media type could not be attached to an upload part
    InvalidMediaType(reqwest::Error),
}

/// Failure to load and encode a local image reference.
#[derive(Debug)]
pub struct EncodingError {
    reference: String,
    kind: EncodingErrorKind,
}

impl EncodingError {
    pub fn new(reference: impl Into<String>, kind: EncodingErrorKind) -> Self {
        Self {
            reference: reference.into(),
            kind,
        }
    }

    /// The image reference that failed, as given by the caller.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn kind(&self) -> &EncodingErrorKind {
        &self.kind
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EncodingErrorKind::Read(e) => {
                write!(f, "Failed to read image {}: {}", self.reference, e)
            }
            EncodingErrorKind::Fetch(e) => {
                write!(f, "Failed to fetch image {}: {}", self.reference, e)
            }
            EncodingErrorKind::FetchStatus(status) => {
                write!(
                    f,
                    "Failed to fetch image {}: HTTP {}",
                    self.reference, status
                )
            }
            EncodingErrorKind::MalformedDataUri => {
                write!(f, "Malformed data URI: {}", self.reference)
            }
            EncodingErrorKind::InvalidBase64(e) => {
                write!(f, "Invalid base64 in {}: {}", self.reference, e)
            }
            EncodingErrorKind::Empty => write!(f, "Image {} is empty", self.reference),
            EncodingErrorKind::InvalidMediaType(e) => {
                write!(f, "Invalid media type for {}: {}", self.reference, e)
            }
        }
    }
}

impl std::error::Error for EncodingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            EncodingErrorKind::Read(e) => Some(e),
            EncodingErrorKind::Fetch(e) => Some(e),
            EncodingErrorKind::InvalidBase64(e) => Some(e),
            EncodingErrorKind::InvalidMediaType(e) => Some(e),
            _ => None,
        }
    }
}

/// Any failure of a client operation.
#[derive(Debug)]
pub enum ClientError {
    /// The image could not be loaded or encoded
    Encoding(EncodingError),
    /// The server answered with a non-success status
    Api(ApiError),
    /// The request never produced a response (DNS, connect, timeout, ...)
    Network(reqwest::Error),
    /// A success response whose body did not match the expected shape
    InvalidResponse(serde_json::Error),
}

impl ClientError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(e) => Some(e.status),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Encoding(e) => write!(f, "{}", e),
            ClientError::Api(e) => write!(f, "Inference API error: {}", e),
            ClientError::Network(e) => write!(f, "Network error: {}", e),
            ClientError::InvalidResponse(e) => {
                write!(f, "Unexpected response from inference API: {}", e)
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Encoding(e) => Some(e),
            ClientError::Api(e) => Some(e),
            ClientError::Network(e) => Some(e),
            ClientError::InvalidResponse(e) => Some(e),
        }
    }
}

impl From<EncodingError> for ClientError {
    fn from(e: EncodingError) -> Self {
        ClientError::Encoding(e)
    }
}

impl From<ApiError> for ClientError {
    fn from(e: ApiError) -> Self {
        ClientError::Api(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_api_error_from_string_detail() {
        let err = ApiError::from_body(
            400,
            br#"{"detail": "Erro ao processar imagem: cannot identify image file"}"#,
        );
        assert_eq!(err.status, 400);
        assert_eq!(
            err.detail,
            "Erro ao processar imagem: cannot identify image file"
        );
    }

    #[test]
    fn test_api_error_ignores_body_status_field() {
        let err = ApiError::from_body(502, br#"{"status": 400, "detail": "bad gateway"}"#);
        assert_eq!(err.status, 502);
        assert_eq!(err.detail, "bad gateway");
    }

    #[test]
    fn test_api_error_structured_detail() {
        let err = ApiError::from_body(
            422,
            br#"{"detail": [{"loc": ["body", "image"], "msg": "field required"}]}"#,
        );
        assert_eq!(err.status, 422);
        assert_eq!(
            err.detail,
            r#"[{"loc":["body","image"],"msg":"field required"}]"#
        );
    }

    #[test]
    fn test_api_error_fallback_detail() {
        for body in [
            &b""[..],
            &b"<html>Internal Server Error</html>"[..],
            &br#"{"error": "boom"}"#[..],
            &br#"{"detail": null}"#[..],
            &br#"{"detail": "   "}"#[..],
        ] {
            let err = ApiError::from_body(500, body);
            assert_eq!(err.status, 500);
            assert_eq!(err.detail, FALLBACK_DETAIL);
        }
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::new(503, "Modelo não disponível");
        assert_eq!(err.to_string(), "HTTP 503: Modelo não disponível");
    }

    #[test]
    fn test_encoding_error_wraps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = EncodingError::new("/tmp/eye.jpg", EncodingErrorKind::Read(io));

        assert_eq!(err.reference(), "/tmp/eye.jpg");
        assert!(err.to_string().contains("/tmp/eye.jpg"));
        assert!(err.to_string().contains("no such file"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_encoding_error_empty_has_no_source() {
        let err = EncodingError::new("blob", EncodingErrorKind::Empty);
        assert!(err.to_string().contains("empty"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_client_error_status() {
        let err = ClientError::from(ApiError::new(404, "Not Found"));
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("HTTP 404"));

        let err = ClientError::from(EncodingError::new("x", EncodingErrorKind::Empty));
        assert_eq!(err.status(), None);
    }
}
