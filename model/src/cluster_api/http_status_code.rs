pub use http::StatusCode;

/// Extracts the HTTP status code, if any, from an API error so that callers
/// can distinguish "the object is not there" (404) and "the object is
/// already there" (409) from genuine failures.
pub trait HttpStatusCode {
    fn status_code(&self) -> Option<StatusCode>;

    fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND)
    }

    fn is_conflict(&self) -> bool {
        self.status_code() == Some(StatusCode::CONFLICT)
    }
}

impl HttpStatusCode for kube::Error {
    fn status_code(&self) -> Option<StatusCode> {
        if let kube::Error::Api(error_response) = self {
            StatusCode::from_u16(error_response.code).ok()
        } else {
            None
        }
    }
}
