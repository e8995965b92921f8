use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::logic::ReferenceError;

impl ReferenceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReferenceError::NotFound(_) => StatusCode::NOT_FOUND,
            ReferenceError::MethodNotSupported(_) => StatusCode::METHOD_NOT_ALLOWED,
            ReferenceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ReferenceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors are reported by status code alone; the detail goes to the log.
impl IntoResponse for ReferenceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ReferenceError::Internal(e) => log::error!("Request failed: {:#}", e),
            other => log::warn!("{}", other),
        }
        status.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ReferenceError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ReferenceError::method_not_supported("x").status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ReferenceError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ReferenceError::from(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_has_status_only() {
        let response = ReferenceError::not_found("Order '5' does not exist").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
