use http::StatusCode;
use kvorm_core::{Error as CoreError, ErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum RouteError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("{message}")]
    Status { status: StatusCode, message: String },
}

impl RouteError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        RouteError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        RouteError::Core(CoreError::bad_request(message))
    }

    /// The response status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouteError::Core(e) => match e.kind() {
                ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RouteError::Status { status, .. } => *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvorm_core::KvError;

    #[test]
    fn core_kinds_map_to_statuses() {
        let cases = [
            (CoreError::bad_request("b"), StatusCode::BAD_REQUEST),
            (CoreError::not_found("n"), StatusCode::NOT_FOUND),
            (CoreError::internal("i"), StatusCode::INTERNAL_SERVER_ERROR),
            (CoreError::configuration("c"), StatusCode::INTERNAL_SERVER_ERROR),
            (CoreError::from(KvError::Closed), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(RouteError::from(err).status_code(), status);
        }
    }

    #[test]
    fn explicit_status_is_kept() {
        let err = RouteError::status(StatusCode::NOT_IMPLEMENTED, "Widget");
        assert_eq!(err.status_code(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(err.to_string(), "Widget");
    }

    #[test]
    fn display_is_core_message() {
        let err = RouteError::from(CoreError::not_found("Widget with id 3 not found."));
        assert_eq!(err.to_string(), "Widget with id 3 not found.");
    }
}
