use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

pub type AppResult<T> = Result<T, Error>;

/// errors that make it out to a client. Upstream failures mostly never get here, they degrade to
/// empty output long before the handler sees them
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InternalServerErrorWithContext(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InternalServerErrorWithContext(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// plain text bodies, whatever is consuming these is an iptv client and not a browser
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("responding with {}: {}", status, self);
        }

        (status, self.to_string()).into_response()
    }
}
