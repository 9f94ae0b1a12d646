use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use courier_core::{CourierError, ErrorKind};

use crate::Twiml;

/// The HTTP error boundary.
///
/// Whatever went wrong, the sender sees the same reply: HTTP 500 with the
/// fixed failure message. The detail goes to the log only.
#[derive(Debug)]
pub struct CourierAxumError(pub anyhow::Error);

impl From<anyhow::Error> for CourierAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<CourierError> for CourierAxumError {
    fn from(e: CourierError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<FormRejection> for CourierAxumError {
    fn from(rejection: FormRejection) -> Self {
        CourierError::invalid_event("failed to decode the webhook form")
            .with_source(rejection)
            .into()
    }
}

impl CourierAxumError {
    pub fn kind(&self) -> ErrorKind {
        CourierError::from_anyhow(&self.0)
            .map(|e| e.kind)
            .unwrap_or(ErrorKind::General)
    }
}

impl IntoResponse for CourierAxumError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        tracing::error!(
            kind = kind.class_name(),
            error = %format!("{:#}", self.0),
            "webhook request failed"
        );

        (StatusCode::INTERNAL_SERVER_ERROR, Twiml::failure()).into_response()
    }
}
