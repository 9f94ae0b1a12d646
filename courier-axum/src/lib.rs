//! courier-axum: Axum adapter for Courier.
//!
//! Builds the HTTP surface around a [`courier_core::CourierApp`]: routes,
//! request-id and trace layers, TwiML replies and the single error
//! boundary that turns any failure into the uniform HTTP 500 reply.

pub mod app;
mod error;
pub mod twiml;

pub use error::CourierAxumError;
pub use twiml::{Twiml, FAILURE_MESSAGE, TWIML_CONTENT_TYPE};

pub use app::{axum, AxumApp};
