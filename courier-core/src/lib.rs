//! courier-core: framework-agnostic core for Courier.
//!
//! Holds the pieces every other crate agrees on: the app container with its
//! key/value configuration, the structured error type, the inbound webhook
//! event model and the storage key format.

pub mod app;
pub mod config;
pub mod errors;
pub mod event;
pub mod key;

pub use app::CourierApp;
pub use config::{CourierConfig, CourierConfigSnapshot};
pub use errors::{CourierError, CourierResult, ErrorKind, ResultExt};
pub use event::{Attachment, InboundEvent, MediaType, Sender, WebhookForm};
pub use key::{KeyCategory, StorageKey};
