//! courier-webhook: receives WhatsApp messages from Twilio and stores them.
//!
//! Text bodies land under `whatsapp-text/`, attachments under
//! `whatsapp-media/`. Attachments declared as PDF are repaired, or wrapped
//! into a fresh PDF, before upload.

pub mod config;
pub mod routes;
pub mod services;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use courier_axum::{axum, AxumApp};
use courier_core::CourierApp;

use crate::services::{HttpMediaFetcher, IngestService};

/// Build the service from the process environment.
pub async fn build() -> Result<AxumApp> {
    let app = CourierApp::with_config(config::config_from_env());
    let snapshot = app.config_snapshot();

    let blobs = storage::blob_adapter(&snapshot).await?;
    let timeout = snapshot.get_u64("media.timeout_secs").map(Duration::from_secs);
    let fetcher = Arc::new(HttpMediaFetcher::new(timeout)?);

    Ok(build_with(app, IngestService::new(fetcher, blobs)))
}

/// Assemble the router around an already constructed ingestion service.
pub fn build_with(app: CourierApp, service: IngestService) -> AxumApp {
    axum(app)
        .use_route(routes::WEBHOOK_PATH, routes::webhook(Arc::new(service)))
        .service("/health", || async { "ok" })
        .with_request_tracing()
}
