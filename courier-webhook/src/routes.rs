use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::routing::{post, MethodRouter};
use axum::Form;
use courier_axum::{CourierAxumError, Twiml};
use courier_core::{InboundEvent, WebhookForm};

use crate::services::IngestService;

pub const WEBHOOK_PATH: &str = "/whatsapp-webhook";

pub fn webhook(service: Arc<IngestService>) -> MethodRouter<()> {
    post(whatsapp_webhook).with_state(service)
}

async fn whatsapp_webhook(
    State(service): State<Arc<IngestService>>,
    form: Result<Form<WebhookForm>, FormRejection>,
) -> Result<Twiml, CourierAxumError> {
    let Form(form) = form?;
    let event = InboundEvent::try_from(form)?;

    tracing::info!(
        sender = %event.sender,
        media_count = event.media_count,
        "incoming message"
    );

    let ingested = service.ingest(&event).await?;
    Ok(Twiml::message(ingested.reply))
}
