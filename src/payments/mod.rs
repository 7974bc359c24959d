//! Asynchronous payment outcomes

pub mod webhook;

pub use webhook::{map_transaction_status, parse_webhook, WebhookEvent, WebhookOutcome, WebhookProcessor};
