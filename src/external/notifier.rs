use super::documents::RenderedDocument;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A message handed to the delivery channel
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment: Option<RenderedDocument>,
}

/// Delivery channel for treatment communications (e-mail, PEC, ...).
///
/// Implementations report failure as a human readable reason; callers never
/// see a panic or a transport error type from here.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryOutcome {
    pub delivered: bool,
    pub error: Option<String>,
}

impl From<Result<(), String>> for DeliveryOutcome {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self {
                delivered: true,
                error: None,
            },
            Err(reason) => Self {
                delivered: false,
                error: Some(reason),
            },
        }
    }
}

/// Sends through `notifier` and folds the result into an outcome, logging both paths
pub async fn deliver(notifier: &dyn Notifier, message: &OutgoingMessage) -> DeliveryOutcome {
    let outcome = DeliveryOutcome::from(notifier.send(message).await);
    if outcome.delivered {
        tracing::info!(
            recipients = message.recipients.len(),
            subject = %message.subject,
            "Communication delivered"
        );
    } else {
        tracing::warn!(
            subject = %message.subject,
            reason = outcome.error.as_deref().unwrap_or_default(),
            "Communication delivery failed"
        );
    }
    outcome
}

/// Default channel: writes the delivery to the log and always succeeds
pub struct LogNotifier {
    sender: String,
}

impl LogNotifier {
    pub fn new(sender: String) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), String> {
        tracing::info!(
            from = %self.sender,
            to = %message.recipients.join(", "),
            subject = %message.subject,
            attachment = message
                .attachment
                .as_ref()
                .map(|a| a.filename.as_str())
                .unwrap_or_default(),
            "Outgoing communication"
        );
        Ok(())
    }
}
