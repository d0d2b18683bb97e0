use anyhow::Context as _;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use serde_json::json;
use uuid::Uuid;

use passwordless_auth_schema::outbox_events;
use passwordless_domain::channel::Channel;

use crate::domain::repository::TokenSender;
use crate::domain::types::OutboundMessage;
use crate::error::PasswordlessError;

pub fn outbox_kind(channel: Channel) -> &'static str {
    match channel {
        Channel::Email => "passwordless_email",
        Channel::Mobile => "passwordless_sms",
    }
}

/// Queues messages in `outbox_events` for an external email/SMS relay.
#[derive(Clone)]
pub struct OutboxTokenSender {
    pub db: DatabaseConnection,
}

impl TokenSender for OutboxTokenSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), PasswordlessError> {
        let kind = outbox_kind(message.channel);
        outbox_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(kind.to_owned()),
            payload: Set(json!({
                "to": message.to,
                "subject": message.subject,
                "body": message.body,
            })),
            idempotency_key: Set(format!("{kind}:{}", message.token_id)),
            created_at: Set(message.created_at),
            processed_at: Set(None),
        }
        .insert(&self.db)
        .await
        .context("enqueue outbox event")?;
        Ok(())
    }
}

/// Development backend: prints the rendered message, code included.
#[derive(Clone, Copy, Default)]
pub struct LogTokenSender;

impl TokenSender for LogTokenSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), PasswordlessError> {
        tracing::info!(
            channel = %message.channel,
            to = %message.to,
            subject = message.subject.as_deref().unwrap_or_default(),
            body = %message.body,
            "passwordless message"
        );
        Ok(())
    }
}

/// Transport selected by `DELIVERY_BACKEND`.
#[derive(Clone)]
pub enum DeliverySender {
    Outbox(OutboxTokenSender),
    Log(LogTokenSender),
}

impl TokenSender for DeliverySender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), PasswordlessError> {
        match self {
            Self::Outbox(sender) => sender.send(message).await,
            Self::Log(sender) => sender.send(message).await,
        }
    }
}
