use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{DeliveryBackend, TokenPolicy};
use crate::domain::clock::Clock;
use crate::infra::db::{DbTokenRepository, DbUserRepository};
use crate::infra::delivery::{DeliverySender, LogTokenSender, OutboxTokenSender};
use crate::usecase::session::SessionIssuer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub policy: Arc<TokenPolicy>,
    pub sessions: SessionIssuer,
    pub delivery: DeliveryBackend,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_repo(&self) -> DbTokenRepository {
        DbTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_sender(&self) -> DeliverySender {
        match self.delivery {
            DeliveryBackend::Outbox => DeliverySender::Outbox(OutboxTokenSender {
                db: self.db.clone(),
            }),
            DeliveryBackend::Log => DeliverySender::Log(LogTokenSender),
        }
    }
}
