use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::errors::AuthzError;
use crate::types::db::audit_event;
use crate::types::internal::audit::AuditEvent;

/// Repository for audit event storage operations
///
/// Unlike the other stores this one owns its connection: audit rows go to a
/// dedicated database and never participate in authorization transactions.
pub struct AuditStore {
    db: DatabaseConnection,
}

impl AuditStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Write an audit event to the database
    ///
    /// Serializes the data map to JSON and inserts the event into the
    /// audit_events table.
    pub async fn write_event(&self, event: AuditEvent) -> Result<(), AuthzError> {
        let data_json = serde_json::to_string(&event.data).unwrap_or_else(|_| "{}".to_string());

        let row = audit_event::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            timestamp: Set(Utc::now().to_rfc3339()),
            event_type: Set(event.event_type.to_string()),
            actor_id: Set(event.actor_id),
            request_id: Set(event.request_id),
            data: Set(data_json),
        };

        row.insert(&self.db)
            .await
            .map_err(|e| AuthzError::store("write_audit_event", e))?;

        Ok(())
    }
}
