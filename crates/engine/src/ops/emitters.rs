//! Notification and audit sinks.
//!
//! Both are write-only side channels. Callers invoke them after the ledger
//! work has committed; a failure here must never undo a decision.

use chrono::Utc;
use sea_orm::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{AuditCmd, EngineError, NotificationCmd, ResultEngine, audit, notifications};

use super::{Engine, normalize_required_name};

impl Engine {
    /// Writes an in-app notification for a user.
    pub async fn emit_notification(&self, cmd: NotificationCmd) -> ResultEngine<Uuid> {
        let title = normalize_required_name(&cmd.title, "title")?;
        let message = normalize_required_name(&cmd.message, "message")?;

        let id = Uuid::new_v4();
        notifications::ActiveModel {
            id: ActiveValue::Set(id.to_string()),
            user_id: ActiveValue::Set(cmd.user_id),
            kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
            title: ActiveValue::Set(title),
            message: ActiveValue::Set(message),
            read: ActiveValue::Set(false),
            action_url: ActiveValue::Set(cmd.action_url),
            action_label: ActiveValue::Set(cmd.action_label),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;
        Ok(id)
    }

    /// Appends an audit log entry.
    pub async fn record_audit(&self, cmd: AuditCmd) -> ResultEngine<Uuid> {
        let action = normalize_required_name(&cmd.action, "action")?;

        let changes = cmd
            .changes
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|_| EngineError::Validation("invalid audit changes payload".to_string()))?;

        let id = Uuid::new_v4();
        audit::ActiveModel {
            id: ActiveValue::Set(id.to_string()),
            user_id: ActiveValue::Set(cmd.user_id),
            action: ActiveValue::Set(action),
            entity_type: ActiveValue::Set(cmd.entity_type),
            entity_id: ActiveValue::Set(cmd.entity_id),
            changes: ActiveValue::Set(changes),
            success: ActiveValue::Set(cmd.success),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;
        Ok(id)
    }
}
