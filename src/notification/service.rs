//! Notifier
//!
//! Wraps the notification store. Writes are best-effort: failures are
//! logged and swallowed, reads and read-flag updates propagate errors.

use uuid::Uuid;

use crate::domain::{DomainError, NewNotification, Notification};
use crate::error::AppError;
use crate::store::SharedStore;

/// Notification sink used by the handlers
#[derive(Clone)]
pub struct Notifier {
    store: SharedStore,
}

impl Notifier {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Append a notification; `None` when the sink refused it
    pub async fn notify(&self, notification: NewNotification) -> Option<Notification> {
        let user_id = notification.user_id;
        let kind = notification.kind;

        match self.store.append_notification(notification).await {
            Ok(stored) => {
                tracing::debug!(%user_id, kind = %kind, notification_id = %stored.id, "Notification sent");
                Some(stored)
            }
            Err(e) => {
                tracing::warn!(%user_id, kind = %kind, error = %e, "Notification dropped");
                None
            }
        }
    }

    /// The user's notifications, newest first
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        Ok(self.store.list_notifications(user_id).await?)
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<(), AppError> {
        if !self.store.mark_notification_read(user_id, notification_id).await? {
            return Err(DomainError::NotificationNotFound(notification_id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::NotificationKind;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_notify_swallows_sink_failure() {
        let store = InMemoryStore::new();
        store.set_notifications_down(true);
        let notifier = Notifier::new(Arc::new(store.clone()));
        let user_id = Uuid::new_v4();

        let sent = notifier
            .notify(NewNotification::new(user_id, NotificationKind::Grade, "t", "m"))
            .await;
        assert!(sent.is_none());

        store.set_notifications_down(false);
        assert!(notifier.list(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_of_foreign_notification() {
        let notifier = Notifier::new(Arc::new(InMemoryStore::new()));
        let owner = Uuid::new_v4();

        let sent = notifier
            .notify(NewNotification::new(owner, NotificationKind::Grade, "t", "m"))
            .await
            .unwrap();

        let result = notifier.mark_read(Uuid::new_v4(), sent.id).await;
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::NotificationNotFound(_)))
        ));

        notifier.mark_read(owner, sent.id).await.unwrap();
        assert!(notifier.list(owner).await.unwrap()[0].read);
    }
}
