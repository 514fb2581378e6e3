//! System-notification reads and admin writes.

use crate::operations::SessionService;
use fireside_store::{WriteOp, WriteSet};
use shared_types::{CoreError, Identity, ItemKey, SystemNotification};
use tracing::info;

impl SessionService {
    /// Reads the singleton banner, if one is set.
    pub async fn get_system_notification(
        &self,
    ) -> Result<Option<SystemNotification>, CoreError> {
        let item = self.store.get(&ItemKey::system_notification()).await?;
        item.as_ref()
            .map(SystemNotification::from_item)
            .transpose()
            .map_err(CoreError::from)
    }

    /// Replaces the banner. Service principals only.
    pub async fn set_system_notification(
        &self,
        identity: &Identity,
        urgent: bool,
        message: impl Into<String>,
    ) -> Result<SystemNotification, CoreError> {
        if !identity.is_service() {
            return Err(CoreError::Unauthorized);
        }
        let notification = SystemNotification {
            urgent,
            message: message.into(),
            updated_at: self.clock.now(),
        };
        self.store
            .transact_write(WriteSet::new().with(WriteOp::put(
                ItemKey::system_notification(),
                notification.to_item(),
            )))
            .await?;
        info!(urgent, "system notification set");
        Ok(notification)
    }
}
