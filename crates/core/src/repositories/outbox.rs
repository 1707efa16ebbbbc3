//! File-based notification delivery.
//!
//! Each message is written as a standalone YAML file under `<data_dir>/outbox/`. File names
//! are `<sent_at>-<uuid>.yaml`, so a directory listing sorts in delivery order.

use crate::appointment::Message;
use crate::config::CoreConfig;
use crate::error::{ClinicError, ClinicResult};
use crate::gateways::Notifier;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct OutboxNotifier {
    cfg: Arc<CoreConfig>,
}

impl OutboxNotifier {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn message_path(&self, message: &Message) -> PathBuf {
        let stamp = message.sent_at.format("%Y%m%dT%H%M%S%.3fZ");
        self.cfg
            .outbox_dir()
            .join(format!("{}-{}.yaml", stamp, Uuid::new_v4().simple()))
    }
}

impl Notifier for OutboxNotifier {
    fn send(&self, message: &Message) -> ClinicResult<()> {
        let outbox = self.cfg.outbox_dir();
        fs::create_dir_all(&outbox)
            .map_err(|e| ClinicError::Notification(format!("outbox unavailable: {e}")))?;

        let yaml = serde_yaml::to_string(message)
            .map_err(|e| ClinicError::Notification(format!("message not serialisable: {e}")))?;

        let path = self.message_path(message);
        fs::write(&path, yaml)
            .map_err(|e| ClinicError::Notification(format!("{}: {e}", path.display())))?;

        tracing::debug!(to = %message.to, path = %path.display(), "message written to outbox");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Mid;
    use chrono::Utc;
    use tempfile::TempDir;

    fn message() -> Message {
        Message {
            from: Mid::new(9000000000),
            to: Mid::new(2),
            subject: "Your appointment request".into(),
            body: "Your appointment request with Kelly Doctor on 2026-11-03 09:30:00 has been accepted."
                .into(),
            sent_at: Utc::now(),
        }
    }

    #[test]
    fn send_writes_one_file_per_message() {
        let temp = TempDir::new().unwrap();
        let cfg = Arc::new(CoreConfig::new(temp.path().to_path_buf()).unwrap());
        let notifier = OutboxNotifier::new(cfg.clone());

        notifier.send(&message()).unwrap();
        notifier.send(&message()).unwrap();

        let files: Vec<_> = fs::read_dir(cfg.outbox_dir())
            .unwrap()
            .flatten()
            .map(|e| e.path())
            .collect();
        assert_eq!(files.len(), 2);

        let stored: Message =
            serde_yaml::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
        assert_eq!(stored.subject, "Your appointment request");
    }

    #[test]
    fn send_reports_unwritable_outbox() {
        let temp = TempDir::new().unwrap();
        let cfg = Arc::new(CoreConfig::new(temp.path().to_path_buf()).unwrap());
        // A regular file where the outbox directory should be.
        fs::write(cfg.outbox_dir(), "blocked").unwrap();

        let err = OutboxNotifier::new(cfg).send(&message()).unwrap_err();
        assert!(matches!(err, ClinicError::Notification(_)));
    }
}
