//! In-memory session records that are dropped once they expire.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower_sessions::SessionStore;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tracing::debug;

/// Session records keyed by id. Uploaded graphs live here, so expired records
/// are removed on load and by [`ExpiringStore::spawn_purge`].
#[derive(Clone, Debug, Default)]
pub(crate) struct ExpiringStore(Arc<Mutex<HashMap<Id, Record>>>);

impl ExpiringStore {
    /// Drops every record past its expiry date, returning how many went.
    pub(crate) async fn purge_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut records = self.0.lock().await;
        let before = records.len();
        records.retain(|_, record| record.expiry_date > now);
        before - records.len()
    }

    /// Purges every `period` for as long as the runtime lives.
    pub(crate) fn spawn_purge(&self, period: std::time::Duration) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    debug!("Purged {} expired sessions", purged);
                }
            }
        });
    }
}

#[async_trait]
impl SessionStore for ExpiringStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.0.lock().await;
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.0.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc();
        let mut records = self.0.lock().await;
        match records.get(session_id) {
            Some(record) if record.expiry_date > now => Ok(Some(record.clone())),
            Some(_) => {
                records.remove(session_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.0.lock().await.remove(session_id);
        Ok(())
    }
}
