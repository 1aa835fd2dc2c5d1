//! Optimistic connection cache.
//!
//! Mutations follow an optimistic-update-then-reconcile discipline: the
//! local list is mutated immediately when a mutation starts, restored from
//! the prior snapshot on failure, and invalidated (forcing a refetch) on
//! success. Rollback restores the snapshot verbatim — partial state is
//! never kept.

use tracing::debug;

use crate::core::connection::{Connection, ConnectionStatus};

/// The connection list as it was before an optimistic mutation began.
#[derive(Debug, Clone)]
pub struct ConnectionSnapshot(Vec<Connection>);

#[derive(Debug, Default)]
pub struct ConnectionStore {
    connections: Vec<Connection>,
    stale: bool,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self {
            connections: Vec::new(),
            stale: true,
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn find(&self, app_key: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.app_key == app_key)
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Mark the cache stale so the next reader refetches from the server.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Replace the cached list with the server's.
    pub fn replace(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
        self.stale = false;
    }

    /// Optimistically insert a pending record for `app_key`. Returns the
    /// snapshot to roll back to if the create request fails.
    pub fn begin_create(&mut self, app_key: &str, app_name: &str) -> ConnectionSnapshot {
        let snapshot = ConnectionSnapshot(self.connections.clone());
        // One record per app: a retried connect replaces any stale record.
        self.connections.retain(|c| c.app_key != app_key);
        self.connections.push(Connection::pending(app_key, app_name));
        debug!(app_key, "optimistic connect inserted");
        snapshot
    }

    /// Reconcile the pending placeholder with the server's record and mark
    /// the cache for refetch.
    pub fn commit_create(&mut self, record: Connection) {
        self.connections.retain(|c| c.app_key != record.app_key);
        self.connections.push(record);
        self.invalidate();
    }

    /// Optimistically remove the record for `app_key`. Returns `None` when
    /// there is nothing to delete.
    pub fn begin_delete(&mut self, app_key: &str) -> Option<ConnectionSnapshot> {
        if self.find(app_key).is_none() {
            return None;
        }
        let snapshot = ConnectionSnapshot(self.connections.clone());
        self.connections.retain(|c| c.app_key != app_key);
        debug!(app_key, "optimistic disconnect removed");
        Some(snapshot)
    }

    /// Keep the optimistic removal and mark the cache for refetch.
    pub fn commit_delete(&mut self) {
        self.invalidate();
    }

    /// Restore the pre-mutation list verbatim.
    pub fn rollback(&mut self, snapshot: ConnectionSnapshot) {
        self.connections = snapshot.0;
    }

    /// Connected apps, for quick membership checks in list surfaces.
    pub fn connected_app_keys(&self) -> Vec<&str> {
        self.connections
            .iter()
            .filter(|c| c.status == ConnectionStatus::Connected)
            .map(|c| c.app_key.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn server_record(app_key: &str) -> Connection {
        let now = Utc::now();
        Connection {
            id: format!("conn-{app_key}"),
            qualified_name: format!("composio/{app_key}"),
            app_key: app_key.to_string(),
            app_name: app_key.to_string(),
            status: ConnectionStatus::Connected,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_commit_reconciles_and_invalidates() {
        let mut store = ConnectionStore::new();
        store.replace(vec![server_record("slack")]);

        let _snapshot = store.begin_create("gmail", "Gmail");
        assert_eq!(store.find("gmail").map(|c| c.status), Some(ConnectionStatus::Pending));

        store.commit_create(server_record("gmail"));
        assert_eq!(store.find("gmail").map(|c| c.status), Some(ConnectionStatus::Connected));
        assert!(store.is_stale());
        assert_eq!(store.connections().len(), 2);
    }

    #[test]
    fn create_rollback_restores_snapshot_verbatim() {
        let mut store = ConnectionStore::new();
        store.replace(vec![server_record("slack")]);
        let before = store.connections().to_vec();

        let snapshot = store.begin_create("gmail", "Gmail");
        assert_eq!(store.connections().len(), 2);

        store.rollback(snapshot);
        assert_eq!(store.connections(), before.as_slice());
    }

    #[test]
    fn delete_rollback_restores_removed_record() {
        let mut store = ConnectionStore::new();
        store.replace(vec![server_record("slack"), server_record("gmail")]);

        let snapshot = store.begin_delete("gmail").expect("record exists");
        assert!(store.find("gmail").is_none());

        store.rollback(snapshot);
        assert!(store.find("gmail").is_some());
        assert_eq!(store.connections().len(), 2);
    }

    #[test]
    fn delete_of_unknown_app_is_a_no_op() {
        let mut store = ConnectionStore::new();
        store.replace(vec![server_record("slack")]);
        assert!(store.begin_delete("gmail").is_none());
        assert_eq!(store.connections().len(), 1);
    }

    #[test]
    fn retried_connect_replaces_stale_record() {
        let mut store = ConnectionStore::new();
        let mut expired = server_record("gmail");
        expired.status = ConnectionStatus::Expired;
        store.replace(vec![expired]);

        store.begin_create("gmail", "Gmail");
        assert_eq!(store.connections().len(), 1);
        assert_eq!(store.find("gmail").map(|c| c.status), Some(ConnectionStatus::Pending));
    }
}
