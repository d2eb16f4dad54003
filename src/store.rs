//! Prescription persistence boundary.
//!
//! One pure domain, two adapters: `MemoryStore` for tests and offline use,
//! `SqliteStore` for the on-disk replica. Both publish per-patient change
//! snapshots through a broadcast hub, standing in for the upstream
//! document store's snapshot listeners.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use rusqlite::Connection;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::db::repository as repo;
use crate::db::{sqlite, StorageError};
use crate::models::Prescription;

/// The adapter contract the workflow core requires from its environment.
/// Ids are caller-generated v4 UUIDs; `create` expects a fresh one.
pub trait PrescriptionStore: Send + Sync {
    fn create(&self, p: &Prescription) -> Result<Prescription, StorageError>;
    fn fetch(&self, id: &Uuid) -> Result<Prescription, StorageError>;
    fn update(&self, p: &Prescription) -> Result<(), StorageError>;
    fn delete(&self, id: &Uuid) -> Result<(), StorageError>;
    fn list_for_patient(&self, patient_id: &Uuid) -> Result<Vec<Prescription>, StorageError>;
    fn subscribe(&self, patient_id: &Uuid) -> Subscription;
}

/// A live feed of one patient's prescription list. Each successful mutation
/// publishes the refreshed list; cancelling is dropping the subscription.
///
/// Payloads are whole-list snapshots, so a lagged receiver simply sees the
/// latest state on its next receive.
pub struct Subscription {
    rx: broadcast::Receiver<Vec<Prescription>>,
}

impl Subscription {
    /// Wait for the next change snapshot. Returns `None` once the store has
    /// been dropped.
    pub async fn recv(&mut self) -> Option<Vec<Prescription>> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant; `None` when no snapshot is pending.
    pub fn try_recv(&mut self) -> Option<Vec<Prescription>> {
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[derive(Default)]
struct ChangeHub {
    channels: Mutex<HashMap<Uuid, broadcast::Sender<Vec<Prescription>>>>,
}

impl ChangeHub {
    fn subscribe(&self, patient_id: Uuid) -> Subscription {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        let tx = channels
            .entry(patient_id)
            .or_insert_with(|| broadcast::channel(16).0);
        Subscription { rx: tx.subscribe() }
    }

    fn publish(&self, patient_id: &Uuid, snapshot: Vec<Prescription>) {
        let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = channels.get(patient_id) {
            // Send only fails when nobody is listening.
            let _ = tx.send(snapshot);
        }
    }
}

// ═══════════════════════════════════════════
// In-memory adapter
// ═══════════════════════════════════════════

#[derive(Default)]
pub struct MemoryStore {
    prescriptions: RwLock<HashMap<Uuid, Prescription>>,
    hub: ChangeHub,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot_for(&self, patient_id: &Uuid) -> Vec<Prescription> {
        let prescriptions = self
            .prescriptions
            .read()
            .unwrap_or_else(|e| e.into_inner());
        let mut list: Vec<Prescription> = prescriptions
            .values()
            .filter(|p| p.for_user == *patient_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.prescribed_date.cmp(&a.prescribed_date));
        list
    }
}

impl PrescriptionStore for MemoryStore {
    fn create(&self, p: &Prescription) -> Result<Prescription, StorageError> {
        self.prescriptions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(p.id, p.clone());
        self.hub.publish(&p.for_user, self.snapshot_for(&p.for_user));
        Ok(p.clone())
    }

    fn fetch(&self, id: &Uuid) -> Result<Prescription, StorageError> {
        self.prescriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound {
                entity: "prescription",
                id: id.to_string(),
            })
    }

    fn update(&self, p: &Prescription) -> Result<(), StorageError> {
        {
            let mut prescriptions = self
                .prescriptions
                .write()
                .unwrap_or_else(|e| e.into_inner());
            let entry = prescriptions.get_mut(&p.id).ok_or(StorageError::NotFound {
                entity: "prescription",
                id: p.id.to_string(),
            })?;
            *entry = p.clone();
        }
        self.hub.publish(&p.for_user, self.snapshot_for(&p.for_user));
        Ok(())
    }

    fn delete(&self, id: &Uuid) -> Result<(), StorageError> {
        let removed = self
            .prescriptions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
        if let Some(p) = removed {
            self.hub.publish(&p.for_user, self.snapshot_for(&p.for_user));
        }
        Ok(())
    }

    fn list_for_patient(&self, patient_id: &Uuid) -> Result<Vec<Prescription>, StorageError> {
        Ok(self.snapshot_for(patient_id))
    }

    fn subscribe(&self, patient_id: &Uuid) -> Subscription {
        self.hub.subscribe(*patient_id)
    }
}

// ═══════════════════════════════════════════
// SQLite adapter
// ═══════════════════════════════════════════

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    hub: ChangeHub,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self::new(sqlite::open_database(path)?))
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(sqlite::open_memory_database()?))
    }

    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            hub: ChangeHub::default(),
        }
    }

    /// Shared connection handle, e.g. for a `FeedDispatcher` writing into
    /// the same database.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn publish_for(&self, patient_id: &Uuid) -> Result<(), StorageError> {
        let snapshot = {
            let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
            repo::list_prescriptions_for_user(&conn, patient_id)?
        };
        self.hub.publish(patient_id, snapshot);
        Ok(())
    }
}

impl PrescriptionStore for SqliteStore {
    fn create(&self, p: &Prescription) -> Result<Prescription, StorageError> {
        {
            let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
            repo::insert_prescription(&conn, p)?;
        }
        self.publish_for(&p.for_user)?;
        Ok(p.clone())
    }

    fn fetch(&self, id: &Uuid) -> Result<Prescription, StorageError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        repo::get_prescription(&conn, id)?.ok_or(StorageError::NotFound {
            entity: "prescription",
            id: id.to_string(),
        })
    }

    fn update(&self, p: &Prescription) -> Result<(), StorageError> {
        {
            let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
            repo::update_prescription(&conn, p)?;
        }
        self.publish_for(&p.for_user)
    }

    fn delete(&self, id: &Uuid) -> Result<(), StorageError> {
        let owner = {
            let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
            let owner = repo::get_prescription(&conn, id)?.map(|p| p.for_user);
            repo::delete_prescription(&conn, id)?;
            owner
        };
        if let Some(patient_id) = owner {
            self.publish_for(&patient_id)?;
        }
        Ok(())
    }

    fn list_for_patient(&self, patient_id: &Uuid) -> Result<Vec<Prescription>, StorageError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        repo::list_prescriptions_for_user(&conn, patient_id)
    }

    fn subscribe(&self, patient_id: &Uuid) -> Subscription {
        self.hub.subscribe(*patient_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::PrescriptionStatus;
    use crate::seed;
    use crate::workflow;

    fn exercise_crud(store: &dyn PrescriptionStore) {
        let patient = Uuid::new_v4();
        let p = seed::sample_prescription(patient, "John Doe");

        let created = store.create(&p).unwrap();
        assert_eq!(created.id, p.id);

        let fetched = store.fetch(&p.id).unwrap();
        assert_eq!(fetched.rx_number, p.rx_number);

        let advanced = workflow::advance_status(&fetched, PrescriptionStatus::Entered, None);
        store.update(&advanced).unwrap();
        assert_eq!(store.fetch(&p.id).unwrap().status, PrescriptionStatus::Entered);

        assert_eq!(store.list_for_patient(&patient).unwrap().len(), 1);
        assert!(store.list_for_patient(&Uuid::new_v4()).unwrap().is_empty());

        store.delete(&p.id).unwrap();
        assert!(matches!(
            store.fetch(&p.id),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn memory_store_crud() {
        exercise_crud(&MemoryStore::new());
    }

    #[test]
    fn sqlite_store_crud() {
        exercise_crud(&SqliteStore::in_memory().unwrap());
    }

    #[test]
    fn fetch_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.fetch(&Uuid::new_v4()),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = SqliteStore::in_memory().unwrap();
        let p = seed::sample_prescription(Uuid::new_v4(), "John Doe");
        assert!(matches!(
            store.update(&p),
            Err(StorageError::NotFound { .. })
        ));
    }

    fn exercise_subscription(store: &dyn PrescriptionStore) {
        let patient = Uuid::new_v4();
        let mut sub = store.subscribe(&patient);
        let mut other = store.subscribe(&Uuid::new_v4());

        let p = seed::sample_prescription(patient, "John Doe");
        store.create(&p).unwrap();

        let snapshot = sub.try_recv().expect("create publishes a snapshot");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, p.id);
        assert!(other.try_recv().is_none());

        let advanced =
            workflow::advance_status(&p, PrescriptionStatus::ReadyForPickup, None);
        store.update(&advanced).unwrap();
        let snapshot = sub.try_recv().expect("update publishes a snapshot");
        assert_eq!(snapshot[0].status, PrescriptionStatus::ReadyForPickup);

        store.delete(&p.id).unwrap();
        let snapshot = sub.try_recv().expect("delete publishes a snapshot");
        assert!(snapshot.is_empty());
    }

    #[test]
    fn memory_store_subscriptions() {
        exercise_subscription(&MemoryStore::new());
    }

    #[test]
    fn sqlite_store_subscriptions() {
        exercise_subscription(&SqliteStore::in_memory().unwrap());
    }

    #[tokio::test]
    async fn async_recv_delivers_snapshot() {
        let store = MemoryStore::new();
        let patient = Uuid::new_v4();
        let mut sub = store.subscribe(&patient);

        store
            .create(&seed::sample_prescription(patient, "John Doe"))
            .unwrap();

        let snapshot = sub.recv().await.expect("snapshot delivered");
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn lagged_subscriber_sees_latest_state() {
        let store = MemoryStore::new();
        let patient = Uuid::new_v4();
        let mut sub = store.subscribe(&patient);

        // Overflow the channel buffer.
        for _ in 0..40 {
            store
                .create(&seed::sample_prescription(patient, "John Doe"))
                .unwrap();
        }

        let mut last = None;
        while let Some(snapshot) = sub.try_recv() {
            last = Some(snapshot);
        }
        assert_eq!(last.expect("some snapshot survives").len(), 40);
    }
}
