//! Prescription service: the persisted variant of the workflow.
//!
//! Every operation is fetch → pure domain transform → write back; the
//! rules themselves live in `workflow` and `messaging` and are never
//! restated here. Status-mutating operations serialize per prescription id
//! so two callers racing on the same record cannot interleave their
//! fetch-mutate-write cycles and lose an update.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use uuid::Uuid;

use crate::db::StorageError;
use crate::messaging;
use crate::models::enums::PrescriptionStatus;
use crate::models::Prescription;
use crate::notifications::{self, NotificationDispatcher};
use crate::store::{PrescriptionStore, Subscription};
use crate::workflow::{self, PolicyError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct PrescriptionService {
    store: Arc<dyn PrescriptionStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl PrescriptionService {
    pub fn new(
        store: Arc<dyn PrescriptionStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, id: &Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(*id).or_default())
    }

    pub fn create(&self, prescription: &Prescription) -> Result<Prescription, ServiceError> {
        let created = self.store.create(prescription)?;
        tracing::info!(id = %created.id, rx = %created.rx_number, "prescription created");
        Ok(created)
    }

    pub fn get(&self, id: &Uuid) -> Result<Prescription, ServiceError> {
        Ok(self.store.fetch(id)?)
    }

    pub fn list_for_patient(&self, patient_id: &Uuid) -> Result<Vec<Prescription>, ServiceError> {
        Ok(self.store.list_for_patient(patient_id)?)
    }

    /// Move a prescription to a new fulfillment stage. Notify-worthy stages
    /// dispatch a derived notification after the write lands.
    pub fn update_status(
        &self,
        id: &Uuid,
        new_status: PrescriptionStatus,
        message: Option<&str>,
    ) -> Result<Prescription, ServiceError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.store.fetch(id)?;
        let updated = workflow::advance_status(&current, new_status, message);
        self.store.update(&updated)?;
        tracing::info!(id = %id, status = new_status.as_str(), "prescription status updated");

        if new_status.triggers_notification() {
            self.dispatcher
                .notify(notifications::notification_for_status(&updated));
        }
        Ok(updated)
    }

    pub fn add_pharmacist_message(
        &self,
        id: &Uuid,
        content: &str,
    ) -> Result<Prescription, ServiceError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.store.fetch(id)?;
        let updated = messaging::append_pharmacist_message(&current, content);
        self.store.update(&updated)?;
        tracing::info!(id = %id, "pharmacist message added");

        // The derived notification is PharmacistMessage by the priority rule.
        self.dispatcher
            .notify(notifications::notification_for_status(&updated));
        Ok(updated)
    }

    pub fn add_user_reply(&self, id: &Uuid, content: &str) -> Result<Prescription, ServiceError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.store.fetch(id)?;
        let updated = messaging::append_user_reply(&current, content)?;
        self.store.update(&updated)?;
        tracing::info!(id = %id, "patient reply added");
        Ok(updated)
    }

    /// Derive and persist a refill from a completed prescription. The
    /// original record is left as-is.
    pub fn request_refill(&self, id: &Uuid) -> Result<Prescription, ServiceError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.store.fetch(id)?;
        let refill = workflow::request_refill(&current)?;
        let created = self.store.create(&refill)?;
        tracing::info!(
            parent = %id,
            refill = %created.id,
            remaining = created.refills_remaining,
            "refill requested"
        );

        self.dispatcher
            .notify(notifications::notification_for_status(&created));
        Ok(created)
    }

    pub fn confirm_pickup(&self, id: &Uuid) -> Result<Prescription, ServiceError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.store.fetch(id)?;
        let updated = workflow::confirm_pickup(&current)?;
        self.store.update(&updated)?;
        tracing::info!(id = %id, "pickup confirmed");
        Ok(updated)
    }

    pub fn record_dose(
        &self,
        id: &Uuid,
        adherence_percentage: f64,
    ) -> Result<Prescription, ServiceError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.store.fetch(id)?;
        let updated = workflow::record_dose(&current, adherence_percentage);
        self.store.update(&updated)?;
        tracing::info!(id = %id, adherence = adherence_percentage, "dose recorded");
        Ok(updated)
    }

    /// Administrative removal. Not part of the patient-facing lifecycle.
    pub fn delete(&self, id: &Uuid) -> Result<(), ServiceError> {
        self.store.delete(id)?;
        tracing::info!(id = %id, "prescription deleted");
        Ok(())
    }

    pub fn subscribe(&self, patient_id: &Uuid) -> Subscription {
        self.store.subscribe(patient_id)
    }
}
