use anyhow::Result;
use chrono::Local;
use shared::{DateRange, Doctor, SplitResult, Visit};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::visit::RecordVisitCommand;
use crate::domain::fee_split::compute_visit_split;
use crate::domain::ids::generate_id;
use crate::domain::validation::ValidationError;
use crate::storage::traits::{DoctorStorage, VisitStorage};

/// Service for recording patient visits
#[derive(Clone)]
pub struct VisitService {
    visit_storage: Arc<dyn VisitStorage>,
    doctor_storage: Arc<dyn DoctorStorage>,
}

impl VisitService {
    pub fn new(visit_storage: Arc<dyn VisitStorage>, doctor_storage: Arc<dyn DoctorStorage>) -> Self {
        Self {
            visit_storage,
            doctor_storage,
        }
    }

    /// Record a visit for an existing doctor. Fees are stored as given.
    pub fn record_visit(&self, command: RecordVisitCommand) -> Result<Visit> {
        let patient_name = command.patient_name.trim().to_string();
        if patient_name.is_empty() {
            return Err(ValidationError::EmptyPatientName.into());
        }

        if self.doctor_storage.get_doctor(&command.doctor_id)?.is_none() {
            return Err(ValidationError::UnknownDoctor(command.doctor_id).into());
        }

        let visit = Visit {
            id: generate_id("visit"),
            patient_name,
            contact: command.contact.trim().to_string(),
            doctor_id: command.doctor_id,
            date: command.date.unwrap_or_else(|| Local::now().date_naive()),
            fees: command.fees,
        };
        self.visit_storage.store_visit(&visit)?;

        info!(
            "Recorded visit {} for {} on {}",
            visit.id, visit.patient_name, visit.date
        );
        Ok(visit)
    }

    pub fn get_visit(&self, visit_id: &str) -> Result<Option<Visit>> {
        self.visit_storage.get_visit(visit_id)
    }

    /// Visits in range ordered by date, then ID
    pub fn list_visits(&self, range: &DateRange) -> Result<Vec<Visit>> {
        let visits = self.visit_storage.list_visits(range)?;
        info!("Found {} visits", visits.len());
        Ok(visits)
    }

    pub fn delete_visit(&self, visit_id: &str) -> Result<bool> {
        let deleted = self.visit_storage.delete_visit(visit_id)?;
        if !deleted {
            warn!("Visit not found for deletion: {}", visit_id);
        }
        Ok(deleted)
    }

    /// Load a visit and its doctor and split the visit's fees
    pub fn split_for_visit(&self, visit_id: &str) -> Result<(Visit, Doctor, SplitResult)> {
        let visit = self
            .visit_storage
            .get_visit(visit_id)?
            .ok_or_else(|| ValidationError::NotFound {
                kind: "Visit",
                id: visit_id.to_string(),
            })?;
        let doctor = self
            .doctor_storage
            .get_doctor(&visit.doctor_id)?
            .ok_or_else(|| ValidationError::UnknownDoctor(visit.doctor_id.clone()))?;

        let split = compute_visit_split(&visit, &doctor);
        Ok((visit, doctor, split))
    }
}
