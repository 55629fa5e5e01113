//! # Doctor Repository
//!
//! Stores the doctor roster in `doctors.yaml` at the root of the data
//! directory:
//!
//! ```yaml
//! data_format_version: "1.0"
//! doctors:
//!   - id: doctor::1704099600000::a1b2c3d4
//!     name: Dr. Imran Qureshi
//!     percentages:
//!       OPD: 70.0
//!       LAB: 20.0
//!     created_at: 2024-01-01T09:00:00Z
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::Doctor;
use std::fs;
use tracing::{debug, info};

use super::connection::CsvConnection;
use crate::storage::traits::DoctorStorage;

const DATA_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize)]
struct DoctorRoster {
    data_format_version: String,
    #[serde(default)]
    doctors: Vec<Doctor>,
}

/// YAML-backed doctor repository
#[derive(Clone)]
pub struct DoctorRepository {
    connection: CsvConnection,
}

impl DoctorRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_doctors(&self) -> Result<Vec<Doctor>> {
        let path = self.connection.doctors_file_path();
        if !path.exists() {
            debug!("No doctor roster at {}, returning empty list", path.display());
            return Ok(Vec::new());
        }

        let yaml_content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if yaml_content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let roster: DoctorRoster = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(roster.doctors)
    }

    fn write_doctors(&self, doctors: &[Doctor]) -> Result<()> {
        let roster = DoctorRoster {
            data_format_version: DATA_FORMAT_VERSION.to_string(),
            doctors: doctors.to_vec(),
        };
        let yaml_content = serde_yaml::to_string(&roster)?;
        self.connection
            .write_atomically(&self.connection.doctors_file_path(), yaml_content.as_bytes())
    }
}

impl DoctorStorage for DoctorRepository {
    fn store_doctor(&self, doctor: &Doctor) -> Result<()> {
        let _guard = self.connection.lock()?;
        let mut doctors = self.read_doctors()?;

        if let Some(existing) = doctors.iter_mut().find(|d| d.id == doctor.id) {
            *existing = doctor.clone();
        } else {
            doctors.push(doctor.clone());
        }

        self.write_doctors(&doctors)?;
        info!("Stored doctor {} ({})", doctor.name, doctor.id);
        Ok(())
    }

    fn get_doctor(&self, doctor_id: &str) -> Result<Option<Doctor>> {
        let doctors = self.read_doctors()?;
        Ok(doctors.into_iter().find(|d| d.id == doctor_id))
    }

    fn list_doctors(&self) -> Result<Vec<Doctor>> {
        let mut doctors = self.read_doctors()?;
        doctors.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(doctors)
    }

    fn update_doctor(&self, doctor: &Doctor) -> Result<bool> {
        let _guard = self.connection.lock()?;
        let mut doctors = self.read_doctors()?;

        match doctors.iter_mut().find(|d| d.id == doctor.id) {
            Some(existing) => {
                *existing = doctor.clone();
                self.write_doctors(&doctors)?;
                info!("Updated doctor {}", doctor.id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_doctor(&self, doctor_id: &str) -> Result<bool> {
        let _guard = self.connection.lock()?;
        let mut doctors = self.read_doctors()?;
        let before = doctors.len();
        doctors.retain(|d| d.id != doctor_id);

        if doctors.len() == before {
            return Ok(false);
        }

        self.write_doctors(&doctors)?;
        info!("Deleted doctor {}", doctor_id);
        Ok(true)
    }
}
