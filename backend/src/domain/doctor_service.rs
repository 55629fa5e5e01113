use anyhow::Result;
use chrono::Utc;
use shared::{Doctor, PercentageMap};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::doctor::{CreateDoctorCommand, UpdateDoctorPercentagesCommand};
use crate::domain::ids::generate_id;
use crate::domain::validation::{validate_name, ValidationError};
use crate::storage::traits::DoctorStorage;

/// Service for managing the doctor roster
#[derive(Clone)]
pub struct DoctorService {
    doctor_storage: Arc<dyn DoctorStorage>,
}

impl DoctorService {
    pub fn new(doctor_storage: Arc<dyn DoctorStorage>) -> Self {
        Self { doctor_storage }
    }

    /// Register a new doctor
    pub fn create_doctor(&self, command: CreateDoctorCommand) -> Result<Doctor> {
        let name = validate_name(&command.name)?;
        warn_on_unusual_percentages(&name, &command.percentages);

        let doctor = Doctor {
            id: generate_id("doctor"),
            name,
            percentages: command.percentages,
            created_at: Utc::now(),
        };
        self.doctor_storage.store_doctor(&doctor)?;

        info!("Created doctor: {} with ID: {}", doctor.name, doctor.id);
        Ok(doctor)
    }

    pub fn get_doctor(&self, doctor_id: &str) -> Result<Option<Doctor>> {
        self.doctor_storage.get_doctor(doctor_id)
    }

    /// All doctors ordered by name
    pub fn list_doctors(&self) -> Result<Vec<Doctor>> {
        let doctors = self.doctor_storage.list_doctors()?;
        info!("Found {} doctors", doctors.len());
        Ok(doctors)
    }

    /// Replace a doctor's percentages. Values are stored as given.
    pub fn update_percentages(&self, command: UpdateDoctorPercentagesCommand) -> Result<Doctor> {
        let mut doctor = self
            .doctor_storage
            .get_doctor(&command.doctor_id)?
            .ok_or_else(|| ValidationError::NotFound {
                kind: "Doctor",
                id: command.doctor_id.clone(),
            })?;

        warn_on_unusual_percentages(&doctor.name, &command.percentages);
        doctor.percentages = command.percentages;
        if !self.doctor_storage.update_doctor(&doctor)? {
            // Removed after the lookup above
            return Err(ValidationError::NotFound {
                kind: "Doctor",
                id: doctor.id,
            }
            .into());
        }

        info!("Updated percentages for doctor {}", doctor.id);
        Ok(doctor)
    }

    /// Returns true if the doctor existed
    pub fn delete_doctor(&self, doctor_id: &str) -> Result<bool> {
        let deleted = self.doctor_storage.delete_doctor(doctor_id)?;
        if !deleted {
            warn!("Doctor not found for deletion: {}", doctor_id);
        }
        Ok(deleted)
    }
}

/// Out-of-range shares are allowed but worth a log line
fn warn_on_unusual_percentages(doctor_name: &str, percentages: &PercentageMap) {
    for (category, raw) in percentages.iter() {
        let value = raw.to_finite();
        if !(0.0..=100.0).contains(&value) {
            warn!(
                "Doctor {} has {} share of {}%, outside 0-100",
                doctor_name, category, value
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::csv::DoctorRepository;
    use shared::FeeCategory;

    fn create_test_service(env: &TestEnvironment) -> DoctorService {
        DoctorService::new(Arc::new(DoctorRepository::new(env.connection.clone())))
    }

    #[test]
    fn test_create_doctor_trims_name_and_keeps_percentages() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);

        let doctor = service
            .create_doctor(CreateDoctorCommand {
                name: "  Dr. Saima Aslam ".to_string(),
                percentages: PercentageMap::new().with(FeeCategory::Opd, 70),
            })
            .unwrap();

        assert_eq!(doctor.name, "Dr. Saima Aslam");
        assert!(doctor.id.starts_with("doctor::"));
        assert_eq!(service.get_doctor(&doctor.id).unwrap(), Some(doctor));
    }

    #[test]
    fn test_create_doctor_rejects_empty_name() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);

        let err = service
            .create_doctor(CreateDoctorCommand {
                name: "   ".to_string(),
                percentages: PercentageMap::new(),
            })
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::EmptyName)
        );
        assert!(service.list_doctors().unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_percentages_are_stored_unchanged() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);

        let doctor = service
            .create_doctor(CreateDoctorCommand {
                name: "Dr. Bonus".to_string(),
                percentages: PercentageMap::new()
                    .with(FeeCategory::Ot, 120)
                    .with(FeeCategory::Lab, -5),
            })
            .unwrap();

        let loaded = service.get_doctor(&doctor.id).unwrap().unwrap();
        assert_eq!(loaded.percentages.value(FeeCategory::Ot), 120.0);
        assert_eq!(loaded.percentages.value(FeeCategory::Lab), -5.0);
    }

    #[test]
    fn test_update_percentages() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);
        let doctor = service
            .create_doctor(CreateDoctorCommand {
                name: "Dr. Imran".to_string(),
                percentages: PercentageMap::new().with(FeeCategory::Opd, 70),
            })
            .unwrap();

        let updated = service
            .update_percentages(UpdateDoctorPercentagesCommand {
                doctor_id: doctor.id.clone(),
                percentages: PercentageMap::new().with(FeeCategory::Ecg, 30),
            })
            .unwrap();

        assert_eq!(updated.percentages.value(FeeCategory::Opd), 0.0);
        let loaded = service.get_doctor(&doctor.id).unwrap().unwrap();
        assert_eq!(loaded.percentages.value(FeeCategory::Ecg), 30.0);
    }

    #[test]
    fn test_update_percentages_unknown_doctor() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);

        let err = service
            .update_percentages(UpdateDoctorPercentagesCommand {
                doctor_id: "doctor::missing".to_string(),
                percentages: PercentageMap::new(),
            })
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::NotFound { kind: "Doctor", .. })
        ));
    }

    /// Storage where the doctor disappears between lookup and update
    struct VanishingDoctorStorage {
        doctor: Doctor,
    }

    impl DoctorStorage for VanishingDoctorStorage {
        fn store_doctor(&self, _doctor: &Doctor) -> Result<()> {
            Ok(())
        }

        fn get_doctor(&self, _doctor_id: &str) -> Result<Option<Doctor>> {
            Ok(Some(self.doctor.clone()))
        }

        fn list_doctors(&self) -> Result<Vec<Doctor>> {
            Ok(vec![])
        }

        fn update_doctor(&self, _doctor: &Doctor) -> Result<bool> {
            Ok(false)
        }

        fn delete_doctor(&self, _doctor_id: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_update_percentages_of_doctor_deleted_meanwhile() {
        let service = DoctorService::new(Arc::new(VanishingDoctorStorage {
            doctor: Doctor {
                id: "doctor::1::aaaa".to_string(),
                name: "Dr. Imran".to_string(),
                percentages: PercentageMap::new(),
                created_at: Utc::now(),
            },
        }));

        let err = service
            .update_percentages(UpdateDoctorPercentagesCommand {
                doctor_id: "doctor::1::aaaa".to_string(),
                percentages: PercentageMap::new().with(FeeCategory::Opd, 50),
            })
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NotFound {
                kind: "Doctor",
                id: "doctor::1::aaaa".to_string(),
            })
        );
    }

    #[test]
    fn test_delete_doctor() {
        let env = TestEnvironment::new().unwrap();
        let service = create_test_service(&env);
        let doctor = service
            .create_doctor(CreateDoctorCommand {
                name: "Dr. Imran".to_string(),
                percentages: PercentageMap::new(),
            })
            .unwrap();

        assert!(service.delete_doctor(&doctor.id).unwrap());
        assert!(!service.delete_doctor(&doctor.id).unwrap());
    }
}
