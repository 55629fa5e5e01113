/// Test utilities for the CSV store
///
/// `TestEnvironment` owns a temporary data directory that is removed when it
/// goes out of scope, even if the test panics.
use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use shared::{CategoryMap, Doctor, Expense, FeeCategory, LooseNumber, SalaryPayment, Visit};
use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::CsvConnection;
use super::doctor_repository::DoctorRepository;
use super::expense_repository::ExpenseRepository;
use super::salary_repository::SalaryRepository;
use super::visit_repository::VisitRepository;

pub struct TestEnvironment {
    /// Kept alive so the directory survives until drop
    _temp_dir: TempDir,
    pub connection: CsvConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if std::env::var("HOSPITAL_ADMIN_DEBUG_TESTS").is_ok() {
            println!("Cleaning up test environment: {:?}", self.base_path);
        }
    }
}

/// All repositories over one temporary data directory
pub struct RepositoryTestHelper {
    pub env: TestEnvironment,
    pub doctor_repo: DoctorRepository,
    pub visit_repo: VisitRepository,
    pub expense_repo: ExpenseRepository,
    pub salary_repo: SalaryRepository,
}

impl RepositoryTestHelper {
    pub fn new() -> Result<Self> {
        let env = TestEnvironment::new()?;

        Ok(RepositoryTestHelper {
            doctor_repo: DoctorRepository::new(env.connection.clone()),
            visit_repo: VisitRepository::new(env.connection.clone()),
            expense_repo: ExpenseRepository::new(env.connection.clone()),
            salary_repo: SalaryRepository::new(env.connection.clone()),
            env,
        })
    }
}

/// Doctor with the same percentage in every category
pub fn sample_doctor(id: &str, name: &str, percentage: f64) -> Doctor {
    Doctor {
        id: id.to_string(),
        name: name.to_string(),
        percentages: FeeCategory::ALL
            .into_iter()
            .map(|category| (category, LooseNumber::from(percentage)))
            .collect(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    }
}

/// Visit billing OPD 1000 and LAB 500
pub fn sample_visit(id: &str, doctor_id: &str, date: NaiveDate) -> Visit {
    Visit {
        id: id.to_string(),
        patient_name: "Ayesha Khan".to_string(),
        contact: "0300-1234567".to_string(),
        doctor_id: doctor_id.to_string(),
        date,
        fees: CategoryMap::new()
            .with(FeeCategory::Opd, 1000)
            .with(FeeCategory::Lab, 500),
    }
}

pub fn sample_expense(id: &str, date: NaiveDate, amount: f64) -> Expense {
    Expense {
        id: id.to_string(),
        date,
        category: "Utilities".to_string(),
        description: "Electricity bill".to_string(),
        amount,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    }
}

pub fn sample_salary(id: &str, month: &str, paid_on: NaiveDate, amount: f64) -> SalaryPayment {
    SalaryPayment {
        id: id.to_string(),
        staff_name: "Nadia Baig".to_string(),
        role: "Nurse".to_string(),
        month: month.to_string(),
        amount,
        paid_on,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    }
}
