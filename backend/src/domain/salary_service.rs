use anyhow::Result;
use chrono::{Local, Utc};
use shared::{DateRange, SalaryPayment};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::salary::RecordSalaryCommand;
use crate::domain::ids::generate_id;
use crate::domain::validation::{validate_amount, validate_month, validate_name};
use crate::storage::traits::SalaryStorage;

/// Service for staff salary payments
#[derive(Clone)]
pub struct SalaryService {
    salary_storage: Arc<dyn SalaryStorage>,
}

impl SalaryService {
    pub fn new(salary_storage: Arc<dyn SalaryStorage>) -> Self {
        Self { salary_storage }
    }

    pub fn record_salary(&self, command: RecordSalaryCommand) -> Result<SalaryPayment> {
        let staff_name = validate_name(&command.staff_name)?;
        let month = validate_month(&command.month)?;
        let amount = validate_amount(command.amount)?;

        let salary = SalaryPayment {
            id: generate_id("salary"),
            staff_name,
            role: command.role.trim().to_string(),
            month,
            amount,
            paid_on: command.paid_on.unwrap_or_else(|| Local::now().date_naive()),
            created_at: Utc::now(),
        };
        self.salary_storage.store_salary(&salary)?;

        info!(
            "Recorded salary {} for {} ({}): {:.2}",
            salary.id, salary.staff_name, salary.month, salary.amount
        );
        Ok(salary)
    }

    /// Payments whose paid-on date falls in range
    pub fn list_salaries(&self, range: &DateRange) -> Result<Vec<SalaryPayment>> {
        self.salary_storage.list_salaries(range)
    }

    pub fn delete_salary(&self, salary_id: &str) -> Result<bool> {
        let deleted = self.salary_storage.delete_salary(salary_id)?;
        if !deleted {
            warn!("Salary payment not found for deletion: {}", salary_id);
        }
        Ok(deleted)
    }
}
