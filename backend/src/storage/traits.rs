//! # Storage Traits
//!
//! Storage abstraction used by the domain layer. Services receive these as
//! `Arc<dyn ...>` so the backing store is chosen by whoever wires the backend,
//! never looked up globally.

use anyhow::Result;
use shared::{DateRange, Doctor, Expense, SalaryPayment, Visit};

/// Trait defining the interface for doctor storage operations
pub trait DoctorStorage: Send + Sync {
    /// Store a new doctor
    fn store_doctor(&self, doctor: &Doctor) -> Result<()>;

    /// Retrieve a specific doctor by ID
    fn get_doctor(&self, doctor_id: &str) -> Result<Option<Doctor>>;

    /// List all doctors ordered by name
    fn list_doctors(&self) -> Result<Vec<Doctor>>;

    /// Replace an existing doctor
    /// Returns true if the doctor was found and updated
    fn update_doctor(&self, doctor: &Doctor) -> Result<bool>;

    /// Returns true if the doctor was found and deleted
    fn delete_doctor(&self, doctor_id: &str) -> Result<bool>;
}

/// Trait defining the interface for visit storage operations
pub trait VisitStorage: Send + Sync {
    fn store_visit(&self, visit: &Visit) -> Result<()>;

    fn get_visit(&self, visit_id: &str) -> Result<Option<Visit>>;

    /// List visits within the range, oldest first (ties broken by ID)
    fn list_visits(&self, range: &DateRange) -> Result<Vec<Visit>>;

    /// Returns true if the visit was found and deleted
    fn delete_visit(&self, visit_id: &str) -> Result<bool>;
}

/// Trait defining the interface for expense storage operations
pub trait ExpenseStorage: Send + Sync {
    fn store_expense(&self, expense: &Expense) -> Result<()>;

    /// List expenses within the range, oldest first
    fn list_expenses(&self, range: &DateRange) -> Result<Vec<Expense>>;

    fn delete_expense(&self, expense_id: &str) -> Result<bool>;
}

/// Trait defining the interface for salary storage operations
pub trait SalaryStorage: Send + Sync {
    fn store_salary(&self, salary: &SalaryPayment) -> Result<()>;

    /// List salary payments whose `paid_on` date falls within the range
    fn list_salaries(&self, range: &DateRange) -> Result<Vec<SalaryPayment>>;

    fn delete_salary(&self, salary_id: &str) -> Result<bool>;
}
