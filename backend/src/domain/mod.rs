//! # Domain Module
//!
//! Business logic for the hospital admin backend.
//!
//! The fee split engine in [`fee_split`] is a pure function over shared
//! types. The services around it validate input, talk to storage through the
//! traits in [`crate::storage::traits`], and build the dashboard and report
//! figures from split results.

pub mod commands;
pub mod dashboard_service;
pub mod doctor_service;
pub mod expense_service;
pub mod fee_split;
pub mod ids;
pub mod report_service;
pub mod salary_service;
pub mod validation;
pub mod visit_service;

pub use dashboard_service::DashboardService;
pub use doctor_service::DoctorService;
pub use expense_service::ExpenseService;
pub use fee_split::{compute_visit_split, split_fees, summarize_splits};
pub use report_service::ReportService;
pub use salary_service::SalaryService;
pub use validation::ValidationError;
pub use visit_service::VisitService;
