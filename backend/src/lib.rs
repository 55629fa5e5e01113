//! # Hospital Admin Backend
//!
//! Domain services and the local file store for a small hospital's
//! administration tool. Everything is synchronous; a UI holds a [`Backend`]
//! and calls its services directly.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub mod config;
pub mod domain;
pub mod logging;
pub mod storage;

pub use config::AppConfig;
pub use storage::csv::CsvConnection;

use domain::{
    DashboardService, DoctorService, ExpenseService, ReportService, SalaryService, VisitService,
};
use storage::{DoctorRepository, ExpenseRepository, SalaryRepository, VisitRepository};

/// Main backend struct that wires every service to one data directory
#[derive(Clone)]
pub struct Backend {
    pub doctor_service: DoctorService,
    pub visit_service: VisitService,
    pub expense_service: ExpenseService,
    pub salary_service: SalaryService,
    pub dashboard_service: DashboardService,
    pub report_service: ReportService,
}

impl Backend {
    /// Open the configured data directory and build all services
    pub fn new(config: &AppConfig) -> Result<Self> {
        let connection = CsvConnection::new(&config.data_directory)?;
        info!("Opened data directory {}", config.data_directory.display());
        Ok(Self::with_connection(connection))
    }

    pub fn with_connection(connection: CsvConnection) -> Self {
        let doctors = Arc::new(DoctorRepository::new(connection.clone()));
        let visits = Arc::new(VisitRepository::new(connection.clone()));
        let expenses = Arc::new(ExpenseRepository::new(connection.clone()));
        let salaries = Arc::new(SalaryRepository::new(connection));

        let dashboard_service = DashboardService::new(
            visits.clone(),
            doctors.clone(),
            expenses.clone(),
            salaries.clone(),
        );

        Backend {
            doctor_service: DoctorService::new(doctors.clone()),
            visit_service: VisitService::new(visits, doctors),
            expense_service: ExpenseService::new(expenses),
            salary_service: SalaryService::new(salaries),
            report_service: ReportService::new(dashboard_service.clone()),
            dashboard_service,
        }
    }
}
