//! Printable CSV reports built on the dashboard figures.
//!
//! Reports are produced as strings so a UI can preview them before saving;
//! `write_report` puts one on disk.

use anyhow::{anyhow, Context, Result};
use shared::{DashboardSummary, DateRange, FeeCategory};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::domain::dashboard_service::DashboardService;
use crate::storage::csv::write_atomically;

const DOCTOR_REPORT_HEADER: [&str; 6] = [
    "doctor_id",
    "doctor_name",
    "visits",
    "fee_total",
    "doctor_total",
    "hospital_total",
];

const CATEGORY_REPORT_HEADER: [&str; 4] = ["category", "fee_total", "doctor_total", "hospital_total"];

#[derive(Clone)]
pub struct ReportService {
    dashboard_service: DashboardService,
}

impl ReportService {
    pub fn new(dashboard_service: DashboardService) -> Self {
        Self { dashboard_service }
    }

    /// One row per doctor with visits in range, ordered by doctor name
    pub fn doctor_split_report(&self, range: &DateRange) -> Result<String> {
        let summary = self.dashboard_service.summary(range)?;
        let report = render_doctor_report(&summary)?;
        info!("Built doctor split report with {} rows", summary.per_doctor.len());
        Ok(report)
    }

    /// One row per fee category in fixed category order
    pub fn category_split_report(&self, range: &DateRange) -> Result<String> {
        let summary = self.dashboard_service.summary(range)?;
        let report = render_category_report(&summary)?;
        info!("Built category split report for {} visits", summary.visit_count);
        Ok(report)
    }

    /// Save a report, replacing any existing file at `path`
    pub fn write_report(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory {}", parent.display()))?;
        }

        write_atomically(path, contents.as_bytes())?;
        info!("Wrote report ({} bytes) to {}", contents.len(), path.display());
        Ok(())
    }
}

fn amount(value: f64) -> String {
    format!("{:.2}", value)
}

fn render_doctor_report(summary: &DashboardSummary) -> Result<String> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(DOCTOR_REPORT_HEADER)?;

    for earnings in &summary.per_doctor {
        writer.write_record([
            earnings.doctor_id.clone(),
            earnings.doctor_name.clone(),
            earnings.visit_count.to_string(),
            amount(earnings.fee_total),
            amount(earnings.doctor_total),
            amount(earnings.hospital_total),
        ])?;
    }

    finish(writer)
}

fn render_category_report(summary: &DashboardSummary) -> Result<String> {
    let splits = &summary.splits;
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(CATEGORY_REPORT_HEADER)?;

    for category in FeeCategory::ALL {
        writer.write_record([
            category.tag().to_string(),
            amount(splits.fees[category]),
            amount(splits.doctor[category]),
            amount(splits.hospital[category]),
        ])?;
    }

    finish(writer)
}

fn finish(writer: ::csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush report: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{sample_doctor, sample_visit, RepositoryTestHelper};
    use crate::storage::traits::{DoctorStorage, VisitStorage};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn create_test_service(helper: &RepositoryTestHelper) -> ReportService {
        ReportService::new(DashboardService::new(
            Arc::new(helper.visit_repo.clone()),
            Arc::new(helper.doctor_repo.clone()),
            Arc::new(helper.expense_repo.clone()),
            Arc::new(helper.salary_repo.clone()),
        ))
    }

    fn seed(helper: &RepositoryTestHelper) {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        helper
            .doctor_repo
            .store_doctor(&sample_doctor("doctor::1::a", "Dr. Rehman, Sr.", 70.0))
            .unwrap();
        helper
            .doctor_repo
            .store_doctor(&sample_doctor("doctor::2::b", "Dr. Amina", 0.0))
            .unwrap();
        helper.visit_repo.store_visit(&sample_visit("visit::1", "doctor::1::a", date)).unwrap();
        helper.visit_repo.store_visit(&sample_visit("visit::2", "doctor::2::b", date)).unwrap();
    }

    #[test]
    fn test_doctor_split_report() {
        let helper = RepositoryTestHelper::new().unwrap();
        seed(&helper);
        let service = create_test_service(&helper);

        let report = service.doctor_split_report(&DateRange::all()).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(
            lines,
            vec![
                "doctor_id,doctor_name,visits,fee_total,doctor_total,hospital_total",
                "doctor::2::b,Dr. Amina,1,1500.00,0.00,1500.00",
                "doctor::1::a,\"Dr. Rehman, Sr.\",1,1500.00,1050.00,450.00",
            ]
        );
    }

    #[test]
    fn test_category_split_report_lists_every_category() {
        let helper = RepositoryTestHelper::new().unwrap();
        seed(&helper);
        let service = create_test_service(&helper);

        let report = service.category_split_report(&DateRange::all()).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(
            lines,
            vec![
                "category,fee_total,doctor_total,hospital_total",
                "OPD,2000.00,700.00,1300.00",
                "LAB,1000.00,350.00,650.00",
                "OT,0.00,0.00,0.00",
                "ULTRASOUND,0.00,0.00,0.00",
                "ECG,0.00,0.00,0.00",
            ]
        );
    }

    #[test]
    fn test_reports_on_empty_store_have_headers_only() {
        let helper = RepositoryTestHelper::new().unwrap();
        let service = create_test_service(&helper);

        let report = service.doctor_split_report(&DateRange::all()).unwrap();
        assert_eq!(report.lines().count(), 1);
    }

    #[test]
    fn test_write_report_creates_directory_and_replaces_file() {
        let helper = RepositoryTestHelper::new().unwrap();
        let service = create_test_service(&helper);
        let path = helper.env.base_path.join("reports").join("july.csv");

        service.write_report(&path, "first\n").unwrap();
        service.write_report(&path, "second\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_report_leaves_neighbouring_files_alone() {
        let helper = RepositoryTestHelper::new().unwrap();
        let service = create_test_service(&helper);
        let path = helper.env.base_path.join("july.csv");
        let neighbour = helper.env.base_path.join("july.tmp");
        fs::write(&neighbour, "draft notes").unwrap();

        service.write_report(&path, "report\n").unwrap();

        assert_eq!(fs::read_to_string(&neighbour).unwrap(), "draft notes");
        assert_eq!(fs::read_to_string(&path).unwrap(), "report\n");
    }
}
