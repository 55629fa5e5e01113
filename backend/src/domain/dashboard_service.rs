//! Dashboard aggregation.
//!
//! Sums the fee split of every visit in a date range and sets the hospital's
//! share against expenses and salaries paid in the same range.

use anyhow::Result;
use shared::{DashboardSummary, DateRange, Doctor, DoctorEarnings, PercentageMap, SplitResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::fee_split::{split_fees, summarize_splits};
use crate::storage::traits::{DoctorStorage, ExpenseStorage, SalaryStorage, VisitStorage};

const UNKNOWN_DOCTOR_NAME: &str = "(unknown doctor)";

#[derive(Clone)]
pub struct DashboardService {
    visit_storage: Arc<dyn VisitStorage>,
    doctor_storage: Arc<dyn DoctorStorage>,
    expense_storage: Arc<dyn ExpenseStorage>,
    salary_storage: Arc<dyn SalaryStorage>,
}

impl DashboardService {
    pub fn new(
        visit_storage: Arc<dyn VisitStorage>,
        doctor_storage: Arc<dyn DoctorStorage>,
        expense_storage: Arc<dyn ExpenseStorage>,
        salary_storage: Arc<dyn SalaryStorage>,
    ) -> Self {
        Self {
            visit_storage,
            doctor_storage,
            expense_storage,
            salary_storage,
        }
    }

    /// Revenue, cost and profit figures for a date range
    pub fn summary(&self, range: &DateRange) -> Result<DashboardSummary> {
        let visits = self.visit_storage.list_visits(range)?;
        let doctors: HashMap<String, Doctor> = self
            .doctor_storage
            .list_doctors()?
            .into_iter()
            .map(|doctor| (doctor.id.clone(), doctor))
            .collect();
        let no_share = PercentageMap::new();

        let mut splits = Vec::with_capacity(visits.len());
        let mut per_doctor: HashMap<String, DoctorEarnings> = HashMap::new();

        for visit in &visits {
            let doctor = doctors.get(&visit.doctor_id);
            if doctor.is_none() {
                warn!(
                    "Visit {} references unknown doctor {}; crediting all fees to the hospital",
                    visit.id, visit.doctor_id
                );
            }

            let percentages = doctor.map(|d| &d.percentages).unwrap_or(&no_share);
            let split = split_fees(&visit.fees, percentages);

            let earnings = per_doctor
                .entry(visit.doctor_id.clone())
                .or_insert_with(|| DoctorEarnings {
                    doctor_id: visit.doctor_id.clone(),
                    doctor_name: doctor
                        .map(|d| d.name.clone())
                        .unwrap_or_else(|| UNKNOWN_DOCTOR_NAME.to_string()),
                    visit_count: 0,
                    fee_total: 0.0,
                    doctor_total: 0.0,
                    hospital_total: 0.0,
                });
            add_split(earnings, &split);
            splits.push(split);
        }

        let totals = summarize_splits(&splits);

        let expense_total: f64 = self
            .expense_storage
            .list_expenses(range)?
            .iter()
            .map(|expense| expense.amount)
            .sum();
        let salary_total: f64 = self
            .salary_storage
            .list_salaries(range)?
            .iter()
            .map(|salary| salary.amount)
            .sum();

        let mut per_doctor: Vec<DoctorEarnings> = per_doctor.into_values().collect();
        per_doctor.sort_by(|a, b| {
            a.doctor_name
                .cmp(&b.doctor_name)
                .then_with(|| a.doctor_id.cmp(&b.doctor_id))
        });

        let summary = DashboardSummary {
            range: *range,
            visit_count: visits.len() as u32,
            net_profit: totals.hospital_total - expense_total - salary_total,
            splits: totals,
            expense_total,
            salary_total,
            per_doctor,
        };

        info!(
            "Dashboard: {} visits, fees {:.2}, hospital {:.2}, net profit {:.2}",
            summary.visit_count, summary.splits.fee_total, summary.splits.hospital_total, summary.net_profit
        );
        Ok(summary)
    }
}

fn add_split(earnings: &mut DoctorEarnings, split: &SplitResult) {
    earnings.visit_count += 1;
    earnings.fee_total += split.fee_total;
    earnings.doctor_total += split.doctor_total;
    earnings.hospital_total += split.hospital_total;
}
