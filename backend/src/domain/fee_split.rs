//! Visit fee split engine.
//!
//! Every revenue and profit figure in the dashboards and reports comes from
//! here. For each fee category a visit's fee is divided between the treating
//! doctor and the hospital using the doctor's percentage for that category:
//!
//! ```text
//! doctor   = fee * percentage / 100
//! hospital = fee - doctor
//! ```
//!
//! The computation is total. Missing or malformed fees and percentages are
//! worth 0, and percentages are not clamped to 0..=100: a share above 100
//! leaves the hospital with a negative amount and a negative share gives the
//! hospital more than the fee. Callers that need strict input must validate
//! before calling.

use shared::{Doctor, FeeCategory, FeeMap, PercentageMap, SplitResult, Visit};

/// Split a visit's fees between its doctor and the hospital
pub fn compute_visit_split(visit: &Visit, doctor: &Doctor) -> SplitResult {
    split_fees(&visit.fees, &doctor.percentages)
}

/// Split a fee map using a percentage map
pub fn split_fees(fees: &FeeMap, percentages: &PercentageMap) -> SplitResult {
    let mut result = SplitResult::default();

    for category in FeeCategory::ALL {
        let fee = fees.value(category);
        let fraction = percentages.value(category) / 100.0;
        let doctor = fee * fraction;
        let hospital = fee - doctor;

        result.fees.set(category, fee);
        result.doctor.set(category, doctor);
        result.hospital.set(category, hospital);

        result.fee_total += fee;
        result.doctor_total += doctor;
        result.hospital_total += hospital;
    }

    result
}

/// Sum a collection of splits into one
pub fn summarize_splits<'a, I>(splits: I) -> SplitResult
where
    I: IntoIterator<Item = &'a SplitResult>,
{
    splits
        .into_iter()
        .fold(SplitResult::default(), |mut total, split| {
            total.accumulate(split);
            total
        })
}
