use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// Billable service type tracked per patient visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeCategory {
    /// Outpatient consultation
    Opd,
    /// Laboratory work
    Lab,
    /// Operation theatre
    Ot,
    Ultrasound,
    Ecg,
}

impl FeeCategory {
    pub const COUNT: usize = 5;

    /// All categories in stable order
    pub const ALL: [FeeCategory; FeeCategory::COUNT] = [
        FeeCategory::Opd,
        FeeCategory::Lab,
        FeeCategory::Ot,
        FeeCategory::Ultrasound,
        FeeCategory::Ecg,
    ];

    /// Position of the category in `ALL`
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Upper-case tag used on the wire ("OPD", "LAB", ...)
    pub fn tag(self) -> &'static str {
        match self {
            FeeCategory::Opd => "OPD",
            FeeCategory::Lab => "LAB",
            FeeCategory::Ot => "OT",
            FeeCategory::Ultrasound => "ULTRASOUND",
            FeeCategory::Ecg => "ECG",
        }
    }

    /// Lower-case column name used in CSV files
    pub fn column_name(self) -> &'static str {
        match self {
            FeeCategory::Opd => "opd",
            FeeCategory::Lab => "lab",
            FeeCategory::Ot => "ot",
            FeeCategory::Ultrasound => "ultrasound",
            FeeCategory::Ecg => "ecg",
        }
    }

    /// Parse a tag, ignoring case and surrounding whitespace
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        FeeCategory::ALL
            .into_iter()
            .find(|category| category.tag().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for FeeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A numeric field as it arrives from storage or a client.
///
/// Stored records are not trusted to hold numbers: a fee may have been saved as
/// a string, or as something that is not a number at all. `to_finite` is the
/// single place that decides what such a value is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LooseNumber {
    /// Coerce to a finite number. Anything unparseable, NaN or infinite is 0.
    pub fn to_finite(&self) -> f64 {
        let value = match self {
            LooseNumber::Number(number) => *number,
            LooseNumber::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    0.0
                } else {
                    text.parse::<f64>().unwrap_or(0.0)
                }
            }
            LooseNumber::Other(_) => 0.0,
        };

        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        LooseNumber::Number(value)
    }
}

impl From<i32> for LooseNumber {
    fn from(value: i32) -> Self {
        LooseNumber::Number(f64::from(value))
    }
}

impl From<&str> for LooseNumber {
    fn from(value: &str) -> Self {
        LooseNumber::Text(value.to_string())
    }
}

impl From<String> for LooseNumber {
    fn from(value: String) -> Self {
        LooseNumber::Text(value)
    }
}

impl fmt::Display for LooseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LooseNumber::Number(number) => write!(f, "{}", number),
            LooseNumber::Text(text) => f.write_str(text),
            LooseNumber::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Sparse category-keyed map of loosely typed numbers.
///
/// Used both for a visit's fees and for a doctor's percentages; a missing
/// category reads as 0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap(BTreeMap<FeeCategory, LooseNumber>);

/// Monetary amount per category for one visit
pub type FeeMap = CategoryMap;

/// Doctor's share per category, nominally 0..=100
pub type PercentageMap = CategoryMap;

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, category: FeeCategory, value: impl Into<LooseNumber>) -> Self {
        self.insert(category, value);
        self
    }

    pub fn insert(&mut self, category: FeeCategory, value: impl Into<LooseNumber>) {
        self.0.insert(category, value.into());
    }

    pub fn remove(&mut self, category: FeeCategory) -> Option<LooseNumber> {
        self.0.remove(&category)
    }

    /// Raw stored value, if any
    pub fn get(&self, category: FeeCategory) -> Option<&LooseNumber> {
        self.0.get(&category)
    }

    /// Coerced value; absent categories are 0
    pub fn value(&self, category: FeeCategory) -> f64 {
        self.0.get(&category).map(LooseNumber::to_finite).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeeCategory, &LooseNumber)> {
        self.0.iter().map(|(category, value)| (*category, value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(FeeCategory, LooseNumber)> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = (FeeCategory, LooseNumber)>>(iter: I) -> Self {
        CategoryMap(iter.into_iter().collect())
    }
}

/// Dense per-category amounts indexed by `FeeCategory`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<FeeCategory, f64>", into = "BTreeMap<FeeCategory, f64>")]
pub struct CategoryAmounts([f64; FeeCategory::COUNT]);

impl CategoryAmounts {
    pub fn get(&self, category: FeeCategory) -> f64 {
        self.0[category.index()]
    }

    pub fn set(&mut self, category: FeeCategory, amount: f64) {
        self.0[category.index()] = amount;
    }

    pub fn add(&mut self, category: FeeCategory, amount: f64) {
        self.0[category.index()] += amount;
    }

    /// Element-wise sum
    pub fn accumulate(&mut self, other: &CategoryAmounts) {
        for category in FeeCategory::ALL {
            self.add(category, other.get(category));
        }
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Pairs in stable category order
    pub fn iter(&self) -> impl Iterator<Item = (FeeCategory, f64)> + '_ {
        FeeCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }
}

impl Index<FeeCategory> for CategoryAmounts {
    type Output = f64;

    fn index(&self, category: FeeCategory) -> &f64 {
        &self.0[category.index()]
    }
}

impl From<BTreeMap<FeeCategory, f64>> for CategoryAmounts {
    fn from(map: BTreeMap<FeeCategory, f64>) -> Self {
        let mut amounts = CategoryAmounts::default();
        for (category, amount) in map {
            amounts.set(category, amount);
        }
        amounts
    }
}

impl From<CategoryAmounts> for BTreeMap<FeeCategory, f64> {
    fn from(amounts: CategoryAmounts) -> Self {
        amounts.iter().collect()
    }
}

/// A single patient encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Format: "visit::<epoch_millis>::<suffix>"
    pub id: String,
    pub patient_name: String,
    /// Phone number or other free-form contact
    pub contact: String,
    /// ID of the treating doctor
    pub doctor_id: String,
    pub date: NaiveDate,
    pub fees: FeeMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    /// Doctor's share of each category's fee, in percent
    pub percentages: PercentageMap,
    pub created_at: DateTime<Utc>,
}

/// How one visit's fees divide between doctor and hospital.
///
/// Derived on demand from a visit and its doctor and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitResult {
    /// Coerced fee per category
    pub fees: CategoryAmounts,
    pub doctor: CategoryAmounts,
    pub hospital: CategoryAmounts,
    pub doctor_total: f64,
    pub hospital_total: f64,
    /// Sum of all category fees, independent of percentages
    pub fee_total: f64,
}

impl SplitResult {
    /// Add another split into this one, category by category
    pub fn accumulate(&mut self, other: &SplitResult) {
        self.fees.accumulate(&other.fees);
        self.doctor.accumulate(&other.doctor);
        self.hospital.accumulate(&other.hospital);
        self.doctor_total += other.doctor_total;
        self.hospital_total += other.hospital_total;
        self.fee_total += other.fee_total;
    }
}

/// A hospital running cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    /// Free-text grouping such as "Utilities" or "Supplies"
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

/// A salary paid to a staff member for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryPayment {
    pub id: String,
    pub staff_name: String,
    pub role: String,
    /// Salary month in "YYYY-MM" format
    pub month: String,
    pub amount: f64,
    pub paid_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Inclusive date filter; a missing bound is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Range with no bounds
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Revenue attributed to one doctor over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorEarnings {
    pub doctor_id: String,
    pub doctor_name: String,
    pub visit_count: u32,
    pub fee_total: f64,
    pub doctor_total: f64,
    pub hospital_total: f64,
}

/// Dashboard KPIs for a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub range: DateRange,
    pub visit_count: u32,
    /// Per-category and overall totals over every visit in range
    pub splits: SplitResult,
    pub expense_total: f64,
    pub salary_total: f64,
    /// Hospital share minus expenses and salaries
    pub net_profit: f64,
    /// Ordered by doctor name
    pub per_doctor: Vec<DoctorEarnings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_category_order_and_tags() {
        let tags: Vec<&str> = FeeCategory::ALL.iter().map(|c| c.tag()).collect();
        assert_eq!(tags, vec!["OPD", "LAB", "OT", "ULTRASOUND", "ECG"]);
        for (i, category) in FeeCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_fee_category_from_tag() {
        assert_eq!(FeeCategory::from_tag("ultrasound"), Some(FeeCategory::Ultrasound));
        assert_eq!(FeeCategory::from_tag(" OT "), Some(FeeCategory::Ot));
        assert_eq!(FeeCategory::from_tag("XRAY"), None);
    }

    #[test]
    fn test_fee_category_serializes_as_tag() {
        let json = serde_json::to_string(&FeeCategory::Ultrasound).unwrap();
        assert_eq!(json, "\"ULTRASOUND\"");
    }

    #[test]
    fn test_loose_number_coercion() {
        assert_eq!(LooseNumber::from(250.5).to_finite(), 250.5);
        assert_eq!(LooseNumber::from(" 120 ").to_finite(), 120.0);
        assert_eq!(LooseNumber::from("abc").to_finite(), 0.0);
        assert_eq!(LooseNumber::from("").to_finite(), 0.0);
        assert_eq!(LooseNumber::from("NaN").to_finite(), 0.0);
        assert_eq!(LooseNumber::from("inf").to_finite(), 0.0);
        assert_eq!(LooseNumber::Number(f64::NAN).to_finite(), 0.0);
        assert_eq!(LooseNumber::Number(f64::INFINITY).to_finite(), 0.0);
        assert_eq!(LooseNumber::Other(serde_json::Value::Bool(true)).to_finite(), 0.0);
        assert_eq!(LooseNumber::Other(serde_json::Value::Null).to_finite(), 0.0);
    }

    #[test]
    fn test_fee_map_deserializes_mixed_values() {
        let fees: FeeMap =
            serde_json::from_str(r#"{"OPD": 1000, "LAB": "abc", "OT": null, "ECG": "75"}"#).unwrap();

        assert_eq!(fees.value(FeeCategory::Opd), 1000.0);
        assert_eq!(fees.get(FeeCategory::Lab), Some(&LooseNumber::Text("abc".to_string())));
        assert_eq!(fees.value(FeeCategory::Lab), 0.0);
        assert_eq!(fees.value(FeeCategory::Ot), 0.0);
        assert_eq!(fees.value(FeeCategory::Ecg), 75.0);
        assert_eq!(fees.value(FeeCategory::Ultrasound), 0.0);
        assert_eq!(fees.len(), 4);
    }

    #[test]
    fn test_category_amounts_serialize_as_map() {
        let mut amounts = CategoryAmounts::default();
        amounts.set(FeeCategory::Lab, 12.5);

        let value = serde_json::to_value(amounts).unwrap();
        assert_eq!(value["LAB"], serde_json::json!(12.5));
        assert_eq!(value["OPD"], serde_json::json!(0.0));

        let back: CategoryAmounts = serde_json::from_value(value).unwrap();
        assert_eq!(back, amounts);
        assert_eq!(back[FeeCategory::Lab], 12.5);
    }

    #[test]
    fn test_date_range_contains_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let range = DateRange::between(start, end);

        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
        assert!(DateRange::all().contains(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()));
    }
}
