use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use shared::{DateRange, FeeCategory, FeeMap, LooseNumber, Visit};
use std::fs::File;
use std::io::BufReader;
use tracing::{debug, info, warn};

use super::connection::{data_file_writer, CsvConnection, LoadedRows};
use crate::storage::traits::VisitStorage;

const FIXED_COLUMNS: [&str; 5] = ["id", "patient_name", "contact", "doctor_id", "date"];

/// CSV-based visit repository
#[derive(Clone)]
pub struct VisitRepository {
    connection: CsvConnection,
}

impl VisitRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn header() -> Vec<&'static str> {
        FIXED_COLUMNS
            .into_iter()
            .chain(FeeCategory::ALL.into_iter().map(FeeCategory::column_name))
            .collect()
    }

    /// Empty cell means "not billed"; anything else is kept as stored
    fn parse_fee_cell(cell: &str) -> Option<LooseNumber> {
        if cell.is_empty() {
            return None;
        }
        match cell.trim().parse::<f64>() {
            Ok(number) => Some(LooseNumber::Number(number)),
            Err(_) => Some(LooseNumber::Text(cell.to_string())),
        }
    }

    fn parse_record(record: &::csv::StringRecord) -> Result<Visit> {
        let field = |index: usize| record.get(index).unwrap_or("").to_string();

        let date_text = field(4);
        let date = NaiveDate::parse_from_str(date_text.trim(), "%Y-%m-%d")
            .map_err(|e| anyhow!("Invalid visit date '{}': {}", date_text, e))?;

        let mut fees = FeeMap::new();
        for (offset, category) in FeeCategory::ALL.into_iter().enumerate() {
            let cell = record.get(FIXED_COLUMNS.len() + offset).unwrap_or("");
            if let Some(value) = Self::parse_fee_cell(cell) {
                fees.insert(category, value);
            }
        }

        Ok(Visit {
            id: field(0),
            patient_name: field(1),
            contact: field(2),
            doctor_id: field(3),
            date,
            fees,
        })
    }

    /// Fee cell text for a stored value. Values that are neither numbers nor
    /// text are worth 0 and are written as an empty cell.
    fn format_fee_cell(value: &LooseNumber) -> String {
        match value {
            LooseNumber::Number(_) | LooseNumber::Text(_) => value.to_string(),
            LooseNumber::Other(_) => String::new(),
        }
    }

    /// Read all visits; rows that cannot be parsed are set aside unchanged
    fn read_visits(&self) -> Result<LoadedRows<Visit>> {
        let path = self.connection.visits_file_path();
        self.connection.ensure_csv_file(&path, &Self::header())?;

        let file = File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut csv_reader = ::csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut loaded = LoadedRows::new();
        for (line, result) in csv_reader.records().enumerate() {
            let record = result?;
            match Self::parse_record(&record) {
                Ok(visit) => loaded.rows.push(visit),
                Err(e) => {
                    warn!("Skipping visit row {} in {}: {}", line + 1, path.display(), e);
                    loaded.unparsed.push(record);
                }
            }
        }

        debug!(
            "Loaded {} visits ({} unreadable rows kept)",
            loaded.rows.len(),
            loaded.unparsed.len()
        );
        Ok(loaded)
    }

    fn write_visits(&self, loaded: &LoadedRows<Visit>) -> Result<()> {
        let mut csv_writer = data_file_writer();
        csv_writer.write_record(Self::header())?;

        for visit in &loaded.rows {
            let mut row = vec![
                visit.id.clone(),
                visit.patient_name.clone(),
                visit.contact.clone(),
                visit.doctor_id.clone(),
                visit.date.format("%Y-%m-%d").to_string(),
            ];
            row.extend(FeeCategory::ALL.into_iter().map(|category| {
                visit
                    .fees
                    .get(category)
                    .map(Self::format_fee_cell)
                    .unwrap_or_default()
            }));
            csv_writer.write_record(&row)?;
        }
        for record in &loaded.unparsed {
            csv_writer.write_record(record)?;
        }

        let contents = csv_writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to serialize visits: {}", e))?;
        self.connection
            .write_atomically(&self.connection.visits_file_path(), &contents)
    }
}

impl VisitStorage for VisitRepository {
    fn store_visit(&self, visit: &Visit) -> Result<()> {
        let _guard = self.connection.lock()?;
        let mut loaded = self.read_visits()?;
        loaded.discard_unparsed(&visit.id);

        if let Some(existing) = loaded.rows.iter_mut().find(|v| v.id == visit.id) {
            *existing = visit.clone();
        } else {
            loaded.rows.push(visit.clone());
        }

        self.write_visits(&loaded)?;
        info!("Stored visit {} for doctor {}", visit.id, visit.doctor_id);
        Ok(())
    }

    fn get_visit(&self, visit_id: &str) -> Result<Option<Visit>> {
        let loaded = self.read_visits()?;
        Ok(loaded.rows.into_iter().find(|v| v.id == visit_id))
    }

    fn list_visits(&self, range: &DateRange) -> Result<Vec<Visit>> {
        let mut visits: Vec<Visit> = self
            .read_visits()?
            .rows
            .into_iter()
            .filter(|v| range.contains(v.date))
            .collect();
        visits.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(visits)
    }

    fn delete_visit(&self, visit_id: &str) -> Result<bool> {
        let _guard = self.connection.lock()?;
        let mut loaded = self.read_visits()?;
        let before = loaded.rows.len();
        loaded.rows.retain(|v| v.id != visit_id);
        let removed = before - loaded.rows.len() + loaded.discard_unparsed(visit_id);

        if removed == 0 {
            return Ok(false);
        }

        self.write_visits(&loaded)?;
        info!("Deleted visit {}", visit_id);
        Ok(true)
    }
}
