use anyhow::{anyhow, Context, Result};
use shared::{DateRange, SalaryPayment};
use std::fs::File;
use std::io::BufReader;
use tracing::{info, warn};

use super::connection::{data_file_writer, CsvConnection, LoadedRows};
use crate::storage::traits::SalaryStorage;

const HEADER: [&str; 7] = [
    "id",
    "staff_name",
    "role",
    "month",
    "amount",
    "paid_on",
    "created_at",
];

/// CSV-based salary payment repository
#[derive(Clone)]
pub struct SalaryRepository {
    connection: CsvConnection,
}

impl SalaryRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_salaries(&self) -> Result<LoadedRows<SalaryPayment>> {
        let path = self.connection.salaries_file_path();
        self.connection.ensure_csv_file(&path, &HEADER)?;

        let file = File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut csv_reader = ::csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(BufReader::new(file));
        let headers = csv_reader.headers()?.clone();

        let mut loaded = LoadedRows::new();
        for result in csv_reader.records() {
            let record = result?;
            let parsed = if record.len() == HEADER.len() {
                record
                    .deserialize::<SalaryPayment>(Some(&headers))
                    .map_err(anyhow::Error::from)
            } else {
                Err(anyhow!("expected {} fields, found {}", HEADER.len(), record.len()))
            };

            match parsed {
                Ok(salary) => loaded.rows.push(salary),
                Err(e) => {
                    warn!("Keeping malformed salary row in {} as-is: {}", path.display(), e);
                    loaded.unparsed.push(record);
                }
            }
        }
        Ok(loaded)
    }

    fn write_salaries(&self, loaded: &LoadedRows<SalaryPayment>) -> Result<()> {
        let mut csv_writer = data_file_writer();
        csv_writer.write_record(HEADER)?;
        for salary in &loaded.rows {
            csv_writer.serialize(salary)?;
        }
        for record in &loaded.unparsed {
            csv_writer.write_record(record)?;
        }

        let contents = csv_writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to serialize salaries: {}", e))?;
        self.connection
            .write_atomically(&self.connection.salaries_file_path(), &contents)
    }
}

impl SalaryStorage for SalaryRepository {
    fn store_salary(&self, salary: &SalaryPayment) -> Result<()> {
        let _guard = self.connection.lock()?;
        let mut loaded = self.read_salaries()?;
        loaded.discard_unparsed(&salary.id);

        if let Some(existing) = loaded.rows.iter_mut().find(|s| s.id == salary.id) {
            *existing = salary.clone();
        } else {
            loaded.rows.push(salary.clone());
        }

        self.write_salaries(&loaded)?;
        info!("Stored salary {} for {} ({})", salary.id, salary.staff_name, salary.month);
        Ok(())
    }

    fn list_salaries(&self, range: &DateRange) -> Result<Vec<SalaryPayment>> {
        let mut salaries: Vec<SalaryPayment> = self
            .read_salaries()?
            .rows
            .into_iter()
            .filter(|s| range.contains(s.paid_on))
            .collect();
        salaries.sort_by(|a, b| a.paid_on.cmp(&b.paid_on).then_with(|| a.id.cmp(&b.id)));
        Ok(salaries)
    }

    fn delete_salary(&self, salary_id: &str) -> Result<bool> {
        let _guard = self.connection.lock()?;
        let mut loaded = self.read_salaries()?;
        let before = loaded.rows.len();
        loaded.rows.retain(|s| s.id != salary_id);
        let removed = before - loaded.rows.len() + loaded.discard_unparsed(salary_id);

        if removed == 0 {
            return Ok(false);
        }

        self.write_salaries(&loaded)?;
        info!("Deleted salary {}", salary_id);
        Ok(true)
    }
}
