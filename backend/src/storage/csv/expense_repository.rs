use anyhow::{anyhow, Context, Result};
use shared::{DateRange, Expense};
use std::fs::File;
use std::io::BufReader;
use tracing::{info, warn};

use super::connection::{data_file_writer, CsvConnection, LoadedRows};
use crate::storage::traits::ExpenseStorage;

const HEADER: [&str; 6] = ["id", "date", "category", "description", "amount", "created_at"];

/// CSV-based expense repository
#[derive(Clone)]
pub struct ExpenseRepository {
    connection: CsvConnection,
}

impl ExpenseRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_expenses(&self) -> Result<LoadedRows<Expense>> {
        let path = self.connection.expenses_file_path();
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
                record.deserialize::<Expense>(Some(&headers)).map_err(anyhow::Error::from)
            } else {
                Err(anyhow!("expected {} fields, found {}", HEADER.len(), record.len()))
            };

            match parsed {
                Ok(expense) => loaded.rows.push(expense),
                Err(e) => {
                    warn!("Keeping malformed expense row in {} as-is: {}", path.display(), e);
                    loaded.unparsed.push(record);
                }
            }
        }
        Ok(loaded)
    }

    fn write_expenses(&self, loaded: &LoadedRows<Expense>) -> Result<()> {
        let mut csv_writer = data_file_writer();
        csv_writer.write_record(HEADER)?;
        for expense in &loaded.rows {
            csv_writer.serialize(expense)?;
        }
        for record in &loaded.unparsed {
            csv_writer.write_record(record)?;
        }

        let contents = csv_writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to serialize expenses: {}", e))?;
        self.connection
            .write_atomically(&self.connection.expenses_file_path(), &contents)
    }
}

impl ExpenseStorage for ExpenseRepository {
    fn store_expense(&self, expense: &Expense) -> Result<()> {
        let _guard = self.connection.lock()?;
        let mut loaded = self.read_expenses()?;
        loaded.discard_unparsed(&expense.id);

        if let Some(existing) = loaded.rows.iter_mut().find(|e| e.id == expense.id) {
            *existing = expense.clone();
        } else {
            loaded.rows.push(expense.clone());
        }

        self.write_expenses(&loaded)?;
        info!("Stored expense {} ({:.2})", expense.id, expense.amount);
        Ok(())
    }

    fn list_expenses(&self, range: &DateRange) -> Result<Vec<Expense>> {
        let mut expenses: Vec<Expense> = self
            .read_expenses()?
            .rows
            .into_iter()
            .filter(|e| range.contains(e.date))
            .collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(expenses)
    }

    fn delete_expense(&self, expense_id: &str) -> Result<bool> {
        let _guard = self.connection.lock()?;
        let mut loaded = self.read_expenses()?;
        let before = loaded.rows.len();
        loaded.rows.retain(|e| e.id != expense_id);
        let removed = before - loaded.rows.len() + loaded.discard_unparsed(expense_id);

        if removed == 0 {
            return Ok(false);
        }

        self.write_expenses(&loaded)?;
        info!("Deleted expense {}", expense_id);
        Ok(true)
    }
}
