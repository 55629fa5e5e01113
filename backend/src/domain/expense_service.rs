use anyhow::Result;
use chrono::{Local, Utc};
use shared::{DateRange, Expense};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::expense::RecordExpenseCommand;
use crate::domain::ids::generate_id;
use crate::domain::validation::{validate_amount, ValidationError};
use crate::storage::traits::ExpenseStorage;

/// Service for hospital running costs
#[derive(Clone)]
pub struct ExpenseService {
    expense_storage: Arc<dyn ExpenseStorage>,
}

impl ExpenseService {
    pub fn new(expense_storage: Arc<dyn ExpenseStorage>) -> Self {
        Self { expense_storage }
    }

    pub fn record_expense(&self, command: RecordExpenseCommand) -> Result<Expense> {
        let description = command.description.trim().to_string();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription.into());
        }
        let amount = validate_amount(command.amount)?;

        let category = match command.category.trim() {
            "" => "General".to_string(),
            other => other.to_string(),
        };

        let expense = Expense {
            id: generate_id("expense"),
            date: command.date.unwrap_or_else(|| Local::now().date_naive()),
            category,
            description,
            amount,
            created_at: Utc::now(),
        };
        self.expense_storage.store_expense(&expense)?;

        info!("Recorded expense {}: {} ({:.2})", expense.id, expense.description, expense.amount);
        Ok(expense)
    }

    pub fn list_expenses(&self, range: &DateRange) -> Result<Vec<Expense>> {
        self.expense_storage.list_expenses(range)
    }

    pub fn delete_expense(&self, expense_id: &str) -> Result<bool> {
        let deleted = self.expense_storage.delete_expense(expense_id)?;
        if !deleted {
            warn!("Expense not found for deletion: {}", expense_id);
        }
        Ok(deleted)
    }
}
