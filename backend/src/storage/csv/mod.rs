//! # CSV Storage Module
//!
//! File-based local store for the hospital admin backend. Everything lives in
//! one data directory:
//!
//! ```text
//! data/
//! ├── doctors.yaml    ← DoctorRepository
//! ├── visits.csv      ← VisitRepository
//! ├── expenses.csv    ← ExpenseRepository
//! └── salaries.csv    ← SalaryRepository
//! ```
//!
//! ## Visit file format
//!
//! ```csv
//! id,patient_name,contact,doctor_id,date,opd,lab,ot,ultrasound,ecg
//! visit::1715330000000::3fa1c2d4,Ayesha Khan,0300-1234567,doctor::1704099600000::a1b2c3d4,2024-05-10,1000,500,,,
//! ```
//!
//! Fee cells keep whatever text was stored. An empty cell means the category
//! was not billed; a cell that is not a number is loaded as-is and is worth 0
//! to the fee split engine.
//!
//! Fee values that are neither numbers nor text are written as empty cells.
//!
//! All writes replace the whole file through a uniquely named temp file and a
//! rename. Rows that fail to parse are left out of query results but are
//! written back unchanged whenever the file is rewritten; storing or deleting
//! a record with the same id replaces or removes such a row.

pub mod connection;
pub mod doctor_repository;
pub mod expense_repository;
pub mod salary_repository;
pub mod visit_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::{write_atomically, CsvConnection, LoadedRows};
pub use doctor_repository::DoctorRepository;
pub use expense_repository::ExpenseRepository;
pub use salary_repository::SalaryRepository;
pub use visit_repository::VisitRepository;
