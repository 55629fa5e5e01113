//! # Storage Module
//!
//! Handles all data persistence for the hospital admin backend.
//!
//! The domain layer only sees the traits in [`traits`]. The one shipped
//! implementation is a file-backed local store under [`csv`]: doctors in a
//! YAML file, visits, expenses and salaries in CSV files, all inside a single
//! data directory owned by a [`CsvConnection`].

pub mod csv;
pub mod traits;

pub use self::csv::{
    CsvConnection, DoctorRepository, ExpenseRepository, SalaryRepository, VisitRepository,
};
pub use traits::{DoctorStorage, ExpenseStorage, SalaryStorage, VisitStorage};
