pub mod calculator;
pub mod error;
pub mod history;
pub mod memento;
pub mod models;
pub mod observers;
pub mod operations;
pub mod parser;
pub mod persistence;
pub mod undo;
pub mod writer;

pub use calculator::Calculator;
pub use error::CalculatorError;
pub use models::{Calculation, OperationKind};
