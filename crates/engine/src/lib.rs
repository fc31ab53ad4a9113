//! Expense storage and the figures derived from it.
//!
//! [`Engine`] is the only entry point: it owns the database handle and every
//! operation receives the acting user's id explicitly.

pub use amount::{Amount, SplitCount};
pub use dashboard::{Dashboard, daily_series, days_in_month, month_window};
pub use error::EngineError;
pub use expenses::Expense;
pub use ops::{Engine, EngineBuilder, NewExpense, NewUser, UpdateExpense};
pub use users::User;

mod amount;
mod dashboard;
mod error;
mod expenses;
mod ops;
pub mod password;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
