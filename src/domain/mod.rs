pub mod accounts;
pub mod actions;
pub mod aggregation;
pub mod calendar;
pub mod error;
pub mod pages;
pub mod validation;

pub use error::AppError;
