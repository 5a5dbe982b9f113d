use serde::Serialize;
use rust_decimal::Decimal;
use chrono::{NaiveDate, NaiveDateTime};

use super::Category;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub expense_id: i64,
    pub user_id: i64,
    pub title: String,
    pub amount: Decimal,
    pub category: Category,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub title: String,
    pub amount: Decimal,
    pub category: Category,
    pub date: NaiveDate,
}
