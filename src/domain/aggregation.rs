//! Per-category spending totals and the derived budget figures.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use tracing::debug;

use crate::database::db::queries;
use crate::database::models::{Budget, Category, Expense};
use crate::domain::calendar;
use crate::domain::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub label: &'static str,
    pub total: Decimal,
}

/// Category → summed amount, in the order each category first appears.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryTotals(Vec<CategoryTotal>);

impl CategoryTotals {
    pub fn get(&self, category: Category) -> Option<Decimal> {
        self.0
            .iter()
            .find(|t| t.category == category)
            .map(|t| t.total)
    }

    pub fn total(&self) -> Decimal {
        self.0.iter().map(|t| t.total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.0.iter()
    }

    /// Chart axis labels.
    pub fn labels(&self) -> Vec<&'static str> {
        self.0.iter().map(|t| t.label).collect()
    }

    /// Chart series, aligned with [`labels`](Self::labels).
    pub fn values(&self) -> Vec<Decimal> {
        self.0.iter().map(|t| t.total).collect()
    }
}

pub fn category_totals<'a, I>(expenses: I) -> CategoryTotals
where
    I: IntoIterator<Item = &'a Expense>,
{
    // at most six categories, a linear scan keeps first-seen order for free
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for expense in expenses {
        match totals.iter_mut().find(|t| t.category == expense.category) {
            Some(entry) => entry.total += expense.amount,
            None => totals.push(CategoryTotal {
                category: expense.category,
                label: expense.category.label(),
                total: expense.amount,
            }),
        }
    }
    CategoryTotals(totals)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BudgetFigures {
    pub spendable: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
}

impl BudgetFigures {
    // a missing budget counts as zero income and zero savings goal
    pub fn compute(budget: Option<&Budget>, total_spent: Decimal) -> Self {
        let spendable = budget.map(Budget::spendable_budget).unwrap_or(Decimal::ZERO);
        Self {
            spendable,
            total_spent,
            remaining: spendable - total_spent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub budget: Budget,
    pub expenses: Vec<Expense>,
    pub totals: CategoryTotals,
    pub figures: BudgetFigures,
}

/// Budget (created on first access), expenses newest-first, category totals
/// and derived figures for one user and month.
pub async fn month_summary(
    pool: &Pool<Sqlite>,
    user_id: i64,
    year: i32,
    month: u32,
) -> Result<MonthSummary, AppError> {
    let (from, until) = calendar::month_range(year, month)
        .ok_or_else(|| AppError::internal(format!("invalid month {year}-{month}")))?;

    let budget = queries::get_or_create_budget(pool, user_id, year, month).await?;
    let expenses = queries::expenses_between(pool, user_id, from, until).await?;
    let totals = category_totals(&expenses);
    let figures = BudgetFigures::compute(Some(&budget), totals.total());

    debug!(
        user_id,
        year,
        month,
        expenses = expenses.len(),
        "month summary computed"
    );

    Ok(MonthSummary {
        year,
        month,
        budget,
        expenses,
        totals,
        figures,
    })
}
