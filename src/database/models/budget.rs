use serde::Serialize;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub budget_id: i64,
    pub user_id: i64,
    pub month: u32,
    pub year: i32,
    pub total_income: Decimal,
    pub savings_goal: Decimal,
}

impl Budget {
    // income minus what the user wants to put aside
    pub fn spendable_budget(&self) -> Decimal {
        self.total_income - self.savings_goal
    }
}

// Validated budget fields coming from the update form
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetUpdate {
    pub total_income: Decimal,
    pub savings_goal: Decimal,
}
