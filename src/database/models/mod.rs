pub mod budget;
pub mod category;
pub mod expense;
pub mod priority;
pub mod reminder;
pub mod schedule_item;
pub mod todo;
pub mod user;

pub use budget::{Budget, BudgetUpdate};
pub use category::Category;
pub use expense::{Expense, NewExpense};
pub use priority::Priority;
pub use reminder::{NewReminder, Reminder};
pub use schedule_item::{NewScheduleItem, ScheduleItem};
pub use todo::{NewTodo, Todo};
pub use user::{NewUser, User};

use serde::Serialize;

/// One option of a select box (`value` is what the form posts back).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn category_choices() -> Vec<Choice> {
    Category::ALL
        .iter()
        .map(|c| Choice { value: c.as_str(), label: c.label() })
        .collect()
}

pub fn priority_choices() -> Vec<Choice> {
    Priority::ALL
        .iter()
        .map(|p| Choice { value: p.as_str(), label: p.label() })
        .collect()
}
