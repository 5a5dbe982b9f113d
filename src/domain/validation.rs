//! Form parsing and field rules.
//!
//! Every form arrives as raw strings. `validate()` either returns the typed
//! value ready for the record store or a [`FieldErrors`] map; nothing is
//! written when validation fails.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::models::{
    BudgetUpdate, Category, NewExpense, NewReminder, NewScheduleItem, NewTodo, NewUser, Priority,
};

pub const REQUIRED: &str = "This field is required.";
pub const END_BEFORE_START: &str = "End time must be after start time.";

const MAX_INTEGER_DIGITS: u32 = 8;
const MAX_DECIMAL_PLACES: u32 = 2;
const MIN_PASSWORD_LEN: usize = 8;

/// Field name → first error message for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    // keep the first message per field
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Flattened for flash display, e.g. `amount: Amount must be greater than zero.`
    pub fn messages(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect()
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/* ==========field helpers========== */

fn required<'a>(errors: &mut FieldErrors, field: &'static str, raw: &'a str) -> Option<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, REQUIRED);
        None
    } else {
        Some(trimmed)
    }
}

fn text(errors: &mut FieldErrors, field: &'static str, raw: &str, max_len: usize) -> String {
    let Some(value) = required(errors, field, raw) else {
        return String::new();
    };
    let len = value.chars().count();
    if len > max_len {
        errors.add(
            field,
            format!("Ensure this value has at most {max_len} characters (it has {len})."),
        );
    }
    value.to_string()
}

pub fn parse_money(s: &str) -> Option<Decimal> {
    Decimal::from_str_exact(s.trim()).ok()
}

// Money columns hold at most 10 digits, 2 of them after the point
fn money(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<Decimal> {
    let value = required(errors, field, raw)?;
    let Some(amount) = parse_money(value) else {
        errors.add(field, "Enter a number.");
        return None;
    };
    let amount = amount.normalize();
    if amount.scale() > MAX_DECIMAL_PLACES {
        errors.add(
            field,
            format!("Ensure that there are no more than {MAX_DECIMAL_PLACES} decimal places."),
        );
        return None;
    }
    if amount.abs().trunc() >= Decimal::from(10u64.pow(MAX_INTEGER_DIGITS)) {
        errors.add(
            field,
            format!("Ensure that there are no more than {MAX_INTEGER_DIGITS} digits before the decimal point."),
        );
        return None;
    }
    Some(amount)
}

pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn choice<T: FromStr>(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<T> {
    let value = required(errors, field, raw)?;
    match T::from_str(value) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.add(
                field,
                format!("Select a valid choice. {value} is not one of the available choices."),
            );
            None
        }
    }
}

/* ==========Budget========== */

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BudgetForm {
    pub year: String,
    pub month: String,
    pub total_income: String,
    pub savings_goal: String,
}

impl BudgetForm {
    pub fn validate(&self) -> Result<BudgetUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();

        let total_income = money(&mut errors, "total_income", &self.total_income);
        if total_income.is_some_and(|v| v < Decimal::ZERO) {
            errors.add("total_income", "Income cannot be negative.");
        }

        let savings_goal = money(&mut errors, "savings_goal", &self.savings_goal);
        if savings_goal.is_some_and(|v| v < Decimal::ZERO) {
            errors.add("savings_goal", "Savings goal cannot be negative.");
        }

        errors.finish(|| BudgetUpdate {
            total_income: total_income.unwrap_or_default(),
            savings_goal: savings_goal.unwrap_or_default(),
        })
    }
}

/* ==========Expense========== */

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExpenseForm {
    pub title: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl ExpenseForm {
    pub fn validate(&self) -> Result<NewExpense, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = text(&mut errors, "title", &self.title, 100);

        let amount = money(&mut errors, "amount", &self.amount);
        if amount.is_some_and(|v| v <= Decimal::ZERO) {
            errors.add("amount", "Amount must be greater than zero.");
        }

        let category: Option<Category> = choice(&mut errors, "category", &self.category);

        let date = required(&mut errors, "date", &self.date).and_then(|raw| {
            let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
            if parsed.is_none() {
                errors.add("date", "Enter a valid date.");
            }
            parsed
        });

        errors.finish(|| NewExpense {
            title,
            amount: amount.unwrap_or_default(),
            category: category.unwrap_or_default(),
            date: date.unwrap_or(NaiveDate::MIN),
        })
    }
}

/* ==========Todo========== */

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TodoForm {
    pub title: String,
    pub priority: String,
    pub view_date: String,
}

impl TodoForm {
    pub fn validate(&self) -> Result<NewTodo, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = text(&mut errors, "title", &self.title, 200);

        // optional on this form
        let priority = if self.priority.trim().is_empty() {
            Some(Priority::default())
        } else {
            choice(&mut errors, "priority", &self.priority)
        };

        errors.finish(|| NewTodo {
            title,
            priority: priority.unwrap_or_default(),
        })
    }
}

/* ==========Reminder========== */

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReminderForm {
    pub title: String,
    pub due_date: String,
    pub priority: String,
    pub view_date: String,
}

impl ReminderForm {
    pub fn validate(&self) -> Result<NewReminder, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = text(&mut errors, "title", &self.title, 200);

        let due_at = required(&mut errors, "due_date", &self.due_date).and_then(|raw| {
            let parsed = parse_datetime(raw);
            if parsed.is_none() {
                errors.add("due_date", "Enter a valid date/time.");
            }
            parsed
        });

        let priority: Option<Priority> = choice(&mut errors, "priority", &self.priority);

        errors.finish(|| NewReminder {
            title,
            due_at: due_at.unwrap_or(NaiveDateTime::MIN),
            priority: priority.unwrap_or_default(),
        })
    }
}

/* ==========Schedule========== */

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleForm {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub view_date: String,
}

impl ScheduleForm {
    /// Freeform check on the raw time strings, run before full validation.
    /// Only fires when both values parse.
    pub fn precheck_time_order(&self) -> Option<&'static str> {
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;
        (end <= start).then_some(END_BEFORE_START)
    }

    pub fn validate(&self) -> Result<NewScheduleItem, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = text(&mut errors, "title", &self.title, 200);

        let mut time_field = |field: &'static str, raw: &str| {
            required(&mut errors, field, raw).and_then(|value| {
                let parsed = parse_time(value);
                if parsed.is_none() {
                    errors.add(field, "Enter a valid time.");
                }
                parsed
            })
        };
        let start_time = time_field("start_time", &self.start_time);
        let end_time = time_field("end_time", &self.end_time);

        if let (Some(start), Some(end)) = (start_time, end_time) {
            if end <= start {
                errors.add("end_time", END_BEFORE_START);
            }
        }

        errors.finish(|| NewScheduleItem {
            title,
            start_time: start_time.unwrap_or(NaiveTime::MIN),
            end_time: end_time.unwrap_or(NaiveTime::MIN),
        })
    }
}

/* ==========Accounts========== */

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub first_name: String,
    pub username: String,
    pub password1: String,
    pub password2: String,
}

impl RegisterForm {
    // username uniqueness needs the store and is checked by the caller
    pub fn validate(&self) -> Result<NewUser, FieldErrors> {
        let mut errors = FieldErrors::new();

        let first_name = text(&mut errors, "first_name", &self.first_name, 150);

        let username = text(&mut errors, "username", &self.username, 150);
        if !username.is_empty()
            && !username
                .chars()
                .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        } else if self.password1.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password1",
                format!("This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."),
            );
        } else if self.password1.chars().all(|c| c.is_ascii_digit()) {
            errors.add("password1", "This password is entirely numeric.");
        }

        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.finish(|| NewUser {
            username,
            first_name,
            password: self.password1.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(amount: &str) -> ExpenseForm {
        ExpenseForm {
            title: "Coffee".into(),
            amount: amount.into(),
            category: "FOOD".into(),
            date: "2026-10-15".into(),
        }
    }

    fn schedule(start: &str, end: &str) -> ScheduleForm {
        ScheduleForm {
            title: "Lecture".into(),
            start_time: start.into(),
            end_time: end.into(),
            view_date: "2026-10-15".into(),
        }
    }

    #[test]
    fn expense_amount_boundary() {
        let ok = expense("0.01").validate().unwrap();
        assert_eq!(ok.amount, Decimal::new(1, 2));
        assert_eq!(ok.category, Category::Food);

        for bad in ["0", "-0.01", "0.00", "-5"] {
            let err = expense(bad).validate().unwrap_err();
            assert_eq!(err.get("amount"), Some("Amount must be greater than zero."), "{bad}");
        }
    }

    #[test]
    fn expense_rejects_garbage_fields() {
        let form = ExpenseForm {
            title: "   ".into(),
            amount: "ten".into(),
            category: "RENT".into(),
            date: "15/10/2026".into(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.get("title"), Some(REQUIRED));
        assert_eq!(err.get("amount"), Some("Enter a number."));
        assert!(err.contains("category"));
        assert_eq!(err.get("date"), Some("Enter a valid date."));
        assert_eq!(err.len(), 4);
    }

    #[test]
    fn expense_amount_precision_limits() {
        assert!(expense("12.345").validate().unwrap_err().contains("amount"));
        assert!(expense("123456789").validate().unwrap_err().contains("amount"));
        assert_eq!(expense("12.50").validate().unwrap().amount, Decimal::new(125, 1));
        assert!(expense("99999999.99").validate().is_ok());
    }

    #[test]
    fn expense_title_length() {
        let mut form = expense("3");
        form.title = "x".repeat(101);
        assert!(form.validate().unwrap_err().contains("title"));
        form.title = "x".repeat(100);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn budget_rejects_negative_values() {
        let form = BudgetForm {
            total_income: "-1".into(),
            savings_goal: "-0.5".into(),
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.get("total_income"), Some("Income cannot be negative."));
        assert_eq!(err.get("savings_goal"), Some("Savings goal cannot be negative."));
    }

    #[test]
    fn budget_accepts_zero() {
        let form = BudgetForm {
            total_income: "0".into(),
            savings_goal: "0.00".into(),
            ..Default::default()
        };
        let update = form.validate().unwrap();
        assert!(update.total_income.is_zero());
        assert!(update.savings_goal.is_zero());
    }

    #[test]
    fn schedule_end_must_follow_start() {
        for (start, end) in [("10:00", "10:00"), ("10:00", "09:59"), ("23:00", "01:00")] {
            let form = schedule(start, end);
            assert_eq!(form.precheck_time_order(), Some(END_BEFORE_START));
            assert_eq!(form.validate().unwrap_err().get("end_time"), Some(END_BEFORE_START));
        }

        let ok = schedule("09:00", "10:30:00").validate().unwrap();
        assert_eq!(ok.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(ok.end_time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn schedule_precheck_ignores_unparseable_times() {
        let form = schedule("nine", "10:00");
        assert_eq!(form.precheck_time_order(), None);
        assert_eq!(form.validate().unwrap_err().get("start_time"), Some("Enter a valid time."));
    }

    #[test]
    fn reminder_accepts_datetime_local() {
        let form = ReminderForm {
            title: "Pay rent".into(),
            due_date: "2026-11-01T09:30".into(),
            priority: "HIGH".into(),
            view_date: String::new(),
        };
        let r = form.validate().unwrap();
        assert_eq!(r.due_at.to_string(), "2026-11-01 09:30:00");
        assert_eq!(r.priority, Priority::High);
    }

    #[test]
    fn reminder_requires_priority() {
        let form = ReminderForm {
            title: "Pay rent".into(),
            due_date: "2026-11-01".into(),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap_err().get("priority"), Some(REQUIRED));
    }

    #[test]
    fn todo_priority_defaults_to_medium() {
        let form = TodoForm { title: "Read".into(), ..Default::default() };
        assert_eq!(form.validate().unwrap().priority, Priority::Medium);

        let form = TodoForm { title: "Read".into(), priority: "urgent".into(), ..Default::default() };
        assert!(form.validate().unwrap_err().contains("priority"));
    }

    #[test]
    fn register_password_rules() {
        let base = RegisterForm {
            first_name: "Sam".into(),
            username: "sam".into(),
            password1: "correct-horse".into(),
            password2: "correct-horse".into(),
        };
        assert!(base.validate().is_ok());

        let short = RegisterForm { password1: "abc".into(), password2: "abc".into(), ..base.clone() };
        assert!(short.validate().unwrap_err().contains("password1"));

        let numeric = RegisterForm { password1: "12345678".into(), password2: "12345678".into(), ..base.clone() };
        assert_eq!(
            numeric.validate().unwrap_err().get("password1"),
            Some("This password is entirely numeric.")
        );

        let mismatch = RegisterForm { password2: "other-horse".into(), ..base.clone() };
        assert!(mismatch.validate().unwrap_err().contains("password2"));

        let bad_name = RegisterForm { username: "sam smith".into(), ..base };
        assert!(bad_name.validate().unwrap_err().contains("username"));
    }

    #[test]
    fn messages_are_prefixed_by_field() {
        let mut errors = FieldErrors::new();
        errors.add("amount", "Amount must be greater than zero.");
        errors.add("amount", "ignored");
        assert_eq!(errors.messages(), vec!["amount: Amount must be greater than zero.".to_string()]);
    }
}
