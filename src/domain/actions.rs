//! Create / update / delete / toggle operations.
//!
//! Every action resolves to an [`ActionOutcome`]: where to send the user next
//! and which flash messages to show there. Validation failures are outcomes,
//! not errors. A record that is missing or owned by someone else is
//! [`AppError::NotFound`] and nothing is touched.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument, warn};

use crate::database::db::queries;
use crate::domain::calendar;
use crate::domain::error::AppError;
use crate::domain::validation::{
    BudgetForm, ExpenseForm, FieldErrors, ReminderForm, ScheduleForm, TodoForm,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: Level::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: Level::Error, text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub location: String,
    pub messages: Vec<FlashMessage>,
}

impl ActionOutcome {
    pub fn to(location: impl Into<String>) -> Self {
        Self { location: location.into(), messages: Vec::new() }
    }

    pub fn with_message(mut self, message: FlashMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_errors(mut self, errors: &FieldErrors) -> Self {
        self.messages
            .extend(errors.messages().into_iter().map(FlashMessage::error));
        self
    }

    pub fn is_rejected(&self) -> bool {
        self.messages.iter().any(|m| m.level == Level::Error)
    }
}

/* ==========navigation========== */

pub fn planner_url(date: NaiveDate) -> String {
    format!("/planner/{}", calendar::iso(&date))
}

pub fn expenses_url(year: i32, month: u32) -> String {
    format!("/expenses/?year={year}&month={month}")
}

/// Best-effort "go back": the path and query of the referring page, or
/// today's planner when there is no usable referer. Only the path is kept so
/// a foreign host in the header never becomes a redirect target.
pub fn back_or_planner(referer: Option<&str>, today: NaiveDate) -> String {
    referer
        .and_then(referer_path)
        .unwrap_or_else(|| planner_url(today))
}

fn referer_path(referer: &str) -> Option<String> {
    let referer = referer.trim();
    if referer.starts_with('/') {
        return local_path(referer).then(|| referer.to_string());
    }
    let url = url::Url::parse(referer).ok()?;
    if !matches!(url.scheme(), "http" | "https") || !local_path(url.path()) {
        return None;
    }
    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    Some(path)
}

// `//host` and `/\host` are read by browsers as another origin
fn local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

fn view_date_or_today(raw: &str, today: NaiveDate) -> NaiveDate {
    calendar::parse_iso_date(raw).unwrap_or(today)
}

/* ==========Budget & Expenses========== */

#[instrument(name = "actions.update_budget", skip(pool, form))]
pub async fn update_budget(
    pool: &Pool<Sqlite>,
    user_id: i64,
    form: &BudgetForm,
    today: NaiveDate,
) -> Result<ActionOutcome, AppError> {
    let (year, month) =
        calendar::resolve_year_month(Some(form.year.as_str()), Some(form.month.as_str()), today);
    let outcome = ActionOutcome::to(expenses_url(year, month));

    match form.validate() {
        Ok(update) => {
            let budget = queries::upsert_budget(pool, user_id, year, month, &update).await?;
            info!(budget_id = budget.budget_id, year, month, "budget updated");
            Ok(outcome)
        }
        Err(errors) => Ok(outcome.with_errors(&errors)),
    }
}

#[instrument(name = "actions.add_expense", skip(pool, form))]
pub async fn add_expense(
    pool: &Pool<Sqlite>,
    user_id: i64,
    form: &ExpenseForm,
    today: NaiveDate,
) -> Result<ActionOutcome, AppError> {
    match form.validate() {
        Ok(new_expense) => {
            let expense = queries::create_expense(pool, user_id, &new_expense).await?;
            info!(expense_id = expense.expense_id, amount = %expense.amount, "expense added");
            Ok(ActionOutcome::to(expenses_url(
                expense.date.year(),
                expense.date.month(),
            )))
        }
        Err(errors) => {
            // back to the month the user was entering, if the date was readable
            let month = calendar::parse_iso_date(&form.date).unwrap_or(today);
            Ok(ActionOutcome::to(expenses_url(month.year(), month.month())).with_errors(&errors))
        }
    }
}

#[instrument(name = "actions.delete_expense", skip(pool))]
pub async fn delete_expense(
    pool: &Pool<Sqlite>,
    user_id: i64,
    expense_id: i64,
) -> Result<ActionOutcome, AppError> {
    let Some(expense) = queries::find_expense(pool, user_id, expense_id).await? else {
        warn!("expense missing or not owned by user");
        return Err(AppError::not_found("expense", expense_id));
    };

    queries::delete_expense(pool, user_id, expense_id).await?;
    info!("expense deleted");
    Ok(ActionOutcome::to(expenses_url(
        expense.date.year(),
        expense.date.month(),
    )))
}

/* ==========Schedule========== */

#[instrument(name = "actions.add_schedule", skip(pool, form))]
pub async fn add_schedule(
    pool: &Pool<Sqlite>,
    user_id: i64,
    form: &ScheduleForm,
    today: NaiveDate,
) -> Result<ActionOutcome, AppError> {
    let view_date = view_date_or_today(&form.view_date, today);
    let outcome = ActionOutcome::to(planner_url(view_date));

    if let Some(message) = form.precheck_time_order() {
        return Ok(outcome.with_message(FlashMessage::error(message)));
    }

    match form.validate() {
        Ok(item) => {
            let saved = queries::create_schedule_item(pool, user_id, view_date, &item).await?;
            info!(item_id = saved.item_id, date = %view_date, "schedule item added");
            Ok(outcome)
        }
        Err(errors) => Ok(outcome.with_errors(&errors)),
    }
}

#[instrument(name = "actions.delete_schedule", skip(pool, referer))]
pub async fn delete_schedule(
    pool: &Pool<Sqlite>,
    user_id: i64,
    item_id: i64,
    referer: Option<&str>,
    today: NaiveDate,
) -> Result<ActionOutcome, AppError> {
    if !queries::delete_schedule_item(pool, user_id, item_id).await? {
        warn!("schedule item missing or not owned by user");
        return Err(AppError::not_found("schedule item", item_id));
    }
    info!("schedule item deleted");
    Ok(ActionOutcome::to(back_or_planner(referer, today)))
}

/* ==========Todos========== */

#[instrument(name = "actions.add_todo", skip(pool, form))]
pub async fn add_todo(
    pool: &Pool<Sqlite>,
    user_id: i64,
    form: &TodoForm,
    today: NaiveDate,
) -> Result<ActionOutcome, AppError> {
    let view_date = view_date_or_today(&form.view_date, today);
    let outcome = ActionOutcome::to(planner_url(view_date));

    match form.validate() {
        Ok(new_todo) => {
            // stamped with the planner day so it is listed there
            let created_at = view_date.and_time(NaiveTime::MIN);
            let todo = queries::create_todo(pool, user_id, &new_todo, created_at).await?;
            info!(todo_id = todo.todo_id, "todo added");
            Ok(outcome)
        }
        Err(errors) => Ok(outcome.with_errors(&errors)),
    }
}

#[instrument(name = "actions.toggle_todo", skip(pool, referer))]
pub async fn toggle_todo(
    pool: &Pool<Sqlite>,
    user_id: i64,
    todo_id: i64,
    referer: Option<&str>,
    today: NaiveDate,
) -> Result<ActionOutcome, AppError> {
    let Some(todo) = queries::toggle_todo(pool, user_id, todo_id).await? else {
        warn!("todo missing or not owned by user");
        return Err(AppError::not_found("todo", todo_id));
    };
    info!(done = todo.done, "todo toggled");
    Ok(ActionOutcome::to(back_or_planner(referer, today)))
}

#[instrument(name = "actions.delete_todo", skip(pool, referer))]
pub async fn delete_todo(
    pool: &Pool<Sqlite>,
    user_id: i64,
    todo_id: i64,
    referer: Option<&str>,
    today: NaiveDate,
) -> Result<ActionOutcome, AppError> {
    if !queries::delete_todo(pool, user_id, todo_id).await? {
        warn!("todo missing or not owned by user");
        return Err(AppError::not_found("todo", todo_id));
    }
    info!("todo deleted");
    Ok(ActionOutcome::to(back_or_planner(referer, today)))
}

/* ==========Reminders========== */

#[instrument(name = "actions.add_reminder", skip(pool, form))]
pub async fn add_reminder(
    pool: &Pool<Sqlite>,
    user_id: i64,
    form: &ReminderForm,
    today: NaiveDate,
) -> Result<ActionOutcome, AppError> {
    let view_date = view_date_or_today(&form.view_date, today);
    let outcome = ActionOutcome::to(planner_url(view_date));

    match form.validate() {
        Ok(new_reminder) => {
            let reminder = queries::create_reminder(pool, user_id, &new_reminder).await?;
            info!(reminder_id = reminder.reminder_id, "reminder added");
            Ok(outcome)
        }
        Err(errors) => Ok(outcome.with_errors(&errors)),
    }
}

#[instrument(name = "actions.toggle_reminder", skip(pool, referer))]
pub async fn toggle_reminder(
    pool: &Pool<Sqlite>,
    user_id: i64,
    reminder_id: i64,
    referer: Option<&str>,
    today: NaiveDate,
) -> Result<ActionOutcome, AppError> {
    let Some(reminder) = queries::toggle_reminder(pool, user_id, reminder_id).await? else {
        warn!("reminder missing or not owned by user");
        return Err(AppError::not_found("reminder", reminder_id));
    };
    info!(is_completed = reminder.is_completed, "reminder toggled");
    Ok(ActionOutcome::to(back_or_planner(referer, today)))
}

#[instrument(name = "actions.delete_reminder", skip(pool, referer))]
pub async fn delete_reminder(
    pool: &Pool<Sqlite>,
    user_id: i64,
    reminder_id: i64,
    referer: Option<&str>,
    today: NaiveDate,
) -> Result<ActionOutcome, AppError> {
    if !queries::delete_reminder(pool, user_id, reminder_id).await? {
        warn!("reminder missing or not owned by user");
        return Err(AppError::not_found("reminder", reminder_id));
    }
    info!("reminder deleted");
    Ok(ActionOutcome::to(back_or_planner(referer, today)))
}
