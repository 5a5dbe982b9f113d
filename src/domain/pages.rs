//! Read-models for the dashboard, planner and expenses pages.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use tracing::{debug, instrument};

use crate::database::db::queries;
use crate::database::models::{
    category_choices, priority_choices, Budget, Category, Choice, Expense, Priority, Reminder,
    ScheduleItem, Todo, User,
};
use crate::domain::aggregation::{self, CategoryTotals};
use crate::domain::calendar;
use crate::domain::error::AppError;

pub const DASHBOARD_TODO_LIMIT: i64 = 5;
pub const DASHBOARD_REMINDER_LIMIT: i64 = 5;

/* ==========Dashboard========== */

#[derive(Debug, Clone, Serialize)]
pub struct DashboardPage {
    pub first_name: String,
    pub last_login: String,
    pub current_month_name: String,
    pub chart_labels: Vec<&'static str>,
    pub chart_data: Vec<Decimal>,
    pub category_totals: CategoryTotals,
    pub total_spent: Decimal,
    pub recent_todos: Vec<Todo>,
    pub reminders: Vec<Reminder>,
    pub todays_schedule: Vec<ScheduleItem>,
}

#[instrument(name = "pages.dashboard", skip(pool, user, last_login), fields(user_id = user.user_id))]
pub async fn dashboard(
    pool: &Pool<Sqlite>,
    user: &User,
    today: NaiveDate,
    last_login: Option<&str>,
) -> Result<DashboardPage, AppError> {
    let (from, until) = calendar::month_range(today.year(), today.month())
        .ok_or_else(|| AppError::internal(format!("no calendar month for {today}")))?;

    // chart categories follow entry order
    let expenses = queries::expenses_entered_between(pool, user.user_id, from, until).await?;
    let totals = aggregation::category_totals(&expenses);

    let recent_todos = queries::recent_open_todos(pool, user.user_id, DASHBOARD_TODO_LIMIT).await?;
    let reminders =
        queries::upcoming_reminders(pool, user.user_id, DASHBOARD_REMINDER_LIMIT).await?;
    let todays_schedule = queries::schedule_for_day(pool, user.user_id, today).await?;

    debug!(expenses = expenses.len(), "dashboard assembled");

    Ok(DashboardPage {
        first_name: user.first_name.clone(),
        last_login: last_login.unwrap_or("Never").to_string(),
        current_month_name: calendar::month_name(today.year(), today.month()),
        chart_labels: totals.labels(),
        chart_data: totals.values(),
        total_spent: totals.total(),
        category_totals: totals,
        recent_todos,
        reminders,
        todays_schedule,
    })
}

/* ==========Planner========== */

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleFormDefaults {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodoFormDefaults {
    pub view_date: NaiveDate,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderFormDefaults {
    pub due_date: NaiveDateTime,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannerPage {
    pub view_date: NaiveDate,
    pub is_today: bool,
    pub prev_day: String,
    pub next_day: String,
    pub schedule_items: Vec<ScheduleItem>,
    pub reminders: Vec<Reminder>,
    pub simple_todos: Vec<Todo>,
    pub schedule_form: ScheduleFormDefaults,
    pub todo_form: TodoFormDefaults,
    pub reminder_form: ReminderFormDefaults,
    pub priorities: Vec<Choice>,
}

/// `date_param` is the raw URL segment; anything that is not a valid ISO
/// date shows today.
#[instrument(name = "pages.planner", skip(pool))]
pub async fn planner(
    pool: &Pool<Sqlite>,
    user_id: i64,
    date_param: Option<&str>,
    today: NaiveDate,
) -> Result<PlannerPage, AppError> {
    let view_date = calendar::planner_date(date_param, today);
    let prev_day = view_date.pred_opt().unwrap_or(view_date);
    let next_day = view_date.succ_opt().unwrap_or(view_date);

    let schedule_items = queries::schedule_for_day(pool, user_id, view_date).await?;
    let reminders = queries::all_reminders(pool, user_id).await?;
    let (day_start, day_end) = calendar::day_bounds(view_date);
    let simple_todos = queries::todos_created_between(pool, user_id, day_start, day_end).await?;

    Ok(PlannerPage {
        view_date,
        is_today: view_date == today,
        prev_day: calendar::iso(&prev_day),
        next_day: calendar::iso(&next_day),
        schedule_items,
        reminders,
        simple_todos,
        schedule_form: ScheduleFormDefaults { date: view_date },
        todo_form: TodoFormDefaults {
            view_date,
            priority: Priority::default(),
        },
        reminder_form: ReminderFormDefaults {
            due_date: view_date.and_time(NaiveTime::MIN),
            priority: Priority::default(),
        },
        priorities: priority_choices(),
    })
}

/* ==========Expenses========== */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetFormDefaults {
    pub year: i32,
    pub month: u32,
    pub total_income: Decimal,
    pub savings_goal: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseFormDefaults {
    pub date: NaiveDate,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpensesPage {
    pub budget: Budget,
    pub expenses: Vec<Expense>,
    pub spendable: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
    pub budget_form: BudgetFormDefaults,
    pub expense_form: ExpenseFormDefaults,
    pub month_name: String,
    pub current_year: i32,
    pub current_month: u32,
    pub prev_month: MonthRef,
    pub next_month: MonthRef,
    pub chart_labels: Vec<&'static str>,
    pub chart_data: Vec<Decimal>,
    pub category_totals: CategoryTotals,
    pub categories: Vec<Choice>,
}

#[instrument(name = "pages.expenses", skip(pool))]
pub async fn expenses(
    pool: &Pool<Sqlite>,
    user_id: i64,
    year: Option<&str>,
    month: Option<&str>,
    today: NaiveDate,
) -> Result<ExpensesPage, AppError> {
    let (year, month) = calendar::resolve_year_month(year, month, today);
    let summary = aggregation::month_summary(pool, user_id, year, month).await?;

    let first_of_month = calendar::month_start(year, month).unwrap_or(today);
    let (prev_year, prev_month) = calendar::shift_month(year, month, -1);
    let (next_year, next_month) = calendar::shift_month(year, month, 1);

    Ok(ExpensesPage {
        budget_form: BudgetFormDefaults {
            year,
            month,
            total_income: summary.budget.total_income,
            savings_goal: summary.budget.savings_goal,
        },
        expense_form: ExpenseFormDefaults {
            date: first_of_month,
            category: Category::default(),
        },
        month_name: calendar::month_name(year, month),
        current_year: year,
        current_month: month,
        prev_month: MonthRef { year: prev_year, month: prev_month },
        next_month: MonthRef { year: next_year, month: next_month },
        chart_labels: summary.totals.labels(),
        chart_data: summary.totals.values(),
        spendable: summary.figures.spendable,
        total_spent: summary.figures.total_spent,
        remaining: summary.figures.remaining,
        category_totals: summary.totals,
        budget: summary.budget,
        expenses: summary.expenses,
        categories: category_choices(),
    })
}
