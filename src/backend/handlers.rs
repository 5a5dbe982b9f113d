// src/backend/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::{header::REFERER, HeaderMap},
    response::Redirect,
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::backend::auth::{CurrentUser, LAST_LOGIN_COOKIE};
use crate::backend::{flash, AppState, Page};
use crate::domain::actions::{self, ActionOutcome};
use crate::domain::calendar;
use crate::domain::pages::{self, DashboardPage, ExpensesPage, PlannerPage};
use crate::domain::validation::{BudgetForm, ExpenseForm, ReminderForm, ScheduleForm, TodoForm};
use crate::domain::AppError;

type PageResult<T> = Result<(CookieJar, Json<Page<T>>), AppError>;
type ActionResult = Result<(CookieJar, Redirect), AppError>;

fn referer(headers: &HeaderMap) -> Option<&str> {
    headers.get(REFERER).and_then(|v| v.to_str().ok())
}

fn finish(jar: CookieJar, outcome: ActionOutcome) -> ActionResult {
    Ok(flash::redirect(jar, outcome))
}

/*==========Pages=========== */

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> PageResult<DashboardPage> {
    let last_login = jar.get(LAST_LOGIN_COOKIE).map(|c| c.value().to_owned());
    let body = pages::dashboard(&state.db, &user, calendar::today(), last_login.as_deref()).await?;
    let (jar, messages) = flash::take(jar);
    Ok((jar, Json(Page::new(messages, body))))
}

pub async fn planner_today(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> PageResult<PlannerPage> {
    let body = pages::planner(&state.db, user.user_id, None, calendar::today()).await?;
    let (jar, messages) = flash::take(jar);
    Ok((jar, Json(Page::new(messages, body))))
}

pub async fn planner_for_date(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(date): Path<String>,
    jar: CookieJar,
) -> PageResult<PlannerPage> {
    let body = pages::planner(&state.db, user.user_id, Some(&date), calendar::today()).await?;
    let (jar, messages) = flash::take(jar);
    Ok((jar, Json(Page::new(messages, body))))
}

// Kept as raw strings so malformed values fall back instead of rejecting
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

pub async fn expenses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MonthQuery>,
    jar: CookieJar,
) -> PageResult<ExpensesPage> {
    let body = pages::expenses(
        &state.db,
        user.user_id,
        query.year.as_deref(),
        query.month.as_deref(),
        calendar::today(),
    )
    .await?;
    let (jar, messages) = flash::take(jar);
    Ok((jar, Json(Page::new(messages, body))))
}

/*==========Budget & Expenses=========== */

pub async fn update_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<BudgetForm>,
) -> ActionResult {
    let outcome = actions::update_budget(&state.db, user.user_id, &form, calendar::today()).await?;
    finish(jar, outcome)
}

pub async fn add_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<ExpenseForm>,
) -> ActionResult {
    let outcome = actions::add_expense(&state.db, user.user_id, &form, calendar::today()).await?;
    finish(jar, outcome)
}

pub async fn delete_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> ActionResult {
    let outcome = actions::delete_expense(&state.db, user.user_id, id).await?;
    finish(jar, outcome)
}

/*==========Schedule=========== */

pub async fn add_schedule(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<ScheduleForm>,
) -> ActionResult {
    let outcome = actions::add_schedule(&state.db, user.user_id, &form, calendar::today()).await?;
    finish(jar, outcome)
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
    jar: CookieJar,
) -> ActionResult {
    let outcome =
        actions::delete_schedule(&state.db, user.user_id, id, referer(&headers), calendar::today())
            .await?;
    finish(jar, outcome)
}

/*==========Todos=========== */

pub async fn add_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<TodoForm>,
) -> ActionResult {
    let outcome = actions::add_todo(&state.db, user.user_id, &form, calendar::today()).await?;
    finish(jar, outcome)
}

pub async fn toggle_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
    jar: CookieJar,
) -> ActionResult {
    let outcome =
        actions::toggle_todo(&state.db, user.user_id, id, referer(&headers), calendar::today())
            .await?;
    finish(jar, outcome)
}

pub async fn delete_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
    jar: CookieJar,
) -> ActionResult {
    let outcome =
        actions::delete_todo(&state.db, user.user_id, id, referer(&headers), calendar::today())
            .await?;
    finish(jar, outcome)
}

/*==========Reminders=========== */

pub async fn add_reminder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<ReminderForm>,
) -> ActionResult {
    let outcome = actions::add_reminder(&state.db, user.user_id, &form, calendar::today()).await?;
    finish(jar, outcome)
}

pub async fn toggle_reminder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
    jar: CookieJar,
) -> ActionResult {
    let outcome =
        actions::toggle_reminder(&state.db, user.user_id, id, referer(&headers), calendar::today())
            .await?;
    finish(jar, outcome)
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
    jar: CookieJar,
) -> ActionResult {
    let outcome =
        actions::delete_reminder(&state.db, user.user_id, id, referer(&headers), calendar::today())
            .await?;
    finish(jar, outcome)
}
