use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use rust_decimal::Decimal;
use std::str::FromStr;
use chrono::{NaiveDate, NaiveDateTime};

use crate::database::models::{
    Budget, BudgetUpdate, Category, Expense, NewExpense, NewReminder, NewScheduleItem, NewTodo,
    Priority, Reminder, ScheduleItem, Todo, User,
};

/*
SQLite queries for every record kind.
Each entity query takes the owning user id and filters on it, so a row that
belongs to someone else is indistinguishable from a missing row.
Amounts are stored as TEXT and read back into Decimal.
 */

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

// Unreadable or missing amounts count as zero
fn decimal_col(row: &SqliteRow, col: &str) -> Result<Decimal, sqlx::Error> {
    let text: Option<String> = row.try_get(col)?;
    Ok(text
        .and_then(|s| Decimal::from_str(s.trim()).ok())
        .unwrap_or(Decimal::ZERO))
}

fn category_col(row: &SqliteRow, col: &str) -> Result<Category, sqlx::Error> {
    let text: String = row.try_get(col)?;
    Ok(Category::from_str(&text).unwrap_or_default())
}

fn priority_col(row: &SqliteRow, col: &str) -> Result<Priority, sqlx::Error> {
    let text: String = row.try_get(col)?;
    Ok(Priority::from_str(&text).unwrap_or_default())
}

/*==========User & Session Queries=========== */

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        password_hash: row.try_get("password_hash")?,
        date_joined: row.try_get("date_joined")?,
    })
}

pub async fn create_user(
    pool: &Pool<Sqlite>,
    username: &str,
    first_name: &str,
    password_hash: &str,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO users (username, first_name, password_hash, date_joined)
        VALUES (?, ?, ?, ?)
        RETURNING user_id
        "#,
    )
    .bind(username)
    .bind(first_name)
    .bind(password_hash)
    .bind(now())
    .fetch_one(pool)
    .await?;

    row.try_get("user_id")
}

pub async fn username_exists(pool: &Pool<Sqlite>, username: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT user_id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn find_user_by_username(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT user_id, username, first_name, password_hash, date_joined
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    .map(|row| user_from_row(&row))
    .transpose()
}

pub async fn create_session(
    pool: &Pool<Sqlite>,
    token: &str,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
        .bind(token)
        .bind(user_id)
        .bind(now())
        .execute(pool)
        .await?;
    Ok(())
}

// Sessions started before `not_before` count as expired
pub async fn find_session_user(
    pool: &Pool<Sqlite>,
    token: &str,
    not_before: NaiveDateTime,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT u.user_id, u.username, u.first_name, u.password_hash, u.date_joined
        FROM sessions s
        JOIN users u ON u.user_id = s.user_id
        WHERE s.token = ? AND s.created_at >= ?
        "#,
    )
    .bind(token)
    .bind(not_before)
    .fetch_optional(pool)
    .await?
    .map(|row| user_from_row(&row))
    .transpose()
}

pub async fn delete_session(pool: &Pool<Sqlite>, token: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_sessions_before(
    pool: &Pool<Sqlite>,
    cutoff: NaiveDateTime,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE created_at < ?")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/*==========Budget Queries=========== */

fn budget_from_row(row: &SqliteRow) -> Result<Budget, sqlx::Error> {
    Ok(Budget {
        budget_id: row.try_get("budget_id")?,
        user_id: row.try_get("user_id")?,
        month: row.try_get("month")?,
        year: row.try_get("year")?,
        total_income: decimal_col(row, "total_income")?,
        savings_goal: decimal_col(row, "savings_goal")?,
    })
}

pub async fn find_budget(
    pool: &Pool<Sqlite>,
    user_id: i64,
    year: i32,
    month: u32,
) -> Result<Option<Budget>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT budget_id, user_id, month, year, total_income, savings_goal
        FROM budgets
        WHERE user_id = ? AND year = ? AND month = ?
        "#,
    )
    .bind(user_id)
    .bind(year)
    .bind(month)
    .fetch_optional(pool)
    .await?
    .map(|row| budget_from_row(&row))
    .transpose()
}

// Idempotent: the unique (user, month, year) index turns a second insert into a no-op
pub async fn get_or_create_budget(
    pool: &Pool<Sqlite>,
    user_id: i64,
    year: i32,
    month: u32,
) -> Result<Budget, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO budgets (user_id, month, year, total_income, savings_goal)
        VALUES (?, ?, ?, '0', '0')
        ON CONFLICT (user_id, month, year) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(month)
    .bind(year)
    .execute(pool)
    .await?;

    find_budget(pool, user_id, year, month)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn upsert_budget(
    pool: &Pool<Sqlite>,
    user_id: i64,
    year: i32,
    month: u32,
    update: &BudgetUpdate,
) -> Result<Budget, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO budgets (user_id, month, year, total_income, savings_goal)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (user_id, month, year)
        DO UPDATE SET total_income = excluded.total_income,
                      savings_goal = excluded.savings_goal
        RETURNING budget_id, user_id, month, year, total_income, savings_goal
        "#,
    )
    .bind(user_id)
    .bind(month)
    .bind(year)
    .bind(update.total_income.to_string())
    .bind(update.savings_goal.to_string())
    .fetch_one(pool)
    .await?;

    budget_from_row(&row)
}

/*==========Expense Queries=========== */

fn expense_from_row(row: &SqliteRow) -> Result<Expense, sqlx::Error> {
    Ok(Expense {
        expense_id: row.try_get("expense_id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        amount: decimal_col(row, "amount")?,
        category: category_col(row, "category")?,
        date: row.try_get("date")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn create_expense(
    pool: &Pool<Sqlite>,
    user_id: i64,
    expense: &NewExpense,
) -> Result<Expense, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO expenses (user_id, title, amount, category, date, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING expense_id, user_id, title, amount, category, date, created_at
        "#,
    )
    .bind(user_id)
    .bind(&expense.title)
    .bind(expense.amount.to_string())
    .bind(expense.category.as_str())
    .bind(expense.date)
    .bind(now())
    .fetch_one(pool)
    .await?;

    expense_from_row(&row)
}

// Expenses dated in [from, until), newest first
pub async fn expenses_between(
    pool: &Pool<Sqlite>,
    user_id: i64,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT expense_id, user_id, title, amount, category, date, created_at
        FROM expenses
        WHERE user_id = ? AND date >= ? AND date < ?
        ORDER BY date DESC, expense_id DESC
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await?
    .iter()
    .map(expense_from_row)
    .collect()
}

// Same range in the order the expenses were entered
pub async fn expenses_entered_between(
    pool: &Pool<Sqlite>,
    user_id: i64,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT expense_id, user_id, title, amount, category, date, created_at
        FROM expenses
        WHERE user_id = ? AND date >= ? AND date < ?
        ORDER BY expense_id ASC
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await?
    .iter()
    .map(expense_from_row)
    .collect()
}

pub async fn find_expense(
    pool: &Pool<Sqlite>,
    user_id: i64,
    expense_id: i64,
) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT expense_id, user_id, title, amount, category, date, created_at
        FROM expenses
        WHERE expense_id = ? AND user_id = ?
        "#,
    )
    .bind(expense_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .map(|row| expense_from_row(&row))
    .transpose()
}

pub async fn delete_expense(
    pool: &Pool<Sqlite>,
    user_id: i64,
    expense_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM expenses WHERE expense_id = ? AND user_id = ?")
        .bind(expense_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/*==========Todo Queries=========== */

const TODO_COLUMNS: &str = "todo_id, user_id, title, done, created_at, priority";

fn todo_from_row(row: &SqliteRow) -> Result<Todo, sqlx::Error> {
    Ok(Todo {
        todo_id: row.try_get("todo_id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        done: row.try_get("done")?,
        created_at: row.try_get("created_at")?,
        priority: priority_col(row, "priority")?,
    })
}

pub async fn create_todo(
    pool: &Pool<Sqlite>,
    user_id: i64,
    todo: &NewTodo,
    created_at: NaiveDateTime,
) -> Result<Todo, sqlx::Error> {
    let sql = format!(
        "INSERT INTO todos (user_id, title, done, created_at, priority) \
         VALUES (?, ?, 0, ?, ?) RETURNING {TODO_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(&todo.title)
        .bind(created_at)
        .bind(todo.priority.as_str())
        .fetch_one(pool)
        .await?;

    todo_from_row(&row)
}

// Latest pending todos for the dashboard
pub async fn recent_open_todos(
    pool: &Pool<Sqlite>,
    user_id: i64,
    limit: i64,
) -> Result<Vec<Todo>, sqlx::Error> {
    let sql = format!(
        "SELECT {TODO_COLUMNS} FROM todos \
         WHERE user_id = ? AND done = 0 \
         ORDER BY created_at DESC, todo_id DESC \
         LIMIT ?"
    );
    sqlx::query(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?
        .iter()
        .map(todo_from_row)
        .collect()
}

// Todos whose created_at falls in [from, until); pending ones first
pub async fn todos_created_between(
    pool: &Pool<Sqlite>,
    user_id: i64,
    from: NaiveDateTime,
    until: NaiveDateTime,
) -> Result<Vec<Todo>, sqlx::Error> {
    let sql = format!(
        "SELECT {TODO_COLUMNS} FROM todos \
         WHERE user_id = ? AND created_at >= ? AND created_at < ? \
         ORDER BY done ASC, created_at DESC, todo_id DESC"
    );
    sqlx::query(&sql)
        .bind(user_id)
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await?
        .iter()
        .map(todo_from_row)
        .collect()
}

pub async fn toggle_todo(
    pool: &Pool<Sqlite>,
    user_id: i64,
    todo_id: i64,
) -> Result<Option<Todo>, sqlx::Error> {
    let sql = format!(
        "UPDATE todos SET done = NOT done \
         WHERE todo_id = ? AND user_id = ? \
         RETURNING {TODO_COLUMNS}"
    );
    sqlx::query(&sql)
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .map(|row| todo_from_row(&row))
        .transpose()
}

pub async fn delete_todo(
    pool: &Pool<Sqlite>,
    user_id: i64,
    todo_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE todo_id = ? AND user_id = ?")
        .bind(todo_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/*==========Reminder Queries=========== */

const REMINDER_COLUMNS: &str = "reminder_id, user_id, title, due_at, is_completed, priority";

fn reminder_from_row(row: &SqliteRow) -> Result<Reminder, sqlx::Error> {
    Ok(Reminder {
        reminder_id: row.try_get("reminder_id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        due_at: row.try_get("due_at")?,
        is_completed: row.try_get("is_completed")?,
        priority: priority_col(row, "priority")?,
    })
}

pub async fn create_reminder(
    pool: &Pool<Sqlite>,
    user_id: i64,
    reminder: &NewReminder,
) -> Result<Reminder, sqlx::Error> {
    let sql = format!(
        "INSERT INTO reminders (user_id, title, due_at, is_completed, priority) \
         VALUES (?, ?, ?, 0, ?) RETURNING {REMINDER_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(&reminder.title)
        .bind(reminder.due_at)
        .bind(reminder.priority.as_str())
        .fetch_one(pool)
        .await?;

    reminder_from_row(&row)
}

// Nearest incomplete reminders, overdue ones included
pub async fn upcoming_reminders(
    pool: &Pool<Sqlite>,
    user_id: i64,
    limit: i64,
) -> Result<Vec<Reminder>, sqlx::Error> {
    let sql = format!(
        "SELECT {REMINDER_COLUMNS} FROM reminders \
         WHERE user_id = ? AND is_completed = 0 \
         ORDER BY due_at ASC, reminder_id ASC \
         LIMIT ?"
    );
    sqlx::query(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?
        .iter()
        .map(reminder_from_row)
        .collect()
}

pub async fn all_reminders(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Vec<Reminder>, sqlx::Error> {
    let sql = format!(
        "SELECT {REMINDER_COLUMNS} FROM reminders \
         WHERE user_id = ? \
         ORDER BY is_completed ASC, due_at ASC, reminder_id ASC"
    );
    sqlx::query(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?
        .iter()
        .map(reminder_from_row)
        .collect()
}

pub async fn toggle_reminder(
    pool: &Pool<Sqlite>,
    user_id: i64,
    reminder_id: i64,
) -> Result<Option<Reminder>, sqlx::Error> {
    let sql = format!(
        "UPDATE reminders SET is_completed = NOT is_completed \
         WHERE reminder_id = ? AND user_id = ? \
         RETURNING {REMINDER_COLUMNS}"
    );
    sqlx::query(&sql)
        .bind(reminder_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .map(|row| reminder_from_row(&row))
        .transpose()
}

pub async fn delete_reminder(
    pool: &Pool<Sqlite>,
    user_id: i64,
    reminder_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reminders WHERE reminder_id = ? AND user_id = ?")
        .bind(reminder_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/*==========Schedule Queries=========== */

const SCHEDULE_COLUMNS: &str = "item_id, user_id, title, date, start_time, end_time";

fn schedule_item_from_row(row: &SqliteRow) -> Result<ScheduleItem, sqlx::Error> {
    Ok(ScheduleItem {
        item_id: row.try_get("item_id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        date: row.try_get("date")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
    })
}

pub async fn create_schedule_item(
    pool: &Pool<Sqlite>,
    user_id: i64,
    date: NaiveDate,
    item: &NewScheduleItem,
) -> Result<ScheduleItem, sqlx::Error> {
    let sql = format!(
        "INSERT INTO schedule_items (user_id, title, date, start_time, end_time) \
         VALUES (?, ?, ?, ?, ?) RETURNING {SCHEDULE_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(&item.title)
        .bind(date)
        .bind(item.start_time)
        .bind(item.end_time)
        .fetch_one(pool)
        .await?;

    schedule_item_from_row(&row)
}

pub async fn schedule_for_day(
    pool: &Pool<Sqlite>,
    user_id: i64,
    date: NaiveDate,
) -> Result<Vec<ScheduleItem>, sqlx::Error> {
    let sql = format!(
        "SELECT {SCHEDULE_COLUMNS} FROM schedule_items \
         WHERE user_id = ? AND date = ? \
         ORDER BY start_time ASC, item_id ASC"
    );
    sqlx::query(&sql)
        .bind(user_id)
        .bind(date)
        .fetch_all(pool)
        .await?
        .iter()
        .map(schedule_item_from_row)
        .collect()
}

pub async fn delete_schedule_item(
    pool: &Pool<Sqlite>,
    user_id: i64,
    item_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM schedule_items WHERE item_id = ? AND user_id = ?")
        .bind(item_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
