use serde::Serialize;
use chrono::NaiveDateTime;

use super::Priority;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub reminder_id: i64,
    pub user_id: i64,
    pub title: String,
    pub due_at: NaiveDateTime,
    pub is_completed: bool,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub title: String,
    pub due_at: NaiveDateTime,
    pub priority: Priority,
}
