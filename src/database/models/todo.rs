use serde::Serialize;
use chrono::NaiveDateTime;

use super::Priority;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Todo {
    pub todo_id: i64,
    pub user_id: i64,
    pub title: String,
    pub done: bool,
    pub created_at: NaiveDateTime, // the planner day the todo belongs to
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTodo {
    pub title: String,
    pub priority: Priority,
}
