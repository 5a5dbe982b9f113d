use serde::Serialize;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub first_name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub date_joined: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub password: String,
}
