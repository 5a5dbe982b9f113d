#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use personal_planner::database::db::{connection, migrate, queries};
use personal_planner::database::models::User;
use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub async fn setup() -> Pool<Sqlite> {
    let pool = connection::memory_pool().await.expect("in-memory pool");
    migrate::run_migrations(&pool).await.expect("migrations");
    pool
}

pub async fn create_user(pool: &Pool<Sqlite>, username: &str) -> User {
    queries::create_user(pool, username, "Tester", "not-a-real-hash")
        .await
        .expect("create user");
    queries::find_user_by_username(pool, username)
        .await
        .expect("query user")
        .expect("user exists")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}
