use serde::Serialize;
use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleItem {
    pub item_id: i64,
    pub user_id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

// end_time is strictly after start_time once validated
#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduleItem {
    pub title: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
