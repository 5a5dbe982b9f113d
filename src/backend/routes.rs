use axum::{
    routing::{get, post},
    Router,
};
use crate::backend::{auth, handlers, AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
}

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/planner/", get(handlers::planner_today))
        .route("/planner/{date}", get(handlers::planner_for_date))
        .route("/planner/{date}/", get(handlers::planner_for_date))
        .route("/expenses/", get(handlers::expenses))
}

pub fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/update-budget/", post(handlers::update_budget))
        .route("/add-expense/", post(handlers::add_expense))
        .route("/delete-expense/{id}", post(handlers::delete_expense))
        .route("/add-schedule/", post(handlers::add_schedule))
        .route("/delete-schedule/{id}", post(handlers::delete_schedule))
        .route("/add-todo/", post(handlers::add_todo))
        .route("/delete-todo/{id}", post(handlers::delete_todo))
        .route("/toggle-todo/{id}", post(handlers::toggle_todo))
        .route("/add-reminder/", post(handlers::add_reminder))
        .route("/delete-reminder/{id}", post(handlers::delete_reminder))
        .route("/toggle-reminder/{id}", post(handlers::toggle_reminder))
}
