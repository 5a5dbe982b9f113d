mod common;

use common::{create_user, date, dec, setup, time};
use personal_planner::database::db::queries;
use personal_planner::database::models::{
    BudgetUpdate, Category, NewExpense, NewReminder, NewScheduleItem, NewTodo, Priority,
};
use personal_planner::domain::{accounts, calendar};

#[tokio::test]
async fn budget_get_or_create_is_idempotent() {
    let pool = setup().await;
    let user = create_user(&pool, "alice").await;

    let first = queries::get_or_create_budget(&pool, user.user_id, 2026, 10).await.unwrap();
    let second = queries::get_or_create_budget(&pool, user.user_id, 2026, 10).await.unwrap();

    assert_eq!(first, second);
    assert!(first.total_income.is_zero());
    assert!(first.savings_goal.is_zero());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM budgets WHERE user_id = ?")
        .bind(user.user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn budget_upsert_keeps_single_row() {
    let pool = setup().await;
    let user = create_user(&pool, "alice").await;

    let created = queries::get_or_create_budget(&pool, user.user_id, 2026, 10).await.unwrap();
    let update = BudgetUpdate { total_income: dec("1000"), savings_goal: dec("200.50") };
    let updated = queries::upsert_budget(&pool, user.user_id, 2026, 10, &update).await.unwrap();

    assert_eq!(updated.budget_id, created.budget_id);
    assert_eq!(updated.total_income, dec("1000"));
    assert_eq!(updated.spendable_budget(), dec("799.50"));

    // a month never visited gets a fresh row
    let other = queries::upsert_budget(&pool, user.user_id, 2026, 11, &update).await.unwrap();
    assert_ne!(other.budget_id, created.budget_id);
}

#[tokio::test]
async fn budgets_are_per_user() {
    let pool = setup().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;

    let a = queries::get_or_create_budget(&pool, alice.user_id, 2026, 10).await.unwrap();
    let b = queries::get_or_create_budget(&pool, bob.user_id, 2026, 10).await.unwrap();
    assert_ne!(a.budget_id, b.budget_id);
}

#[tokio::test]
async fn expenses_are_scoped_to_month_and_owner() {
    let pool = setup().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;

    let add = |title: &str, amount: &str, d| NewExpense {
        title: title.to_string(),
        amount: dec(amount),
        category: Category::Food,
        date: d,
    };

    queries::create_expense(&pool, alice.user_id, &add("sep", "1", date(2026, 9, 30))).await.unwrap();
    queries::create_expense(&pool, alice.user_id, &add("early", "2", date(2026, 10, 1))).await.unwrap();
    queries::create_expense(&pool, alice.user_id, &add("late", "3", date(2026, 10, 31))).await.unwrap();
    queries::create_expense(&pool, alice.user_id, &add("nov", "4", date(2026, 11, 1))).await.unwrap();
    queries::create_expense(&pool, bob.user_id, &add("bob", "5", date(2026, 10, 10))).await.unwrap();

    let (from, until) = calendar::month_range(2026, 10).unwrap();
    let october = queries::expenses_between(&pool, alice.user_id, from, until).await.unwrap();

    let titles: Vec<_> = october.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["late", "early"]);
}

#[tokio::test]
async fn unreadable_amount_reads_as_zero() {
    let pool = setup().await;
    let user = create_user(&pool, "alice").await;

    sqlx::query(
        "INSERT INTO expenses (user_id, title, amount, category, date, created_at) \
         VALUES (?, 'broken', 'n/a', 'MYSTERY', '2026-10-02', '2026-10-02 10:00:00')",
    )
    .bind(user.user_id)
    .execute(&pool)
    .await
    .unwrap();

    let (from, until) = calendar::month_range(2026, 10).unwrap();
    let rows = queries::expenses_between(&pool, user.user_id, from, until).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].amount.is_zero());
    assert_eq!(rows[0].category, Category::Other);
}

#[tokio::test]
async fn delete_expense_requires_owner() {
    let pool = setup().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;

    let expense = queries::create_expense(
        &pool,
        alice.user_id,
        &NewExpense {
            title: "Lunch".into(),
            amount: dec("12.40"),
            category: Category::Food,
            date: date(2026, 10, 3),
        },
    )
    .await
    .unwrap();

    assert!(!queries::delete_expense(&pool, bob.user_id, expense.expense_id).await.unwrap());
    assert!(queries::find_expense(&pool, bob.user_id, expense.expense_id).await.unwrap().is_none());
    assert!(queries::delete_expense(&pool, alice.user_id, expense.expense_id).await.unwrap());
    assert!(queries::find_expense(&pool, alice.user_id, expense.expense_id).await.unwrap().is_none());
}

#[tokio::test]
async fn toggle_todo_twice_restores_state() {
    let pool = setup().await;
    let user = create_user(&pool, "alice").await;
    let new_todo = NewTodo { title: "Read chapter 3".into(), priority: Priority::Low };
    let todo = queries::create_todo(&pool, user.user_id, &new_todo, date(2026, 10, 15).and_time(time(0, 0)))
        .await
        .unwrap();
    assert!(!todo.done);

    let once = queries::toggle_todo(&pool, user.user_id, todo.todo_id).await.unwrap().unwrap();
    assert!(once.done);
    let twice = queries::toggle_todo(&pool, user.user_id, todo.todo_id).await.unwrap().unwrap();
    assert!(!twice.done);
    assert_eq!(twice.priority, Priority::Low);
}

#[tokio::test]
async fn toggle_of_foreign_todo_finds_nothing() {
    let pool = setup().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let todo = queries::create_todo(
        &pool,
        alice.user_id,
        &NewTodo { title: "Private".into(), priority: Priority::Medium },
        date(2026, 10, 15).and_time(time(0, 0)),
    )
    .await
    .unwrap();

    assert!(queries::toggle_todo(&pool, bob.user_id, todo.todo_id).await.unwrap().is_none());
    assert!(!queries::delete_todo(&pool, bob.user_id, todo.todo_id).await.unwrap());

    let (from, until) = calendar::day_bounds(date(2026, 10, 15));
    let still_there = queries::todos_created_between(&pool, alice.user_id, from, until).await.unwrap();
    assert_eq!(still_there.len(), 1);
    assert!(!still_there[0].done);
}

#[tokio::test]
async fn todos_for_day_list_pending_first() {
    let pool = setup().await;
    let user = create_user(&pool, "alice").await;
    let day = date(2026, 10, 15);

    let mk = |title: &str| NewTodo { title: title.into(), priority: Priority::Medium };
    let a = queries::create_todo(&pool, user.user_id, &mk("a"), day.and_time(time(8, 0))).await.unwrap();
    queries::create_todo(&pool, user.user_id, &mk("b"), day.and_time(time(9, 0))).await.unwrap();
    queries::create_todo(&pool, user.user_id, &mk("other day"), date(2026, 10, 16).and_time(time(0, 0)))
        .await
        .unwrap();
    queries::toggle_todo(&pool, user.user_id, a.todo_id).await.unwrap();

    let (from, until) = calendar::day_bounds(day);
    let todos = queries::todos_created_between(&pool, user.user_id, from, until).await.unwrap();
    let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "a"]);
}

#[tokio::test]
async fn reminders_order_incomplete_first_then_due() {
    let pool = setup().await;
    let user = create_user(&pool, "alice").await;

    let mk = |title: &str, d| NewReminder {
        title: title.into(),
        due_at: d,
        priority: Priority::High,
    };
    let early = queries::create_reminder(&pool, user.user_id, &mk("early", date(2026, 10, 1).and_time(time(9, 0))))
        .await
        .unwrap();
    queries::create_reminder(&pool, user.user_id, &mk("late", date(2026, 12, 1).and_time(time(9, 0))))
        .await
        .unwrap();
    queries::create_reminder(&pool, user.user_id, &mk("mid", date(2026, 11, 1).and_time(time(9, 0))))
        .await
        .unwrap();
    queries::toggle_reminder(&pool, user.user_id, early.reminder_id).await.unwrap();

    let all = queries::all_reminders(&pool, user.user_id).await.unwrap();
    let titles: Vec<_> = all.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["mid", "late", "early"]);

    let upcoming = queries::upcoming_reminders(&pool, user.user_id, 5).await.unwrap();
    let titles: Vec<_> = upcoming.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["mid", "late"]);
}

#[tokio::test]
async fn schedule_for_day_sorted_by_start() {
    let pool = setup().await;
    let user = create_user(&pool, "alice").await;
    let day = date(2026, 10, 15);

    let mk = |title: &str, s, e| NewScheduleItem { title: title.into(), start_time: s, end_time: e };
    queries::create_schedule_item(&pool, user.user_id, day, &mk("lab", time(14, 0), time(16, 0))).await.unwrap();
    queries::create_schedule_item(&pool, user.user_id, day, &mk("lecture", time(9, 0), time(10, 30))).await.unwrap();
    queries::create_schedule_item(&pool, user.user_id, date(2026, 10, 16), &mk("tomorrow", time(8, 0), time(9, 0)))
        .await
        .unwrap();

    let items = queries::schedule_for_day(&pool, user.user_id, day).await.unwrap();
    let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["lecture", "lab"]);
    assert_eq!(items[0].start_time, time(9, 0));
    assert_eq!(items[0].end_time, time(10, 30));
}

#[tokio::test]
async fn sessions_resolve_to_their_user() {
    let pool = setup().await;
    let user = create_user(&pool, "alice").await;

    let since = date(2000, 1, 1).and_time(time(0, 0));

    queries::create_session(&pool, "token-1", user.user_id).await.unwrap();
    let found = queries::find_session_user(&pool, "token-1", since).await.unwrap().unwrap();
    assert_eq!(found.user_id, user.user_id);

    assert!(queries::delete_session(&pool, "token-1").await.unwrap());
    assert!(queries::find_session_user(&pool, "token-1", since).await.unwrap().is_none());
    assert!(!queries::delete_session(&pool, "token-1").await.unwrap());
}

#[tokio::test]
async fn stale_sessions_expire_and_get_pruned() {
    let pool = setup().await;
    let user = create_user(&pool, "alice").await;

    queries::create_session(&pool, "old", user.user_id).await.unwrap();
    queries::create_session(&pool, "fresh", user.user_id).await.unwrap();
    sqlx::query("UPDATE sessions SET created_at = '2026-09-01 08:00:00' WHERE token = 'old'")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE sessions SET created_at = '2026-10-10 08:00:00' WHERE token = 'fresh'")
        .execute(&pool)
        .await
        .unwrap();

    let cutoff = accounts::session_cutoff(date(2026, 10, 15).and_time(time(12, 0)));
    assert!(queries::find_session_user(&pool, "old", cutoff).await.unwrap().is_none());
    assert!(queries::find_session_user(&pool, "fresh", cutoff).await.unwrap().is_some());

    assert_eq!(queries::delete_sessions_before(&pool, cutoff).await.unwrap(), 1);
    let left: Vec<String> = sqlx::query_scalar("SELECT token FROM sessions")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(left, vec!["fresh".to_string()]);
}

#[tokio::test]
async fn new_login_prunes_expired_sessions() {
    let pool = setup().await;
    let user = create_user(&pool, "alice").await;

    queries::create_session(&pool, "ancient", user.user_id).await.unwrap();
    sqlx::query("UPDATE sessions SET created_at = '2000-01-01 00:00:00'")
        .execute(&pool)
        .await
        .unwrap();
    assert!(accounts::session_user(&pool, "ancient").await.unwrap().is_none());

    let token = accounts::start_session(&pool, user.user_id).await.unwrap();
    let tokens: Vec<String> = sqlx::query_scalar("SELECT token FROM sessions")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(tokens, vec![token.clone()]);
    assert!(accounts::session_user(&pool, &token).await.unwrap().is_some());
}
