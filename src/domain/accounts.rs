//! Registration, credential checks and session bookkeeping.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, NaiveDateTime};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::database::db::queries;
use crate::database::models::User;
use crate::domain::actions::{ActionOutcome, FlashMessage};
use crate::domain::error::AppError;
use crate::domain::validation::{LoginForm, RegisterForm};

pub const LOGIN_FAILED: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const SESSION_TTL_DAYS: i64 = 14;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// argon2 is deliberately slow; keep it off the async worker threads
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("blocking task failed: {e}")))
}

#[instrument(name = "accounts.register", skip(pool, form), fields(username = %form.username.trim()))]
pub async fn register(pool: &Pool<Sqlite>, form: &RegisterForm) -> Result<ActionOutcome, AppError> {
    let back = ActionOutcome::to("/register");

    let new_user = match form.validate() {
        Ok(user) => user,
        Err(errors) => return Ok(back.with_errors(&errors)),
    };

    if queries::username_exists(pool, &new_user.username).await? {
        return Ok(back.with_message(FlashMessage::error(format!("username: {USERNAME_TAKEN}"))));
    }

    let password = new_user.password.clone();
    let password_hash = blocking(move || hash_password(&password)).await??;

    match queries::create_user(pool, &new_user.username, &new_user.first_name, &password_hash).await
    {
        Ok(user_id) => {
            info!(user_id, "account created");
            Ok(ActionOutcome::to("/login")
                .with_message(FlashMessage::success("Account created! Please login.")))
        }
        // lost a race against another registration with the same name
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Ok(back.with_message(FlashMessage::error(format!("username: {USERNAME_TAKEN}"))))
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns the user when the credentials match, `None` otherwise.
#[instrument(name = "accounts.authenticate", skip(pool, form), fields(username = %form.username.trim()))]
pub async fn authenticate(pool: &Pool<Sqlite>, form: &LoginForm) -> Result<Option<User>, AppError> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Ok(None);
    }

    let Some(user) = queries::find_user_by_username(pool, username).await? else {
        warn!("login for unknown user");
        return Ok(None);
    };

    let password = form.password.clone();
    let stored = user.password_hash.clone();
    if blocking(move || verify_password(&password, &stored)).await? {
        Ok(Some(user))
    } else {
        warn!("login with wrong password");
        Ok(None)
    }
}

/// Oldest session start still accepted at `now`.
pub fn session_cutoff(now: NaiveDateTime) -> NaiveDateTime {
    now - Duration::days(SESSION_TTL_DAYS)
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub async fn start_session(pool: &Pool<Sqlite>, user_id: i64) -> Result<String, AppError> {
    let pruned = queries::delete_sessions_before(pool, session_cutoff(now())).await?;
    if pruned > 0 {
        debug!(pruned, "expired sessions removed");
    }

    let token = Uuid::new_v4().to_string();
    queries::create_session(pool, &token, user_id).await?;
    info!(user_id, "session started");
    Ok(token)
}

pub async fn session_user(pool: &Pool<Sqlite>, token: &str) -> Result<Option<User>, AppError> {
    Ok(queries::find_session_user(pool, token, session_cutoff(now())).await?)
}

pub async fn end_session(pool: &Pool<Sqlite>, token: &str) -> Result<(), AppError> {
    if queries::delete_session(pool, token).await? {
        info!("session ended");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct-horse", &hash));
        assert!(!verify_password("wrong-horse", &hash));
    }

    #[test]
    fn sessions_last_two_weeks() {
        let now = chrono::NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let cutoff = session_cutoff(now);
        assert_eq!(cutoff.date(), chrono::NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(cutoff.time(), now.time());
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-hash"));
    }
}
