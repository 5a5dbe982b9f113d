//! Session cookie, the per-request identity extractor and the account pages.

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

use crate::backend::{flash, AppState, Page};
use crate::database::models::User;
use crate::domain::accounts;
use crate::domain::actions::{ActionOutcome, FlashMessage};
use crate::domain::validation::{LoginForm, RegisterForm};
use crate::domain::AppError;

pub const SESSION_COOKIE: &str = "sessionid";
pub const LAST_LOGIN_COOKIE: &str = "last_login";
pub const LOGIN_PATH: &str = "/login";

/// The authenticated user of this request, resolved from the session cookie.
/// Requests without a live session are sent to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
            return Err(Redirect::to(LOGIN_PATH).into_response());
        };

        match accounts::session_user(&state.db, &token).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(Redirect::to(LOGIN_PATH).into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthForm {
    pub form: &'static str,
    pub action: &'static str,
    pub fields: Vec<&'static str>,
}

pub async fn register_page(jar: CookieJar) -> (CookieJar, Json<Page<AuthForm>>) {
    let (jar, messages) = flash::take(jar);
    let body = AuthForm {
        form: "register",
        action: "/register",
        fields: vec!["first_name", "username", "password1", "password2"],
    };
    (jar, Json(Page::new(messages, body)))
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let outcome = accounts::register(&state.db, &form).await?;
    Ok(flash::redirect(jar, outcome))
}

pub async fn login_page(jar: CookieJar) -> (CookieJar, Json<Page<AuthForm>>) {
    let (jar, messages) = flash::take(jar);
    let body = AuthForm {
        form: "login",
        action: LOGIN_PATH,
        fields: vec!["username", "password"],
    };
    (jar, Json(Page::new(messages, body)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let Some(user) = accounts::authenticate(&state.db, &form).await? else {
        let outcome =
            ActionOutcome::to(LOGIN_PATH).with_message(FlashMessage::error(accounts::LOGIN_FAILED));
        return Ok(flash::redirect(jar, outcome));
    };

    let token = accounts::start_session(&state.db, user.user_id).await?;
    let secure = state.config.secure_cookies;
    let last_login = chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();

    let jar = jar
        .add(
            Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .secure(secure)
                .same_site(SameSite::Lax),
        )
        // display only
        .add(
            Cookie::build((LAST_LOGIN_COOKIE, last_login))
                .path("/")
                .secure(secure)
                .same_site(SameSite::Lax),
        );

    Ok((jar, Redirect::to("/")))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<(CookieJar, Redirect), AppError> {
    if let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) {
        accounts::end_session(&state.db, &token).await?;
    }

    let jar = jar
        .remove(Cookie::build(SESSION_COOKIE).path("/"))
        .remove(Cookie::build(LAST_LOGIN_COOKIE).path("/"));
    Ok((jar, Redirect::to(LOGIN_PATH)))
}
