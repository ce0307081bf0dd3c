/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::auth::middleware::Visitor;
use crate::auth::session::{Session, SESSION_COOKIE};
use crate::auth::Authenticate;
use crate::database::definitions::account::Account;
use crate::forms::account::LoginForm;
use crate::forms::{FormErrors, Validate, NON_FIELD_ERRORS};
use crate::prelude::*;
use crate::routes::extractor::Query;
use crate::routes::response::{PageOrRedirect, SeeOther};
use aide::axum::routing::{get_with, post_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::Extension;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;

mod profile;
mod register;

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Routes reachable without a session.
pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/login",
            get_with(login_page, login_page_docs).post_with(login, login_docs),
        )
        .with_state(state.clone())
        .merge(register::router(state))
}

/// Routes that need a session.
pub fn protected_router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/logout", get_with(logout, logout_docs))
        .api_route("/account-delete", post_with(delete_account, delete_account_docs))
        .with_state(state.clone())
        .merge(profile::router(state))
}

/// Builds the cookie carrying the session key.
pub(crate) fn session_cookie(session: &Session) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session.id.id.clone())
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(*CONFIGURATION.cookie_secure())
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "").path("/").finish()
}

#[derive(Deserialize, JsonSchema, Debug, Clone, Default)]
pub struct NextQuery {
    /// local path to continue with after the login
    next: Option<String>,
}

impl NextQuery {
    /// Only local paths are followed.
    fn location(&self) -> &str {
        match self.next.as_deref() {
            Some(next) if is_local_path(next) => next,
            _ => "/",
        }
    }
}

/// Browsers drop tabs and line breaks from a location and read `\` like `/`, so
/// `/\host` and `/\t/host` point to another host just like `//host`.
fn is_local_path(next: &str) -> bool {
    let mut chars = next.chars().filter(|c| !matches!(c, '\t' | '\n' | '\r'));

    chars.next() == Some('/') && !matches!(chars.next(), Some('/' | '\\'))
}

#[derive(Serialize, JsonSchema, Debug, Clone)]
pub struct LoginPage {
    initial: LoginForm,
    next: Option<String>,
}

async fn login_page(
    Visitor(account): Visitor,
    Query(query): Query<NextQuery>,
) -> PageOrRedirect<LoginPage> {
    if account.is_some() {
        return PageOrRedirect::Redirect(SeeOther::to("/"));
    }

    PageOrRedirect::Page(LoginPage {
        initial: LoginForm::default(),
        next: query.next,
    })
}

fn login_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The login form, logged in accounts are sent to the task list")
        .summary("Login form")
}

async fn login(
    State(state): State<ApplicationState>,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
    Json(form): Json<LoginForm>,
) -> Result<SeeOther> {
    let form = form.validated()?;
    let connection = state.connection();

    // fetch the account and verify the password
    let account = Account::from_username(form.username.as_str(), connection)
        .await?
        .filter(|account| account.login(form.password.as_str()).is_ok())
        .ok_or_else(|| FormErrors::single(NON_FIELD_ERRORS, INVALID_LOGIN))?;

    let session = account.start_session(connection).await?;
    info!("Started a new session for {}", account.username());

    Ok(SeeOther::to(query.location()).with_cookies(jar.add(session_cookie(&session))))
}

fn login_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description(
            "Start a new session. The session cookie is set on the redirect to `next` or the \
             task list",
        )
        .summary("Login")
        .response::<303, SeeOther>()
        .response_with::<400, Json<ValidationErrorResponse>, _>(|transform| {
            transform.description("Missing fields or wrong credentials")
        })
}

async fn logout(
    State(state): State<ApplicationState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Result<SeeOther> {
    session.end(state.connection()).await?;

    Ok(SeeOther::to("/login").with_cookies(jar.remove(removal_cookie())))
}

fn logout_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("End the current session, other sessions of the account stay active")
        .summary("Logout")
        .response::<303, SeeOther>()
}

async fn delete_account(
    State(state): State<ApplicationState>,
    Extension(account): Extension<Account>,
    jar: CookieJar,
) -> Result<SeeOther> {
    account.remove(state.connection()).await?;
    info!("Removed account {}", account.username());

    Ok(SeeOther::to("/login").with_cookies(jar.remove(removal_cookie())))
}

fn delete_account_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Delete the account with its profile, tasks and sessions")
        .summary("Delete the account")
        .response::<303, SeeOther>()
}
