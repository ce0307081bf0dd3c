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
use crate::auth::Authenticate;
use crate::database::definitions::account::WriteAccount;
use crate::forms::account::{check_username_available, RegisterForm};
use crate::forms::{FormErrors, Validate};
use crate::prelude::*;
use crate::routes::auth::session_cookie;
use crate::routes::response::{FormPage, PageOrRedirect, SeeOther};
use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum_extra::extract::CookieJar;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/register",
            get_with(register_page, register_page_docs).post_with(register, register_docs),
        )
        .with_state(state)
}

async fn register_page(Visitor(account): Visitor) -> PageOrRedirect<FormPage<RegisterForm>> {
    match account {
        Some(_) => PageOrRedirect::Redirect(SeeOther::to("/")),
        None => PageOrRedirect::Page(FormPage {
            initial: RegisterForm::default(),
        }),
    }
}

fn register_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The registration form, logged in accounts are sent to the task list")
        .summary("Registration form")
}

async fn register(
    State(state): State<ApplicationState>,
    jar: CookieJar,
    Json(mut form): Json<RegisterForm>,
) -> Result<SeeOther> {
    let connection = state.connection();

    let mut errors = FormErrors::default();
    form.clean(&mut errors);
    check_username_available(&mut errors, form.username.as_str(), None, connection).await?;
    errors.into_result()?;

    let account = WriteAccount::from(connection)
        .set_username(Some(form.username))
        .set_email(Some(form.email.unwrap_or_default()))
        .set_password(Some(form.password1))
        .to_owned()
        .register()
        .await?;
    info!("Registered account {}", account.username());

    let session = account.start_session(connection).await?;
    Ok(SeeOther::to("/").with_cookies(jar.add(session_cookie(&session))))
}

fn register_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Create an account with its profile and log it in")
        .summary("Register")
        .response::<303, SeeOther>()
        .response_with::<400, Json<ValidationErrorResponse>, _>(|transform| {
            transform.description("The form is invalid or the username is taken")
        })
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::account::Account;
    use crate::database::definitions::profile::Profile;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;
    use serde_json::Value;

    #[tokio::test]
    async fn test_register() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/register")
            .json(&json!({
                "username": "alice",
                "email": "alice@example.com",
                "password1": "correct horse",
                "password2": "correct horse"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::SEE_OTHER, response.status());
        assert_eq!("/", response.headers()["location"]);
        let cookie = response.headers()["set-cookie"].to_str()?;
        let cookie = cookie.split(';').next().unwrap_or_default().to_owned();

        let account = Account::from_username("alice", suite.connection())
            .await?
            .unwrap();
        assert_eq!("alice@example.com", account.email());
        assert!(Profile::for_account(account.key(), suite.connection())
            .await?
            .is_some());

        // the new account is logged in
        let response = suite
            .client()
            .get("/")
            .header("cookie", cookie.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_register_rejects() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        for (body, field) in [
            (
                json!({ "username": "user", "password1": "correct horse", "password2": "correct horse" }),
                "username",
            ),
            (
                json!({ "username": "bob", "password1": "correct horse", "password2": "correct hose" }),
                "password2",
            ),
            (
                json!({ "username": "bob", "password1": "short", "password2": "short" }),
                "password2",
            ),
            (
                json!({ "username": "bob", "password1": "48151623", "password2": "48151623" }),
                "password2",
            ),
            (
                json!({ "username": "bob with space", "password1": "correct horse", "password2": "correct horse" }),
                "username",
            ),
        ] {
            let response = suite.client().post("/register").json(&body).send().await;
            assert_eq!(StatusCode::BAD_REQUEST, response.status());
            assert!(response.headers().get("set-cookie").is_none());

            let body = response.json::<Value>().await;
            assert!(body["fields"][field].is_array());
        }
        assert_eq!(None, Account::from_username("bob", suite.connection()).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_register_missing_passwords() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/register")
            .json(&json!({ "username": "bob" }))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let body = response.json::<Value>().await;
        assert_eq!("This field is required.", body["fields"]["password1"][0]);
        assert_eq!("This field is required.", body["fields"]["password2"][0]);
        assert_eq!(None, Account::from_username("bob", suite.connection()).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_register_page() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite.client().get("/register").send().await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!("", response.json::<Value>().await["initial"]["username"]);

        let response = suite
            .client()
            .get("/register")
            .header("cookie", suite.login().await.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::SEE_OTHER, response.status());

        Ok(())
    }
}
