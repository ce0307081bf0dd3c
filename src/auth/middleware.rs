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

use crate::auth::session::{Session, SESSION_COOKIE};
use crate::database::definitions::account::Account;
use crate::prelude::*;
use aide::OperationInput;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::convert::Infallible;

/// Characters left as they are inside the `next` query parameter.
const NEXT_PARAMETER: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Resolves the session cookie. A valid session puts the `Session` and its `Account`
/// into the request extensions, anything else leaves the request anonymous.
pub async fn load_session<B>(
    State(state): State<ApplicationState>,
    jar: CookieJar,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let connection = state.connection();

        // verify the session
        if let Ok(session) = Session::validate_session(cookie.value(), connection).await {
            // fetch the account
            match Account::from_key(session.target(), connection).await {
                Ok(Some(account)) => {
                    let extensions = request.extensions_mut();
                    extensions.insert(account);
                    extensions.insert(session);
                }
                Ok(None) => {}
                Err(error) => return error.into_response(),
            }
        }
    }

    next.run(request).await
}

/// Sends anonymous requests to the login page, remembering where they wanted to go.
pub async fn require_session<B>(request: Request<B>, next: Next<B>) -> Response {
    if request.extensions().get::<Account>().is_some() {
        return next.run(request).await;
    }

    let target = request
        .uri()
        .path_and_query()
        .map(|target| target.as_str())
        .unwrap_or("/");
    let location = format!("/login?next={}", utf8_percent_encode(target, NEXT_PARAMETER));
    Redirect::to(location.as_str()).into_response()
}

/// The account of the request, if it carries a valid session.
#[derive(Clone, Debug)]
pub struct Visitor(pub Option<Account>);

#[async_trait]
impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Account>().cloned()))
    }
}

impl OperationInput for Visitor {}
