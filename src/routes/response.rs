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

use crate::prelude::*;
use aide::gen::GenContext;
use aide::openapi::{Operation, Response as ApiResponse};
use aide::OperationOutput;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Serialize;

/// `303 See Other`, the answer to every successful form submission. Cookie changes
/// travel with the redirect.
#[derive(Debug)]
pub struct SeeOther {
    location: String,
    jar: Option<CookieJar>,
}

impl SeeOther {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            jar: None,
        }
    }

    pub fn with_cookies(mut self, jar: CookieJar) -> Self {
        self.jar = Some(jar);
        self
    }
}

impl IntoResponse for SeeOther {
    fn into_response(self) -> Response {
        let redirect = Redirect::to(self.location.as_str());

        match self.jar {
            Some(jar) => (jar, redirect).into_response(),
            None => redirect.into_response(),
        }
    }
}

impl OperationOutput for SeeOther {
    type Inner = ();

    fn operation_response(_: &mut GenContext, _: &mut Operation) -> Option<ApiResponse> {
        Some(ApiResponse {
            description: "Redirect to the next page".to_owned(),
            ..Default::default()
        })
    }

    fn inferred_responses(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Vec<(Option<u16>, ApiResponse)> {
        Self::operation_response(ctx, operation)
            .map(|response| vec![(Some(303), response)])
            .unwrap_or_default()
    }
}

/// A page, or a redirect when the page does not apply to the requester.
#[derive(Debug)]
pub enum PageOrRedirect<T> {
    Page(T),
    Redirect(SeeOther),
}

impl<T> IntoResponse for PageOrRedirect<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match self {
            PageOrRedirect::Page(page) => Json(page).into_response(),
            PageOrRedirect::Redirect(redirect) => redirect.into_response(),
        }
    }
}

impl<T> OperationOutput for PageOrRedirect<T>
where
    T: JsonSchema,
{
    type Inner = T;

    fn inferred_responses(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Vec<(Option<u16>, ApiResponse)> {
        let mut responses =
            <axum_jsonschema::Json<T> as OperationOutput>::inferred_responses(ctx, operation);
        responses.extend(SeeOther::inferred_responses(ctx, operation));

        responses
    }
}

/// The initial values of a form.
#[derive(Serialize, JsonSchema, Debug, Clone)]
pub struct FormPage<T> {
    pub initial: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_see_other() {
        let response = SeeOther::to("/login").into_response();

        assert_eq!(StatusCode::SEE_OTHER, response.status());
        assert_eq!("/login", response.headers()[header::LOCATION]);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[test]
    fn test_see_other_with_cookie() {
        let jar = CookieJar::new().add(Cookie::new("session", "abc"));
        let response = SeeOther::to("/").with_cookies(jar).into_response();

        assert_eq!(StatusCode::SEE_OTHER, response.status());
        assert!(response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .starts_with("session=abc"));
    }

    #[test]
    fn test_page() {
        let response = PageOrRedirect::Page(FormPage { initial: 1 }).into_response();
        assert_eq!(StatusCode::OK, response.status());

        let response = PageOrRedirect::<()>::Redirect(SeeOther::to("/")).into_response();
        assert_eq!(StatusCode::SEE_OTHER, response.status());
    }
}
