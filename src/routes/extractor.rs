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

use crate::calendar::Calendar;
use crate::prelude::*;
use aide::{OperationInput, OperationIo};
use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use axum::response::IntoResponse;
use axum_jsonschema::JsonSchemaRejection;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(FromRequest, OperationIo)]
#[from_request(via(axum_jsonschema::Json), rejection(ApplicationError))]
#[aide(
    input_with = "axum_jsonschema::Json<T>",
    output_with = "axum_jsonschema::Json<T>",
    json_schema
)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonSchemaRejection> for ApplicationError {
    fn from(rejection: JsonSchemaRejection) -> Self {
        let message = match rejection {
            JsonSchemaRejection::Json(err) => err.to_string(),
            JsonSchemaRejection::Serde(err) => err.to_string(),
            JsonSchemaRejection::Schema(err) => {
                serde_json::to_string(&serde_json::json!({ "schema": err }))
                    .unwrap_or_else(|_| "invalid request body".to_owned())
            }
        };

        Self::BadRequest(message)
    }
}

#[derive(FromRequestParts, OperationIo)]
#[from_request(via(axum::extract::Query), rejection(ApplicationError))]
#[aide(input_with = "axum::extract::Query<T>", json_schema)]
pub struct Query<T>(pub T);

impl From<QueryRejection> for ApplicationError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Last year a calendar page may show. The month grid of December reaches into the
/// next year, whose ISO dates must still sort as four digit strings.
const MAX_YEAR: i32 = 9998;

/// Reference date of a calendar page, read from the `year`, `month` and `day` path
/// parameters. Without parameters it is today, without a day the first of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDate(pub NaiveDate);

impl ReferenceDate {
    fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let (Some(year), Some(month)) = (params.get("year"), params.get("month")) else {
            return Ok(Self(Calendar::today()));
        };

        let invalid = || ApplicationError::BadRequest("invalid date".to_owned());
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        let day = match params.get("day") {
            Some(day) => day.parse::<u32>().map_err(|_| invalid())?,
            None => 1,
        };
        if !(1..=MAX_YEAR).contains(&year) {
            return Err(invalid());
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(invalid)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ReferenceDate
where
    S: Send + Sync,
{
    type Rejection = ApplicationError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let params = match Path::<HashMap<String, String>>::from_request_parts(parts, state).await
        {
            Ok(Path(params)) => params,
            Err(_) => HashMap::new(),
        };

        Self::from_params(&params)
    }
}

impl OperationInput for ReferenceDate {}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(values: &[(&str, &str)]) -> HashMap<String, String> {
        values
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_reference_date() {
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 2, 1),
            ReferenceDate::from_params(&params(&[("year", "2024"), ("month", "2")]))
                .ok()
                .map(|date| date.0)
        );
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 2, 29),
            ReferenceDate::from_params(&params(&[("year", "2024"), ("month", "2"), ("day", "29")]))
                .ok()
                .map(|date| date.0)
        );
        assert_eq!(
            Calendar::today(),
            ReferenceDate::from_params(&HashMap::new()).unwrap().0
        );
    }

    #[test]
    fn test_last_supported_year() {
        assert_eq!(
            NaiveDate::from_ymd_opt(9998, 12, 31),
            ReferenceDate::from_params(&params(&[("year", "9998"), ("month", "12"), ("day", "31")]))
                .ok()
                .map(|date| date.0)
        );
    }

    #[test]
    fn test_invalid_reference_date() {
        for values in [
            vec![("year", "2023"), ("month", "2"), ("day", "29")],
            vec![("year", "2024"), ("month", "13")],
            vec![("year", "0"), ("month", "1")],
            vec![("year", "abc"), ("month", "1")],
            vec![("year", "9999"), ("month", "1")],
            vec![("year", "10000"), ("month", "1")],
        ] {
            assert!(ReferenceDate::from_params(&params(&values)).is_err());
        }
    }
}
