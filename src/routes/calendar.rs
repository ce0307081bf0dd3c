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

use crate::calendar::forms::{MonthWithForms, ScheduleFormset};
use crate::calendar::month::{MonthCalendar, MonthWithSchedule};
use crate::calendar::week::{WeekCalendar, WeekWithSchedule};
use crate::calendar::Calendar;
use crate::database::definitions::schedule::WriteSchedule;
use crate::error::ValidationErrorResponse;
use crate::forms::schedule::ScheduleForm;
use crate::forms::Validate;
use crate::prelude::*;
use crate::routes::extractor::ReferenceDate;
use crate::routes::response::SeeOther;
use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use chrono::{Datelike, NaiveDate};

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/month/", get_with(month, month_docs))
        .api_route("/month/:year/:month/", get_with(month, month_docs))
        .api_route("/week/", get_with(week, week_docs))
        .api_route("/week/:year/:month/:day/", get_with(week, week_docs))
        .api_route(
            "/week_with_schedule/",
            get_with(week_with_schedule, week_with_schedule_docs),
        )
        .api_route(
            "/week_with_schedule/:year/:month/:day/",
            get_with(week_with_schedule, week_with_schedule_docs),
        )
        .api_route(
            "/month_with_schedule/",
            get_with(month_with_schedule, month_with_schedule_docs),
        )
        .api_route(
            "/month_with_schedule/:year/:month/",
            get_with(month_with_schedule, month_with_schedule_docs),
        )
        .api_route(
            "/month_with_forms/",
            get_with(month_with_forms, month_with_forms_docs)
                .post_with(save_month_forms, save_month_forms_docs),
        )
        .api_route(
            "/month_with_forms/:year/:month/",
            get_with(month_with_forms, month_with_forms_docs)
                .post_with(save_month_forms, save_month_forms_docs),
        )
        .api_route(
            "/mycalendar/",
            get_with(my_calendar, my_calendar_docs).post_with(add_schedule, add_schedule_docs),
        )
        .api_route(
            "/mycalendar/:year/:month/:day/",
            get_with(my_calendar, my_calendar_docs).post_with(add_schedule, add_schedule_docs),
        )
        .with_state(state)
}

fn month_calendar(date: NaiveDate) -> MonthCalendar {
    MonthCalendar::new(&Calendar::default(), date, Calendar::today())
}

fn week_calendar(date: NaiveDate) -> WeekCalendar {
    WeekCalendar::new(&Calendar::default(), date, Calendar::today())
}

async fn month(ReferenceDate(date): ReferenceDate) -> Json<MonthCalendar> {
    Json(month_calendar(date))
}

fn month_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The complete weeks covering a month, today's month without a date")
        .summary("Month grid")
        .response::<200, Json<MonthCalendar>>()
}

async fn week(ReferenceDate(date): ReferenceDate) -> Json<WeekCalendar> {
    Json(week_calendar(date))
}

fn week_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The week containing the date, the current week without a date")
        .summary("Week grid")
        .response::<200, Json<WeekCalendar>>()
}

async fn week_with_schedule(
    State(state): State<ApplicationState>,
    ReferenceDate(date): ReferenceDate,
) -> Result<Json<WeekWithSchedule>> {
    Ok(Json(
        WeekWithSchedule::load(week_calendar(date), state.connection()).await?,
    ))
}

fn week_with_schedule_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The week grid with the schedules of every day")
        .summary("Week with schedules")
        .response::<200, Json<WeekWithSchedule>>()
}

async fn month_with_schedule(
    State(state): State<ApplicationState>,
    ReferenceDate(date): ReferenceDate,
) -> Result<Json<MonthWithSchedule>> {
    Ok(Json(
        MonthWithSchedule::load(month_calendar(date), state.connection()).await?,
    ))
}

fn month_with_schedule_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The month grid with the schedules of every day, in rows of 7")
        .summary("Month with schedules")
        .response::<200, Json<MonthWithSchedule>>()
}

async fn month_with_forms(
    State(state): State<ApplicationState>,
    ReferenceDate(date): ReferenceDate,
) -> Result<Json<MonthWithForms>> {
    Ok(Json(
        MonthWithForms::load(month_calendar(date), state.connection()).await?,
    ))
}

fn month_with_forms_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description(
            "The month grid where every day holds an edit form per schedule, or a blank \
             creation form",
        )
        .summary("Month with forms")
        .response::<200, Json<MonthWithForms>>()
}

async fn save_month_forms(
    State(state): State<ApplicationState>,
    ReferenceDate(date): ReferenceDate,
    Json(formset): Json<ScheduleFormset>,
) -> Result<SeeOther> {
    let calendar = month_calendar(date);
    let saved = formset.save(&calendar, state.connection()).await?;
    info!("Saved {} schedules", saved);

    let current = calendar.month_current();
    Ok(SeeOther::to(format!(
        "/month_with_forms/{}/{}/",
        current.year(),
        current.month()
    )))
}

fn save_month_forms_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description(
            "Create and update the schedules of the month at once. Nothing is saved unless \
             every form is valid, errors are keyed `{index}.{field}`",
        )
        .summary("Save month forms")
        .response::<303, SeeOther>()
        .response_with::<400, Json<ValidationErrorResponse>, _>(|transform| {
            transform.description("At least one form is invalid")
        })
}

#[derive(Serialize, JsonSchema, Debug, Clone)]
pub struct MyCalendarPage {
    month: MonthCalendar,
    week: WeekWithSchedule,
    /// blank schedule form for the reference date
    initial: ScheduleForm,
}

async fn my_calendar(
    State(state): State<ApplicationState>,
    ReferenceDate(date): ReferenceDate,
) -> Result<Json<MyCalendarPage>> {
    let week = WeekWithSchedule::load(week_calendar(date), state.connection()).await?;

    Ok(Json(MyCalendarPage {
        month: month_calendar(date),
        week,
        initial: ScheduleForm::for_date(date),
    }))
}

fn my_calendar_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The month grid, the schedules of the week and a form for the date")
        .summary("Calendar overview")
        .response::<200, Json<MyCalendarPage>>()
}

async fn add_schedule(
    State(state): State<ApplicationState>,
    ReferenceDate(date): ReferenceDate,
    Json(mut form): Json<ScheduleForm>,
) -> Result<SeeOther> {
    form.date = Some(date);
    let form = form.validated()?;

    let mut writer = WriteSchedule::from(state.connection());
    form.apply(&mut writer);
    writer.await?;

    Ok(SeeOther::to(format!(
        "/mycalendar/{}/{}/{}/",
        date.year(),
        date.month(),
        date.day()
    )))
}

fn add_schedule_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Create a schedule on the date of the page")
        .summary("Add a schedule")
        .response::<303, SeeOther>()
        .response_with::<400, Json<ValidationErrorResponse>, _>(|transform| {
            transform.description("The form is invalid")
        })
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::schedule::{Schedule, WriteSchedule};
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;
    use chrono::{NaiveDate, NaiveTime};
    use serde_json::Value;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    async fn create(suite: &TestSuite, summary: &str, day: NaiveDate) -> Result<Schedule, BoxError> {
        Ok(WriteSchedule::from(suite.connection())
            .set_summary(Some(summary.to_owned()))
            .set_description(Some(String::new()))
            .set_start_time(NaiveTime::from_hms_opt(9, 0, 0))
            .set_end_time(NaiveTime::from_hms_opt(10, 0, 0))
            .set_date(Some(day))
            .to_owned()
            .await?)
    }

    async fn get(suite: &TestSuite, cookie: &str, path: &str) -> (StatusCode, Value) {
        let response = suite
            .client()
            .get(path)
            .header("cookie", cookie)
            .send()
            .await;
        let status = response.status();

        (status, response.json::<Value>().await)
    }

    #[tokio::test]
    async fn test_month() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let cookie = suite.login().await;

        let (status, page) = get(&suite, cookie.as_str(), "/month/2024/1/").await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!("2024-01-01", page["month_current"]);
        assert_eq!("2023-12-01", page["month_previous"]);
        assert_eq!("2024-02-01", page["month_next"]);
        assert_eq!(5, page["month_days"].as_array().map(Vec::len).unwrap_or_default());
        assert_eq!(7, page["week_names"].as_array().map(Vec::len).unwrap_or_default());

        let (status, page) = get(&suite, cookie.as_str(), "/month/").await;
        assert_eq!(StatusCode::OK, status);
        assert!(page["month_current"].as_str().is_some_and(|day| day.ends_with("-01")));

        let (status, _) = get(&suite, cookie.as_str(), "/month/2024/13/").await;
        assert_eq!(StatusCode::BAD_REQUEST, status);

        Ok(())
    }

    #[tokio::test]
    async fn test_week() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let cookie = suite.login().await;
        create(&suite, "meeting", date(2024, 1, 3)).await?;

        let (_, page) = get(&suite, cookie.as_str(), "/week/2024/1/4/").await;
        assert_eq!("2024-01-01", page["week_first"]);
        assert_eq!("2024-01-07", page["week_last"]);
        assert_eq!("2023-12-25", page["week_previous"]);
        assert_eq!("2024-01-08", page["week_next"]);

        let (_, page) = get(&suite, cookie.as_str(), "/week_with_schedule/2024/1/4/").await;
        let schedules = &page["week_day_schedules"];
        assert_eq!(7, schedules.as_object().map(|days| days.len()).unwrap_or_default());
        assert_eq!("meeting", schedules["2024-01-03"][0]["summary"]);
        assert_eq!(Some(0), schedules["2024-01-04"].as_array().map(Vec::len));

        Ok(())
    }

    #[tokio::test]
    async fn test_month_with_schedule() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let cookie = suite.login().await;
        create(&suite, "third", date(2024, 1, 3)).await?;
        create(&suite, "tenth", date(2024, 1, 10)).await?;

        let (status, page) = get(&suite, cookie.as_str(), "/month_with_schedule/2024/1/").await;
        assert_eq!(StatusCode::OK, status);

        let weeks = page["month_day_schedules"].as_array().cloned().unwrap_or_default();
        assert_eq!(5, weeks.len());
        assert!(weeks
            .iter()
            .all(|week| week.as_object().map(|days| days.len()) == Some(7)));
        assert_eq!("third", weeks[0]["2024-01-03"][0]["summary"]);
        assert_eq!("tenth", weeks[1]["2024-01-10"][0]["summary"]);
        assert_eq!("2024-01-01", page["month_current"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_month_with_schedule_in_last_year() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let cookie = suite.login().await;
        create(&suite, "last", date(9998, 12, 15)).await?;

        let (status, page) = get(&suite, cookie.as_str(), "/month_with_schedule/9998/12/").await;
        assert_eq!(StatusCode::OK, status);
        let found = page["month_day_schedules"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .filter_map(|week| week["9998-12-15"][0]["summary"].as_str().map(str::to_owned))
            .collect::<Vec<String>>();
        assert_eq!(vec!["last".to_owned()], found);

        let (status, _) = get(&suite, cookie.as_str(), "/month_with_schedule/9999/1/").await;
        assert_eq!(StatusCode::BAD_REQUEST, status);

        Ok(())
    }

    #[tokio::test]
    async fn test_month_with_forms() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let cookie = suite.login().await;
        let existing = create(&suite, "old", date(2024, 1, 3)).await?;

        let (_, page) = get(&suite, cookie.as_str(), "/month_with_forms/2024/1/").await;
        assert_eq!(35, page["month_formset"]["total_forms"]);
        assert_eq!(1, page["month_formset"]["initial_forms"]);
        assert_eq!(
            existing.id().to_string(),
            page["month_day_forms"][0]["2024-01-03"][0]["id"]
        );
        assert_eq!(
            "2024-01-04",
            page["month_day_forms"][0]["2024-01-04"][0]["initial"]["date"]
        );

        let response = suite
            .client()
            .post("/month_with_forms/2024/1/")
            .header("cookie", cookie.as_str())
            .json(&json!({
                "forms": [
                    { "id": existing.id().to_string(), "summary": "renamed", "date": "2024-01-03",
                      "start_time": "09:00:00", "end_time": "10:00:00" },
                    { "summary": "", "date": "2024-01-04" },
                    { "summary": "new", "date": "2024-01-05",
                      "start_time": "12:00:00", "end_time": "13:00:00" }
                ]
            }))
            .send()
            .await;
        assert_eq!(StatusCode::SEE_OTHER, response.status());
        assert_eq!("/month_with_forms/2024/1/", response.headers()["location"]);

        let summaries = Schedule::between(date(2024, 1, 1), date(2024, 1, 31), suite.connection())
            .await?
            .into_iter()
            .map(|schedule| schedule.summary().clone())
            .collect::<Vec<String>>();
        assert_eq!(vec!["renamed".to_owned(), "new".to_owned()], summaries);

        let response = suite
            .client()
            .post("/month_with_forms/2024/1/")
            .header("cookie", cookie.as_str())
            .json(&json!({
                "forms": [
                    { "summary": "valid", "date": "2024-01-06",
                      "start_time": "12:00:00", "end_time": "13:00:00" },
                    { "summary": "backwards", "date": "2024-01-07",
                      "start_time": "12:00:00", "end_time": "11:00:00" }
                ]
            }))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        let body = response.json::<Value>().await;
        assert_eq!(
            "End time must be after the start time.",
            body["fields"]["1.end_time"][0]
        );
        assert_eq!(
            2,
            Schedule::between(date(2024, 1, 1), date(2024, 1, 31), suite.connection())
                .await?
                .len()
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_my_calendar() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let cookie = suite.login().await;

        let (status, page) = get(&suite, cookie.as_str(), "/mycalendar/2024/1/3/").await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!("2024-01-01", page["month"]["month_current"]);
        assert_eq!("2024-01-01", page["week"]["week_first"]);
        assert_eq!("2024-01-03", page["initial"]["date"]);
        assert_eq!("07:00:00", page["initial"]["start_time"]);

        let response = suite
            .client()
            .post("/mycalendar/2024/1/3/")
            .header("cookie", cookie.as_str())
            .json(&json!({
                "summary": "lunch",
                "start_time": "12:00:00",
                "end_time": "13:00:00",
                "date": "2030-01-01"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::SEE_OTHER, response.status());
        assert_eq!("/mycalendar/2024/1/3/", response.headers()["location"]);

        let (_, page) = get(&suite, cookie.as_str(), "/mycalendar/2024/1/3/").await;
        assert_eq!("lunch", page["week"]["week_day_schedules"]["2024-01-03"][0]["summary"]);

        let response = suite
            .client()
            .post("/mycalendar/2024/1/3/")
            .header("cookie", cookie.as_str())
            .json(&json!({ "summary": "same time" }))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        Ok(())
    }
}
