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

use crate::calendar::grid::group_by_day;
use crate::calendar::Calendar;
use crate::database::definitions::schedule::Schedule;
use crate::prelude::*;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Getters)]
#[get = "pub"]
pub struct WeekCalendar {
    now: NaiveDate,
    week_days: Vec<NaiveDate>,
    week_first: NaiveDate,
    week_last: NaiveDate,
    week_previous: NaiveDate,
    week_next: NaiveDate,
    week_names: Vec<String>,
}

impl WeekCalendar {
    pub fn new(calendar: &Calendar, date: NaiveDate, now: NaiveDate) -> Self {
        let week_days = calendar.week_days(date);
        let first = calendar.week_start(date);
        let last = first + Duration::days(6);

        Self {
            now,
            week_days,
            week_first: first,
            week_last: last,
            week_previous: first - Duration::days(7),
            week_next: first + Duration::days(7),
            week_names: calendar.week_names(),
        }
    }
}

/// Week where every day carries its schedules.
#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct WeekWithSchedule {
    #[serde(flatten)]
    pub calendar: WeekCalendar,
    pub week_day_schedules: BTreeMap<NaiveDate, Vec<Schedule>>,
}

impl WeekWithSchedule {
    pub fn from_schedules(calendar: WeekCalendar, schedules: Vec<Schedule>) -> Self {
        let week_day_schedules = group_by_day(calendar.week_days(), schedules)
            .into_iter()
            .collect();

        Self {
            calendar,
            week_day_schedules,
        }
    }

    #[instrument(skip(connection))]
    pub async fn load(calendar: WeekCalendar, connection: &DatabaseConnection) -> Result<Self> {
        let schedules =
            Schedule::between(calendar.week_first, calendar.week_last, connection).await?;

        Ok(Self::from_schedules(calendar, schedules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::definitions::schedule::WriteSchedule;
    use axum::BoxError;
    use chrono::NaiveTime;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_week_calendar() {
        let week = WeekCalendar::new(&Calendar::new(0), date(2024, 1, 4), date(2024, 1, 4));

        assert_eq!(7, week.week_days().len());
        assert_eq!(&date(2024, 1, 1), week.week_first());
        assert_eq!(&date(2024, 1, 7), week.week_last());
        assert_eq!(&date(2023, 12, 25), week.week_previous());
        assert_eq!(&date(2024, 1, 8), week.week_next());
        assert_eq!("Mon", week.week_names()[0]);
    }

    #[tokio::test]
    async fn test_week_with_schedule() -> Result<(), BoxError> {
        let connection = crate::database::connect().await?;
        for (day, start) in [(2, 14), (2, 9), (8, 9)] {
            WriteSchedule::from(&connection)
                .set_summary(Some(format!("{day} at {start}")))
                .set_description(Some(String::new()))
                .set_start_time(NaiveTime::from_hms_opt(start, 0, 0))
                .set_end_time(NaiveTime::from_hms_opt(start + 1, 0, 0))
                .set_date(Some(date(2024, 1, day)))
                .to_owned()
                .await?;
        }

        let week = WeekCalendar::new(&Calendar::new(0), date(2024, 1, 1), date(2024, 1, 1));
        let overlay = WeekWithSchedule::load(week, &connection).await?;

        assert_eq!(7, overlay.week_day_schedules.len());
        let summaries = overlay.week_day_schedules[&date(2024, 1, 2)]
            .iter()
            .map(|schedule| schedule.summary().as_str())
            .collect::<Vec<&str>>();
        assert_eq!(vec!["2 at 9", "2 at 14"], summaries);
        assert_eq!(
            2,
            overlay
                .week_day_schedules
                .values()
                .map(Vec::len)
                .sum::<usize>()
        );

        Ok(())
    }
}
