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

use crate::calendar::grid::{group_by_day, partition_weeks};
use crate::calendar::{first_of_month, next_month, previous_month, Calendar};
use crate::database::definitions::schedule::Schedule;
use crate::prelude::*;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Getters)]
#[get = "pub"]
pub struct MonthCalendar {
    now: NaiveDate,
    /// complete weeks covering the month
    month_days: Vec<Vec<NaiveDate>>,
    month_current: NaiveDate,
    month_previous: NaiveDate,
    month_next: NaiveDate,
    week_names: Vec<String>,
}

impl MonthCalendar {
    pub fn new(calendar: &Calendar, date: NaiveDate, now: NaiveDate) -> Self {
        let current = first_of_month(date);

        Self {
            now,
            month_days: calendar.month_days(current),
            month_current: current,
            month_previous: previous_month(current),
            month_next: next_month(current),
            week_names: calendar.week_names(),
        }
    }

    /// First day of the grid.
    pub fn first(&self) -> NaiveDate {
        self.month_days
            .first()
            .and_then(|week| week.first())
            .copied()
            .unwrap_or(self.month_current)
    }

    /// Last day of the grid.
    pub fn last(&self) -> NaiveDate {
        self.month_days
            .last()
            .and_then(|week| week.last())
            .copied()
            .unwrap_or(self.month_current)
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.month_days.iter().flatten().copied().collect()
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.first().le(date) && self.last().ge(date)
    }
}

/// Month grid where every day carries its schedules, in rows of 7.
#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct MonthWithSchedule {
    #[serde(flatten)]
    pub calendar: MonthCalendar,
    pub month_day_schedules: Vec<BTreeMap<NaiveDate, Vec<Schedule>>>,
}

impl MonthWithSchedule {
    pub fn from_schedules(calendar: MonthCalendar, schedules: Vec<Schedule>) -> Self {
        let grouped = group_by_day(calendar.days().as_slice(), schedules);

        Self {
            month_day_schedules: partition_weeks(grouped),
            calendar,
        }
    }

    #[instrument(skip(connection))]
    pub async fn load(calendar: MonthCalendar, connection: &DatabaseConnection) -> Result<Self> {
        let schedules = Schedule::between(calendar.first(), calendar.last(), connection).await?;

        Ok(Self::from_schedules(calendar, schedules))
    }
}
