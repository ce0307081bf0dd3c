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

use crate::database::definitions::schedule::Schedule;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Pairs every day with the schedules dated on it, in the order of `days`. Schedules
/// outside of `days` are dropped.
pub fn group_by_day(days: &[NaiveDate], schedules: Vec<Schedule>) -> Vec<(NaiveDate, Vec<Schedule>)> {
    let mut grouped = days
        .iter()
        .map(|day| (*day, Vec::new()))
        .collect::<Vec<(NaiveDate, Vec<Schedule>)>>();

    for schedule in schedules {
        if let Some((_, entries)) = grouped.iter_mut().find(|(day, _)| day.eq(schedule.date())) {
            entries.push(schedule);
        }
    }

    grouped
}

/// Splits the days into rows of 7, keeping their order. A trailing row holds the rest.
pub fn partition_weeks<T>(days: Vec<(NaiveDate, T)>) -> Vec<BTreeMap<NaiveDate, T>> {
    let mut weeks = Vec::with_capacity((days.len() + 6) / 7);
    let mut current = BTreeMap::new();

    for (day, entry) in days {
        current.insert(day, entry);
        if current.len() == 7 {
            weeks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        weeks.push(current);
    }

    weeks
}
