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

use chrono::{Datelike, Duration, Local, NaiveDate};
use strum::{Display, EnumIter, IntoEnumIterator};

pub mod forms;
pub mod grid;
pub mod month;
pub mod week;

/// Column labels, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum WeekName {
    #[strum(serialize = "Mon")]
    Monday,
    #[strum(serialize = "Tues")]
    Tuesday,
    #[strum(serialize = "Wed")]
    Wednesday,
    #[strum(serialize = "Thur")]
    Thursday,
    #[strum(serialize = "Fri")]
    Friday,
    #[strum(serialize = "Sat")]
    Saturday,
    #[strum(serialize = "Sun")]
    Sunday,
}

/// Builds month and week grids starting at a configurable weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    /// 0 = Monday ... 6 = Sunday
    first_weekday: u32,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(*crate::prelude::CONFIGURATION.first_weekday())
    }
}

impl Calendar {
    pub fn new(first_weekday: u32) -> Self {
        Self {
            first_weekday: first_weekday % 7,
        }
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn week_names(&self) -> Vec<String> {
        let mut names = WeekName::iter()
            .map(|name| name.to_string())
            .collect::<Vec<String>>();
        names.rotate_left(self.first_weekday as usize);

        names
    }

    /// First day of the week containing `date`.
    pub fn week_start(&self, date: NaiveDate) -> NaiveDate {
        let offset = (date.weekday().num_days_from_monday() + 7 - self.first_weekday) % 7;
        date - Duration::days(offset as i64)
    }

    /// The 7 consecutive days of the week containing `date`.
    pub fn week_days(&self, date: NaiveDate) -> Vec<NaiveDate> {
        self.week_start(date).iter_days().take(7).collect()
    }

    /// Complete weeks covering the month of `date`, spilling into the adjacent months.
    pub fn month_days(&self, date: NaiveDate) -> Vec<Vec<NaiveDate>> {
        let first = first_of_month(date);
        let last = next_month(first) - Duration::days(1);

        let mut weeks = Vec::new();
        let mut start = self.week_start(first);
        while start <= last {
            weeks.push(self.week_days(start));
            start += Duration::days(7);
        }

        weeks
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

/// First day of the month before the month of `date`.
pub fn previous_month(date: NaiveDate) -> NaiveDate {
    first_of_month(first_of_month(date) - Duration::days(1))
}

/// First day of the month after the month of `date`.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    // no month is longer than 31 days
    first_of_month(first_of_month(date) + Duration::days(32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_month_days_are_complete_weeks() {
        for first_weekday in 0..7 {
            let calendar = Calendar::new(first_weekday);

            for year in [2020, 2021, 2024] {
                for month in 1..=12 {
                    let weeks = calendar.month_days(date(year, month, 15));
                    let days = weeks.iter().flatten().collect::<Vec<&NaiveDate>>();

                    assert!((4..=6).contains(&weeks.len()));
                    assert!(weeks.iter().all(|week| week.len() == 7));
                    assert_eq!(0, days.len() % 7);
                    assert!(days.contains(&&date(year, month, 1)));
                    assert!(days
                        .windows(2)
                        .all(|pair| *pair[0] + Duration::days(1) == *pair[1]));
                    assert_eq!(
                        first_weekday,
                        weeks[0][0].weekday().num_days_from_monday()
                    );
                }
            }
        }
    }

    #[test]
    fn test_february_2021() {
        // starts on a monday and has 28 days
        assert_eq!(4, Calendar::new(0).month_days(date(2021, 2, 1)).len());
        assert_eq!(5, Calendar::new(6).month_days(date(2021, 2, 1)).len());
    }

    #[test]
    fn test_january_2024() {
        let weeks = Calendar::new(0).month_days(date(2024, 1, 20));

        assert_eq!(5, weeks.len());
        assert_eq!(date(2024, 1, 1), weeks[0][0]);
        assert_eq!(date(2024, 2, 4), weeks[4][6]);
    }

    #[test]
    fn test_adjacent_months() {
        assert_eq!(date(2023, 12, 1), previous_month(date(2024, 1, 15)));
        assert_eq!(date(2024, 2, 1), next_month(date(2024, 1, 31)));
        assert_eq!(date(2025, 1, 1), next_month(date(2024, 12, 1)));
        assert_eq!(date(2024, 2, 1), previous_month(date(2024, 3, 31)));
        assert_eq!(date(2024, 3, 1), next_month(date(2024, 2, 29)));
        assert_eq!(date(2024, 5, 1), first_of_month(date(2024, 5, 31)));
    }

    #[test]
    fn test_week_names() {
        assert_eq!(
            vec!["Mon", "Tues", "Wed", "Thur", "Fri", "Sat", "Sun"],
            Calendar::new(0).week_names()
        );
        assert_eq!(
            vec!["Sun", "Mon", "Tues", "Wed", "Thur", "Fri", "Sat"],
            Calendar::new(6).week_names()
        );
        assert_eq!(Calendar::new(2), Calendar::new(9));
    }

    #[test]
    fn test_week_days() {
        let calendar = Calendar::new(0);
        let expected = (1..=7).map(|day| date(2024, 1, day)).collect::<Vec<NaiveDate>>();

        for day in 1..=7 {
            assert_eq!(expected, calendar.week_days(date(2024, 1, day)));
        }

        // sunday first
        let days = Calendar::new(6).week_days(date(2024, 1, 3));
        assert_eq!(date(2023, 12, 31), days[0]);
        assert_eq!(date(2024, 1, 6), days[6]);
    }
}
