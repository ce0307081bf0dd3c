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

use crate::database::definitions::schedule::{Schedule, WriteSchedule};
use crate::forms::{max_length, required, FormErrors, Validate};
use crate::prelude::*;
use chrono::{NaiveDate, NaiveTime};

pub const SUMMARY_MAX_LENGTH: u64 = 50;

fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default()
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct ScheduleForm {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_time")]
    pub start_time: NaiveTime,
    #[serde(default = "default_time")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl Default for ScheduleForm {
    fn default() -> Self {
        Self {
            summary: String::new(),
            description: String::new(),
            start_time: default_time(),
            end_time: default_time(),
            date: None,
        }
    }
}

impl Validate for ScheduleForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        self.summary = self.summary.trim().to_owned();
        self.description = self.description.trim().to_owned();

        if required(errors, "summary", self.summary.as_str()) {
            max_length(errors, "summary", self.summary.as_str(), SUMMARY_MAX_LENGTH);
        }
        if self.date.is_none() {
            errors.add("date", "This field is required.");
        }
        if self.end_time <= self.start_time {
            errors.add("end_time", "End time must be after the start time.");
        }
    }
}

impl ScheduleForm {
    /// An empty form for creating a schedule on the given day.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    /// Whether nothing was entered into the form.
    pub fn is_blank(&self) -> bool {
        self.summary.trim().is_empty() && self.description.trim().is_empty()
    }

    /// Copies the form values onto the writer.
    pub fn apply(self, writer: &mut WriteSchedule) {
        writer
            .set_summary(Some(self.summary))
            .set_description(Some(self.description))
            .set_start_time(Some(self.start_time))
            .set_end_time(Some(self.end_time))
            .set_date(self.date);
    }
}

impl From<&Schedule> for ScheduleForm {
    fn from(schedule: &Schedule) -> Self {
        Self {
            summary: schedule.summary().clone(),
            description: schedule.description().clone(),
            start_time: *schedule.start_time(),
            end_time: *schedule.end_time(),
            date: Some(*schedule.date()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScheduleForm;
    use crate::error::ApplicationError;
    use crate::forms::{FormErrors, Validate};
    use chrono::{NaiveDate, NaiveTime};

    fn form(start: (u32, u32), end: (u32, u32)) -> ScheduleForm {
        ScheduleForm {
            summary: "meeting".to_owned(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 1, 3),
            ..Default::default()
        }
    }

    fn errors(form: ScheduleForm) -> FormErrors {
        match form.validated() {
            Err(ApplicationError::Validation(errors)) => errors,
            _ => FormErrors::default(),
        }
    }

    #[test]
    fn test_end_must_follow_start() {
        assert!(form((9, 0), (10, 0)).validated().is_ok());
        assert!(form((9, 0), (9, 1)).validated().is_ok());

        for (start, end) in [((9, 0), (9, 0)), ((10, 0), (9, 0)), ((23, 59), (0, 0))] {
            let errors = errors(form(start, end));
            assert_eq!(
                Some(&vec!["End time must be after the start time.".to_owned()]),
                errors.get("end_time")
            );
        }
    }

    #[test]
    fn test_defaults_are_rejected() {
        // both times default to 07:00
        let errors = errors(ScheduleForm::default());

        assert!(errors.get("summary").is_some());
        assert!(errors.get("date").is_some());
        assert!(errors.get("end_time").is_some());
    }

    #[test]
    fn test_summary_length() {
        let mut schedule = form((9, 0), (10, 0));
        schedule.summary = "a".repeat(51);
        assert!(errors(schedule).get("summary").is_some());
    }

    #[test]
    fn test_blank() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let blank = ScheduleForm::for_date(date);
        assert!(blank.is_blank());
        assert_eq!(Some(date), blank.date);

        assert!(!form((9, 0), (10, 0)).is_blank());
    }

    #[test]
    fn test_deserialize_defaults() {
        let form: ScheduleForm = serde_json::from_value(json!({
            "summary": "meeting",
            "date": "2024-01-03",
            "end_time": "08:30:00"
        }))
        .unwrap();

        assert_eq!(NaiveTime::from_hms_opt(7, 0, 0).unwrap(), form.start_time);
        assert!(form.validated().is_ok());
    }
}
