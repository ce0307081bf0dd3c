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

use crate::calendar::grid::partition_weeks;
use crate::calendar::month::MonthCalendar;
use crate::database::definitions::schedule::{Schedule, WriteSchedule};
use crate::forms::schedule::ScheduleForm;
use crate::forms::{FormErrors, Validate};
use crate::prelude::*;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;

/// A form placed on a calendar day. `id` is set when it edits an existing schedule.
#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct ScheduleFormView {
    pub id: Option<Id>,
    pub initial: ScheduleForm,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq)]
pub struct FormsetManagement {
    pub total_forms: usize,
    pub initial_forms: usize,
}

/// Month grid where every day carries the forms for editing its schedules, or a
/// blank creation form when it has none.
#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct MonthWithForms {
    #[serde(flatten)]
    pub calendar: MonthCalendar,
    pub month_day_forms: Vec<BTreeMap<NaiveDate, Vec<ScheduleFormView>>>,
    pub month_formset: FormsetManagement,
}

impl MonthWithForms {
    pub fn from_schedules(calendar: MonthCalendar, schedules: Vec<Schedule>) -> Self {
        let initial_forms = schedules.len();
        let mut days = calendar
            .days()
            .into_iter()
            .map(|day| (day, Vec::new()))
            .collect::<Vec<(NaiveDate, Vec<ScheduleFormView>)>>();

        for schedule in schedules.iter() {
            if let Some((_, forms)) = days.iter_mut().find(|(day, _)| day.eq(schedule.date())) {
                forms.push(ScheduleFormView {
                    id: Some(schedule.id().clone()),
                    initial: ScheduleForm::from(schedule),
                });
            }
        }

        for (day, forms) in days.iter_mut() {
            if forms.is_empty() {
                forms.push(ScheduleFormView {
                    id: None,
                    initial: ScheduleForm::for_date(*day),
                });
            }
        }

        let total_forms = days.iter().map(|(_, forms)| forms.len()).sum();

        Self {
            month_day_forms: partition_weeks(days),
            month_formset: FormsetManagement {
                total_forms,
                initial_forms,
            },
            calendar,
        }
    }

    #[instrument(skip(connection))]
    pub async fn load(calendar: MonthCalendar, connection: &DatabaseConnection) -> Result<Self> {
        let schedules = Schedule::between(calendar.first(), calendar.last(), connection).await?;

        Ok(Self::from_schedules(calendar, schedules))
    }
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct ScheduleFormSubmission {
    /// id of the edited schedule, absent for new ones
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub form: ScheduleForm,
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct ScheduleFormset {
    #[serde(default)]
    pub forms: Vec<ScheduleFormSubmission>,
}

impl ScheduleFormset {
    /// Validates every form before anything is written. Errors are keyed by the form
    /// index. Blank forms without an id are ignored. Returns the number of saved forms.
    #[instrument(skip_all)]
    pub async fn save(
        self,
        calendar: &MonthCalendar,
        connection: &DatabaseConnection,
    ) -> Result<usize> {
        let mut errors = FormErrors::default();
        let mut cleaned = Vec::<(Option<Id>, ScheduleForm)>::new();

        for (index, submission) in self.forms.into_iter().enumerate() {
            if submission.id.is_none() && submission.form.is_blank() {
                continue;
            }

            let mut form_errors = FormErrors::default();
            let target = match submission.id.as_deref() {
                Some(raw) => editable(raw, calendar, connection).await?,
                None => Ok(None),
            };
            let target = match target {
                Ok(target) => target,
                Err(message) => {
                    form_errors.add("id", message);
                    None
                }
            };

            let mut form = submission.form;
            form.clean(&mut form_errors);

            if form_errors.is_empty() {
                cleaned.push((target, form));
            } else {
                errors.merge_prefixed(index, form_errors);
            }
        }
        errors.into_result()?;

        let saved = cleaned.len();
        persist(cleaned, connection).await?;

        Ok(saved)
    }
}

/// Writes the cleaned forms in a single transaction. Forms with an id update their
/// schedule, the others create one.
#[instrument(skip_all, fields(forms = forms.len()))]
pub(crate) async fn persist(
    forms: Vec<(Option<Id>, ScheduleForm)>,
    connection: &DatabaseConnection,
) -> Result<()> {
    if forms.is_empty() {
        return Ok(());
    }

    let mut statements = vec!["BEGIN TRANSACTION;".to_owned()];
    for (index, (target, _)) in forms.iter().enumerate() {
        statements.push(match target {
            Some(_) => format!("UPDATE $target{index} MERGE $data{index};"),
            None => format!("CREATE schedule CONTENT $data{index};"),
        });
    }
    statements.push("COMMIT TRANSACTION;".to_owned());

    let mut query = connection.query(statements.join("\n"));
    for (index, (target, form)) in forms.into_iter().enumerate() {
        let mut writer = WriteSchedule::from(connection);
        form.apply(&mut writer);
        match target {
            Some(target) => query = query.bind((format!("target{index}"), target.to_thing())),
            None => {
                writer.set_created_at(Some(Utc::now()));
            }
        }
        query = query.bind((format!("data{index}"), writer));
    }

    sql_span!(query.await?.check()?, "schedule");

    Ok(())
}

/// Resolves the id of an edited schedule. Only schedules shown on the grid can be edited.
async fn editable(
    raw: &str,
    calendar: &MonthCalendar,
    connection: &DatabaseConnection,
) -> Result<std::result::Result<Option<Id>, &'static str>> {
    const INVALID: &str = "Select a valid choice. That choice is not one of the available choices.";

    let Ok(id) = Id::try_from(("schedule", raw)) else {
        return Ok(Err(INVALID));
    };

    match Schedule::fetch(&id, connection).await? {
        Some(schedule) if calendar.contains(schedule.date()) => Ok(Ok(Some(id))),
        _ => Ok(Err(INVALID)),
    }
}
