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

use crate::database::definitions::task::{Task, WriteTask};
use crate::forms::{max_length, normalize_text, required, FormErrors, Validate};
use crate::prelude::*;
use chrono::NaiveDate;

pub const TITLE_MAX_LENGTH: u64 = 200;

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub complete: bool,
    /// optional due date
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl Validate for TaskForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        self.title = self.title.trim().to_owned();
        self.description = normalize_text(self.description.take());

        if required(errors, "title", self.title.as_str()) {
            max_length(errors, "title", self.title.as_str(), TITLE_MAX_LENGTH);
        }
    }
}

impl TaskForm {
    /// Copies the form values onto the writer.
    pub fn apply(self, writer: &mut WriteTask) {
        writer
            .set_title(Some(self.title))
            .set_description(Some(self.description))
            .set_complete(Some(self.complete))
            .set_date(Some(self.date));
    }
}

impl From<&Task> for TaskForm {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title().clone(),
            description: task.description().clone(),
            complete: *task.complete(),
            date: *task.date(),
        }
    }
}
