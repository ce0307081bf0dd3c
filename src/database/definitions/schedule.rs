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
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Getters, DataWriter)]
#[writer(table = "schedule")]
#[get = "pub"]
pub struct Schedule {
    #[writer(skip)]
    id: Id,
    summary: String,
    #[serde(default)]
    description: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
    date: NaiveDate,
    #[writer(on_create = "chrono::Utc::now")]
    created_at: DateTime<Utc>,
}

impl Schedule {
    #[instrument(skip(connection))]
    pub async fn fetch(id: &Id, connection: &DatabaseConnection) -> Result<Option<Schedule>> {
        let schedule: Option<Schedule> =
            sql_span!(connection.select(id.to_thing()).await?, "schedule");

        Ok(schedule)
    }

    /// All schedules dated within `start..=end`, ordered by date and start time.
    #[instrument(skip(connection))]
    pub async fn between(
        start: NaiveDate,
        end: NaiveDate,
        connection: &DatabaseConnection,
    ) -> Result<Vec<Schedule>> {
        let schedules: Vec<Schedule> = sql_span!(connection
            .query(
                "SELECT * FROM schedule WHERE date >= $start AND date <= $end \
                 ORDER BY date ASC, start_time ASC"
            )
            .bind(("start", start))
            .bind(("end", end))
            .await?
            .take(0)?);

        Ok(schedules)
    }
}
