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
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Getters, DataWriter)]
#[writer(table = "task")]
#[get = "pub"]
pub struct Task {
    #[writer(skip)]
    id: Id,
    /// key of the owning account
    owner: String,
    title: String,
    description: Option<String>,
    complete: bool,
    /// optional due date
    date: Option<NaiveDate>,
    #[writer(on_create = "chrono::Utc::now")]
    created_at: DateTime<Utc>,
}

impl Task {
    #[instrument(skip(connection))]
    pub async fn fetch(id: &Id, connection: &DatabaseConnection) -> Result<Option<Task>> {
        let task: Option<Task> = sql_span!(connection.select(id.to_thing()).await?, "task");

        Ok(task)
    }

    /// Tasks of the given owner, incomplete ones first, then by creation time. `search`
    /// restricts the result to titles containing it, ignoring case. Whitespace is part of
    /// the term, only an empty term lists everything.
    #[instrument(skip(connection))]
    pub async fn list(
        owner: &str,
        search: Option<&str>,
        connection: &DatabaseConnection,
    ) -> Result<Vec<Task>> {
        let search = search
            .map(|search| search.to_lowercase())
            .filter(|search| !search.is_empty());

        let query = match search {
            Some(_) => {
                "SELECT * FROM task WHERE owner = $owner AND string::lowercase(title) CONTAINS $search \
                 ORDER BY complete ASC, created_at ASC"
            }
            None => "SELECT * FROM task WHERE owner = $owner ORDER BY complete ASC, created_at ASC",
        };

        let tasks: Vec<Task> = sql_span!(connection
            .query(query)
            .bind(("owner", owner))
            .bind(("search", search.unwrap_or_default()))
            .await?
            .take(0)?);

        Ok(tasks)
    }

    #[instrument(skip(connection))]
    pub async fn count_incomplete(owner: &str, connection: &DatabaseConnection) -> Result<u64> {
        let count: Option<u64> = sql_span!(connection
            .query("SELECT count() FROM task WHERE owner = $owner AND complete = false GROUP ALL")
            .bind(("owner", owner))
            .await?
            .take((0, "count"))?);

        Ok(count.unwrap_or_default())
    }

    #[instrument(skip_all)]
    pub async fn delete(&self, connection: &DatabaseConnection) -> Result<()> {
        let _: Option<Task> = sql_span!(connection.delete(self.id.to_thing()).await?, "task");

        Ok(())
    }
}
