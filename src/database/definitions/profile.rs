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

/// Extends an account one-to-one.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Getters, DataWriter)]
#[writer(table = "profile")]
#[get = "pub"]
pub struct Profile {
    #[writer(skip)]
    id: Id,
    /// key of the account
    account: String,
    /// path or url of the profile picture
    image: Option<String>,
}

impl Profile {
    #[instrument(skip(connection))]
    pub async fn for_account(
        account: &str,
        connection: &DatabaseConnection,
    ) -> Result<Option<Profile>> {
        let profile: Option<Profile> = sql_span!(connection
            .query("SELECT * FROM profile WHERE account = $account LIMIT 1")
            .bind(("account", account))
            .await?
            .take(0)?);

        Ok(profile)
    }
}
