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

use lazy_static::lazy_static;

#[derive(Deserialize, Debug, Clone, Getters)]
#[get = "pub"]
pub struct Config {
    #[serde(default = "default_bind_address")]
    bind_address: String,
    #[serde(default = "default_surrealdb_endpoint")]
    surrealdb_endpoint: String,
    surrealdb_username: Option<String>,
    surrealdb_password: Option<String>,
    #[serde(default = "default_surrealdb_namespace")]
    surrealdb_namespace: String,
    #[serde(default = "default_surrealdb_database")]
    surrealdb_database: String,
    /// seconds
    #[serde(default = "default_session_length")]
    session_length: i64,
    /// milliseconds
    #[serde(default = "default_cleanup_interval")]
    cleanup_interval: u64,
    /// 0 = Monday ... 6 = Sunday
    #[serde(default)]
    first_weekday: u32,
    #[serde(default)]
    cookie_secure: bool,
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_owned()
}

fn default_surrealdb_endpoint() -> String {
    "mem://".to_owned()
}

fn default_surrealdb_namespace() -> String {
    "production".to_owned()
}

fn default_surrealdb_database() -> String {
    "todo".to_owned()
}

fn default_session_length() -> i64 {
    // 14 days
    1_209_600
}

fn default_cleanup_interval() -> u64 {
    60_000
}

lazy_static! {
    pub static ref CONFIGURATION: Config =
        load().unwrap_or_else(|error| panic!("Invalid configuration: {error}"));
}

/// Reads the configuration from the process environment, `.env` included.
pub fn load() -> Result<Config, envy::Error> {
    dotenvy::dotenv().ok();

    load_from(std::env::vars())
}

pub fn load_from<I>(vars: I) -> Result<Config, envy::Error>
where
    I: IntoIterator<Item = (String, String)>,
{
    envy::from_iter::<_, Config>(vars)
}
