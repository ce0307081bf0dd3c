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

use surrealdb::engine::any::Any;
#[cfg(not(test))]
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use version_compare::{Cmp, Version};

pub mod definitions;
pub mod id;

pub type DatabaseConnection = Surreal<Any>;

/// Schema migrations as `(version, query)`, applied in order.
const MIGRATIONS: &[(&str, &str)] = &[];

cfg_if::cfg_if! {
    if #[cfg(test)] {
        /// Every test gets its own in-memory database.
        async fn open() -> Result<DatabaseConnection> {
            let client = surrealdb::engine::any::connect("mem://").await?;
            info!("Established connection to surrealdb");

            let db = nanoid::nanoid!();
            println!("Connected with database {:?} in namespace \"test\"", db);

            client.use_ns("test").use_db(db).await?;

            Ok(client)
        }
    } else {
        async fn open() -> Result<DatabaseConnection> {
            let client =
                surrealdb::engine::any::connect(CONFIGURATION.surrealdb_endpoint().as_str()).await?;
            info!("Established connection to surrealdb");

            // authenticate, embedded engines do not know root users
            if let (Some(username), Some(password)) = (
                CONFIGURATION.surrealdb_username(),
                CONFIGURATION.surrealdb_password(),
            ) {
                client
                    .signin(Root {
                        username: username.as_str(),
                        password: password.as_str(),
                    })
                    .await?;
                info!("Authenticated with surrealdb");
            }

            client
                .use_ns(CONFIGURATION.surrealdb_namespace().as_str())
                .use_db(CONFIGURATION.surrealdb_database().as_str())
                .await?;

            Ok(client)
        }
    }
}

pub async fn connect() -> Result<DatabaseConnection> {
    // establish the connection
    let client = open().await?;

    // execute the up queries
    client
        .query(include_str!("./up.surrealql"))
        .await?
        .check()?;
    info!("Initiated tables");
    // perform the migrations
    migrate(&client, env!("CARGO_PKG_VERSION"), MIGRATIONS).await?;

    Ok(client)
}

#[derive(Deserialize, Debug)]
struct MigrationRecord {
    version: String,
}

fn parse_version(raw: &str) -> Result<Version> {
    Version::from(raw).ok_or(ApplicationError::BadRequest(format!(
        "invalid migration version {raw}"
    )))
}

/// Applies every migration newer than the last recorded version and not newer than
/// `current_version`, then records `current_version`.
#[instrument(skip(client, migrations))]
pub async fn migrate(
    client: &DatabaseConnection,
    current_version: &str,
    migrations: &[(&str, &str)],
) -> Result<()> {
    // initiate the migration table and fetch possibly already existing records
    let mut responses = sql_span!(client
        .query(
            "DEFINE TABLE migration SCHEMALESS;
            DEFINE FIELD version     ON TABLE migration TYPE string;
            DEFINE FIELD created_at  ON TABLE migration TYPE datetime DEFAULT time::now();",
        )
        .query("SELECT version FROM migration")
        .await?
        .check()?);
    let records = responses.take::<Vec<MigrationRecord>>(3)?;

    let current = parse_version(current_version)?;
    let mut last: Option<Version> = None;
    for record in records.iter() {
        let version = parse_version(record.version.as_str())?;
        if last
            .as_ref()
            .map_or(true, |last| version.compare_to(last, Cmp::Gt))
        {
            last = Some(version);
        }
    }

    if let Some(last) = last.as_ref() {
        if !current.compare_to(last, Cmp::Gt) {
            return Ok(());
        }

        for (version, migration) in migrations {
            let target = parse_version(version)?;
            if target.compare_to(last, Cmp::Gt) && target.compare_to(&current, Cmp::Le) {
                info!("Executing surrealdb migration to {version}");
                sql_span!(client.query(*migration).await?.check()?);
            }
        }
    }

    // mark the current version as done
    sql_span!(client
        .query("CREATE migration SET version = $version")
        .bind(("version", current_version))
        .await?
        .check()?);

    Ok(())
}

#[macro_export]
macro_rules! sql_span {
    ($expr: expr) => {{
        let span = ::tracing::info_span!("Surrealdb Request");
        let _ = span.enter();
        $expr
    }};
    ($expr: expr, $title: expr) => {{
        let span = ::tracing::info_span!(concat!("Surrealdb Request: ", $title));
        let _ = span.enter();
        $expr
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::BoxError;

    async fn versions(connection: &DatabaseConnection) -> Result<Vec<String>> {
        let records: Vec<MigrationRecord> = connection
            .query("SELECT version FROM migration ORDER BY version")
            .await?
            .take(0)?;

        Ok(records.into_iter().map(|record| record.version).collect())
    }

    #[tokio::test]
    async fn test_connect_records_version() -> std::result::Result<(), BoxError> {
        let connection = connect().await?;

        assert_eq!(
            vec![env!("CARGO_PKG_VERSION").to_owned()],
            versions(&connection).await?
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_migrate_applies_pending_only() -> std::result::Result<(), BoxError> {
        let connection = connect().await?;
        connection
            .query("DELETE migration; CREATE migration SET version = '0.1.0'")
            .await?
            .check()?;

        let migrations = [
            ("0.1.0", "CREATE marker:old SET applied = true"),
            ("0.2.0", "CREATE marker:new SET applied = true"),
            ("0.4.0", "CREATE marker:future SET applied = true"),
        ];
        migrate(&connection, "0.3.0", &migrations).await?;

        let applied: Vec<String> = connection
            .query("SELECT VALUE meta::id(id) FROM marker")
            .await?
            .take(0)?;
        assert_eq!(vec!["new".to_owned()], applied);
        assert_eq!(
            vec!["0.1.0".to_owned(), "0.3.0".to_owned()],
            versions(&connection).await?
        );

        // running again with the same version is a no-op
        migrate(&connection, "0.3.0", &migrations).await?;
        assert_eq!(2, versions(&connection).await?.len());

        Ok(())
    }
}
