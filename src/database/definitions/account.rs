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
use chrono::{DateTime, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Getters, JsonSchema)]
#[get = "pub"]
pub struct Account {
    id: Id,
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(skip_serializing)]
    #[schemars(skip)]
    password: String,
    updated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl Account {
    /// The key other records use to reference this account.
    pub fn key(&self) -> &str {
        self.id.id.as_str()
    }

    #[instrument(skip(connection))]
    pub async fn from_username(
        username: &str,
        connection: &DatabaseConnection,
    ) -> Result<Option<Account>> {
        let account: Option<Account> = sql_span!(connection
            .query("SELECT * FROM account WHERE username = $username LIMIT 1")
            .bind(("username", username))
            .await?
            .take(0)?);

        Ok(account)
    }

    #[instrument(skip(connection))]
    pub async fn from_key(key: &str, connection: &DatabaseConnection) -> Result<Option<Account>> {
        let account: Option<Account> = sql_span!(
            connection
                .select(Id::new(("account", key)).to_thing())
                .await?
        );

        Ok(account)
    }

    /// Removes the account together with everything that belongs to it.
    #[instrument(skip_all)]
    pub async fn remove(&self, connection: &DatabaseConnection) -> Result<()> {
        sql_span!(connection
            .query(
                "BEGIN TRANSACTION;
                DELETE task WHERE owner = $account;
                DELETE profile WHERE account = $account;
                DELETE session WHERE target = $account;
                DELETE $record;
                COMMIT TRANSACTION;",
            )
            .bind(("account", self.key()))
            .bind(("record", self.id.to_thing()))
            .await?
            .check()?);

        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Getters, Setters)]
pub struct WriteAccount<'a> {
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
    #[serde(skip)]
    #[set = "pub"]
    target: Option<&'a Account>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a DatabaseConnection> for WriteAccount<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            username: None,
            email: None,
            first_name: None,
            last_name: None,
            password: None,
            connection,
            target: None,
            updated_at: Utc::now(),
            created_at: None,
        }
    }
}

impl<'a> WriteAccount<'a> {
    /// Creates the account and its empty profile in one transaction.
    #[instrument(skip_all)]
    pub async fn register(mut self) -> Result<Account> {
        let (Some(_), Some(password)) = (self.username.as_ref(), self.password.take()) else {
            return Err(ApplicationError::BadRequest(
                "username and password are required".to_owned(),
            ));
        };
        // only the hash gets stored
        self.password = Some(crate::auth::hash_password(password.as_str())?);
        self.created_at = Some(self.updated_at);

        let connection = self.connection;
        let id = Id::random("account", 20);
        sql_span!(
            connection
                .query(
                    "BEGIN TRANSACTION;
                    CREATE $record CONTENT $content;
                    CREATE profile CONTENT { account: $key };
                    COMMIT TRANSACTION;",
                )
                .bind(("record", id.to_thing()))
                .bind(("key", id.id.as_str()))
                .bind(("content", self))
                .await?
                .check()?,
            "account"
        );

        Account::from_key(id.id.as_str(), connection)
            .await?
            .ok_or(ApplicationError::InternalServerError)
    }
}

impl<'a> IntoFuture for WriteAccount<'a> {
    type Output = Result<Account>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(mut self) -> Self::IntoFuture {
        Box::pin(async move {
            // only the hash gets stored
            if let Some(password) = self.password {
                self.password = Some(crate::auth::hash_password(password.as_str())?);
            }

            let connection = self.connection;
            let account: Account = if let Some(target) = self.target {
                let updated: Option<Account> = sql_span!(
                    connection.update(target.id.to_thing()).merge(self).await?,
                    "account"
                );
                updated.ok_or(ApplicationError::NotFound)?
            } else {
                self.created_at = Some(self.updated_at);
                if self.username.is_none() || self.password.is_none() {
                    return Err(ApplicationError::BadRequest(
                        "username and password are required".to_owned(),
                    ));
                }

                let created: Vec<Account> =
                    sql_span!(connection.create("account").content(self).await?, "account");
                created
                    .into_iter()
                    .next()
                    .ok_or(ApplicationError::InternalServerError)?
            };

            Ok(account)
        })
    }
}

#[cfg(test)]
mod test {
    use crate::database::definitions::account::{Account, WriteAccount};
    use crate::database::definitions::profile::{Profile, WriteProfile};
    use crate::database::definitions::task::WriteTask;
    use axum::BoxError;

    #[tokio::test]
    async fn test_write() -> Result<(), BoxError> {
        let connection = crate::database::connect().await?;

        let account = WriteAccount::from(&connection)
            .set_username(Some("user".to_owned()))
            .set_first_name(Some("first name".to_owned()))
            .set_email(Some("test@test.de".to_owned()))
            .set_password(Some("password".to_owned()))
            .to_owned()
            .await?;

        assert_eq!(account.username, "user".to_owned());
        assert_eq!(account.first_name, "first name".to_owned());
        assert_eq!(account.last_name, String::new());
        assert_eq!(account.email, "test@test.de".to_owned());
        assert_ne!(account.password, "password".to_owned());

        let updated = WriteAccount::from(&connection)
            .set_target(Some(&account))
            .set_last_name(Some("last name".to_owned()))
            .to_owned()
            .await?;
        assert_eq!(updated.last_name, "last name".to_owned());
        assert_eq!(updated.password, account.password);
        assert_eq!(updated.created_at, account.created_at);

        assert_eq!(
            Some(updated.clone()),
            Account::from_username("user", &connection).await?
        );
        assert_eq!(
            Some(updated),
            Account::from_key(account.key(), &connection).await?
        );
        assert_eq!(None, Account::from_username("other", &connection).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_unique_username() -> Result<(), BoxError> {
        let connection = crate::database::connect().await?;

        for _ in 0..2 {
            let _ = WriteAccount::from(&connection)
                .set_username(Some("user".to_owned()))
                .set_password(Some("password".to_owned()))
                .to_owned()
                .await;
        }

        let accounts: Vec<Account> = connection.select("account").await?;
        assert_eq!(1, accounts.len());

        Ok(())
    }

    #[tokio::test]
    async fn test_register_with_profile() -> Result<(), BoxError> {
        let connection = crate::database::connect().await?;

        let account = WriteAccount::from(&connection)
            .set_username(Some("alice".to_owned()))
            .set_password(Some("password".to_owned()))
            .to_owned()
            .register()
            .await?;
        assert_ne!(account.password, "password".to_owned());
        assert_eq!(account.updated_at, account.created_at);
        assert!(Profile::for_account(account.key(), &connection)
            .await?
            .is_some());

        // a taken username leaves neither an account nor a profile behind
        assert!(WriteAccount::from(&connection)
            .set_username(Some("alice".to_owned()))
            .set_password(Some("other password".to_owned()))
            .to_owned()
            .register()
            .await
            .is_err());
        let accounts: Vec<Account> = connection.select("account").await?;
        assert_eq!(1, accounts.len());
        let profiles: Vec<Profile> = connection.select("profile").await?;
        assert_eq!(1, profiles.len());

        assert!(WriteAccount::from(&connection)
            .set_username(Some("bob".to_owned()))
            .to_owned()
            .register()
            .await
            .is_err());
        assert_eq!(None, Account::from_username("bob", &connection).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_cascades() -> Result<(), BoxError> {
        let connection = crate::database::connect().await?;
        let account = WriteAccount::from(&connection)
            .set_username(Some("user".to_owned()))
            .set_password(Some("password".to_owned()))
            .to_owned()
            .await?;
        let other = WriteAccount::from(&connection)
            .set_username(Some("other".to_owned()))
            .set_password(Some("password".to_owned()))
            .to_owned()
            .await?;

        for owner in [&account, &other] {
            WriteTask::from(&connection)
                .set_owner(Some(owner.key().to_owned()))
                .set_title(Some("title".to_owned()))
                .set_complete(Some(false))
                .to_owned()
                .await?;
            WriteProfile::from(&connection)
                .set_account(Some(owner.key().to_owned()))
                .to_owned()
                .await?;
        }

        account.remove(&connection).await?;

        assert_eq!(None, Account::from_key(account.key(), &connection).await?);
        let owners: Vec<String> = connection
            .query("SELECT VALUE owner FROM task")
            .await?
            .take(0)?;
        assert_eq!(vec![other.key().to_owned()], owners);
        let profiles: Vec<String> = connection
            .query("SELECT VALUE account FROM profile")
            .await?
            .take(0)?;
        assert_eq!(vec![other.key().to_owned()], profiles);

        Ok(())
    }
}
