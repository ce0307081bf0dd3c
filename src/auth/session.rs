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
use chrono::{DateTime, Duration, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

pub const SESSION_COOKIE: &str = "session";

#[derive(Clone, Debug, Getters, Deserialize, Serialize, JsonSchema)]
pub struct Session {
    pub id: Id,
    /// key of the account
    #[get = "pub"]
    target: String,
    #[get = "pub"]
    iat: DateTime<Utc>,
    #[get = "pub"]
    exp: DateTime<Utc>,
}

impl Session {
    /// Loads the session referenced by the cookie value and checks its expiry.
    #[instrument(skip(connection))]
    pub async fn validate_session(id: &str, connection: &DatabaseConnection) -> Result<Session> {
        let id = Id::try_from(("session", id)).map_err(|_| ApplicationError::Unauthorized)?;
        let session: Option<Session> = sql_span!(connection.select(id.to_thing()).await?);

        match session {
            Some(session) => {
                session.is_valid(connection).await?;
                Ok(session)
            }
            None => Err(ApplicationError::Unauthorized),
        }
    }

    #[instrument(skip_all)]
    pub async fn is_valid(&self, connection: &DatabaseConnection) -> Result<()> {
        if Utc::now() >= self.exp {
            // the session is not anymore valid, so we end it.
            self.end(connection).await?;

            Err(ApplicationError::Unauthorized)
        } else {
            Ok(())
        }
    }

    /// Ends the given session
    #[instrument(skip_all)]
    pub async fn end(&self, connection: &DatabaseConnection) -> Result<()> {
        let _: Option<Session> = sql_span!(connection.delete(self.id.to_thing()).await?);

        Ok(())
    }

    /// Deletes every expired session
    #[instrument(skip_all)]
    pub async fn remove_expired(connection: &DatabaseConnection) -> Result<()> {
        sql_span!(connection
            .query("DELETE session WHERE exp < $now")
            .bind(("now", Utc::now()))
            .await?
            .check()?);

        Ok(())
    }
}

/// Starts a new session for the account with the given key. Other sessions of the
/// account stay active.
#[derive(Clone, Debug)]
pub struct WriteSession<'a> {
    target: &'a str,
    connection: &'a DatabaseConnection,
    length: Duration,
}

impl<'a> WriteSession<'a> {
    pub fn new(target: &'a str, connection: &'a DatabaseConnection) -> Self {
        Self {
            target,
            connection,
            length: Duration::seconds(*CONFIGURATION.session_length()),
        }
    }

    pub fn with_length(mut self, length: Duration) -> Self {
        self.length = length;
        self
    }
}

impl<'a> IntoFuture for WriteSession<'a> {
    type Output = Result<Session>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let iat = Utc::now();
            let exp = iat + self.length;
            let id = Id::random("session", 64);

            let session: Option<Session> = sql_span!(self
                .connection
                .create(id.to_thing())
                .content(&json! ({
                    "target": self.target,
                    "iat": iat,
                    "exp": exp,
                }))
                .await?);

            session.ok_or(ApplicationError::InternalServerError)
        })
    }
}
