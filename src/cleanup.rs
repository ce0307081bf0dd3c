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

use crate::auth::session::Session;
use crate::prelude::*;
use kanal::AsyncReceiver;
use std::time::Duration;

/// Removes the sessions that expired since the last run.
#[instrument(skip_all)]
pub async fn cleanup(connection: &DatabaseConnection) -> Result<()> {
    Session::remove_expired(connection).await
}

/// Runs the cleanup every `cleanup_interval` milliseconds until the receiver gets the
/// shutdown signal.
pub fn spawn(connection: DatabaseConnection, receiver: AsyncReceiver<()>) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                result = cleanup(&connection) => {
                    if let Err(error) = result {
                        error!("Error occurred during the session cleanup: {}", error);
                    }

                    tokio::time::sleep(Duration::from_millis(*CONFIGURATION.cleanup_interval())).await;
                },
                _ = receiver.recv() => {
                    warn!("Received shutdown signal on kanal receiver");
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use crate::auth::session::{Session, WriteSession};
    use axum::BoxError;
    use chrono::Duration;

    #[tokio::test]
    async fn test_cleanup() -> Result<(), BoxError> {
        let connection = crate::database::connect().await?;
        WriteSession::new("expired", &connection)
            .with_length(Duration::seconds(-1))
            .await?;
        let active = WriteSession::new("active", &connection).await?;

        super::cleanup(&connection).await?;

        let sessions: Vec<Session> = connection.select("session").await?;
        assert_eq!(vec![active.id], sessions.into_iter().map(|session| session.id).collect::<Vec<_>>());

        Ok(())
    }

    #[tokio::test]
    async fn test_spawn_stops_on_shutdown() -> Result<(), BoxError> {
        let connection = crate::database::connect().await?;
        WriteSession::new("expired", &connection)
            .with_length(Duration::seconds(-1))
            .await?;

        let (sender, receiver) = kanal::unbounded_async::<()>();
        super::spawn(connection.clone(), receiver);
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        let sessions: Vec<Session> = connection.select("session").await?;
        assert!(sessions.is_empty());

        sender.send(()).await?;
        Ok(())
    }
}
