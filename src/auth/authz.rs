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

use crate::database::definitions::account::Account;
use crate::database::definitions::task::Task;
use crate::prelude::*;

/// Ownership check for records bound to an account. Records of other accounts are
/// reported as missing.
pub trait Authorize: Sized {
    fn is_owned_by(&self, account: &Account) -> bool;

    fn authorize(self, account: &Account) -> Result<Self> {
        if self.is_owned_by(account) {
            Ok(self)
        } else {
            Err(ApplicationError::NotFound)
        }
    }
}

impl Authorize for Task {
    fn is_owned_by(&self, account: &Account) -> bool {
        self.owner().eq(account.key())
    }
}

/// Loads the task with the given raw id, if it belongs to `account`.
#[instrument(skip(account, connection))]
pub async fn owned_task(
    raw: &str,
    account: &Account,
    connection: &DatabaseConnection,
) -> Result<Task> {
    let id = Id::try_from(("task", raw)).map_err(|_| ApplicationError::NotFound)?;

    Task::fetch(&id, connection)
        .await?
        .ok_or(ApplicationError::NotFound)?
        .authorize(account)
}
