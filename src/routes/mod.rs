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

use crate::auth::middleware::require_session;
use crate::prelude::ApplicationState;
use aide::axum::ApiRouter;
use axum::middleware::from_fn;

pub mod auth;
pub mod calendar;
pub mod extractor;
pub mod openapi;
pub mod response;
pub mod task;

/// Every page. Anonymous requests are redirected to the login, except for the
/// login and registration themselves.
pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .merge(task::router(state.clone()))
        .merge(calendar::router(state.clone()))
        .merge(auth::protected_router(state.clone()))
        .route_layer(from_fn(require_session))
        .merge(auth::router(state))
}
