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

use crate::database::definitions::account::{Account, WriteAccount};
use crate::database::definitions::profile::{Profile, WriteProfile};
use crate::forms::account::{check_username_available, ProfileForm};
use crate::forms::{FormErrors, Validate};
use crate::prelude::*;
use crate::routes::response::SeeOther;
use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::Extension;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/profile-edit",
            get_with(profile_page, profile_page_docs).post_with(edit_profile, edit_profile_docs),
        )
        .with_state(state)
}

#[derive(Serialize, JsonSchema, Debug, Clone)]
pub struct ProfilePage {
    account: Account,
    profile: Option<Profile>,
    /// the form filled with the current values
    initial: ProfileForm,
}

async fn profile_page(
    State(state): State<ApplicationState>,
    Extension(account): Extension<Account>,
) -> Result<Json<ProfilePage>> {
    let profile = Profile::for_account(account.key(), state.connection()).await?;
    let initial = ProfileForm {
        username: account.username().clone(),
        first_name: account.first_name().clone(),
        last_name: account.last_name().clone(),
        email: account.email().clone(),
        image: profile.as_ref().and_then(|profile| profile.image().clone()),
    };

    Ok(Json(ProfilePage {
        account,
        profile,
        initial,
    }))
}

fn profile_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The account with its profile and the prefilled form")
        .summary("Profile form")
        .response::<200, Json<ProfilePage>>()
}

async fn edit_profile(
    State(state): State<ApplicationState>,
    Extension(account): Extension<Account>,
    Json(mut form): Json<ProfileForm>,
) -> Result<SeeOther> {
    let connection = state.connection();

    let mut errors = FormErrors::default();
    form.clean(&mut errors);
    check_username_available(&mut errors, form.username.as_str(), Some(&account), connection)
        .await?;
    errors.into_result()?;

    WriteAccount::from(connection)
        .set_target(Some(&account))
        .set_username(Some(form.username))
        .set_first_name(Some(form.first_name))
        .set_last_name(Some(form.last_name))
        .set_email(Some(form.email))
        .to_owned()
        .await?;

    // accounts created outside the registration may lack a profile
    match Profile::for_account(account.key(), connection).await? {
        Some(profile) => {
            WriteProfile::from(connection)
                .set_target(Some(profile.id()))
                .set_image(Some(form.image))
                .to_owned()
                .await?
        }
        None => {
            WriteProfile::from(connection)
                .set_account(Some(account.key().to_owned()))
                .set_image(Some(form.image))
                .to_owned()
                .await?
        }
    };

    Ok(SeeOther::to("/"))
}

fn edit_profile_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Update the account details and the profile picture")
        .summary("Edit the profile")
        .response::<303, SeeOther>()
        .response_with::<400, Json<ValidationErrorResponse>, _>(|transform| {
            transform.description("The form is invalid or the username is taken")
        })
}
