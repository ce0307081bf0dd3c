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
use crate::forms::{email, max_length, min_length, normalize_text, required, FormErrors, Validate};
use crate::prelude::*;
use lazy_static::lazy_static;
use regex::Regex;

pub const USERNAME_MAX_LENGTH: u64 = 150;
pub const PASSWORD_MIN_LENGTH: u64 = 8;

lazy_static! {
    // letters, digits and @/./+/-/_
    static ref USERNAME_REGEX: Regex =
        Regex::new(r"^[\w.@+-]+$").expect("USERNAME_REGEX: invalid regex pattern");
}

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890", "qwerty123",
    "qwertyuiop", "iloveyou", "sunshine", "princess", "football", "baseball", "welcome1",
    "abc12345", "letmein1", "trustno1", "superman", "starwars", "passw0rd",
];

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        self.username = self.username.trim().to_owned();

        required(errors, "username", self.username.as_str());
        required(errors, "password", self.password.as_str());
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl Validate for RegisterForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        self.username = self.username.trim().to_owned();
        self.email = normalize_text(self.email.take());

        validate_username(errors, self.username.as_str());
        if let Some(address) = self.email.as_deref() {
            email(errors, "email", address);
        }

        let password1 = required(errors, "password1", self.password1.as_str());
        let password2 = required(errors, "password2", self.password2.as_str());
        if password1 && password2 {
            if self.password1.ne(&self.password2) {
                errors.add("password2", "The two password fields didn't match.");
            } else {
                validate_password(
                    errors,
                    "password2",
                    self.password2.as_str(),
                    self.username.as_str(),
                );
            }
        }
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    /// path or url of the profile picture
    #[serde(default)]
    pub image: Option<String>,
}

impl Validate for ProfileForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        self.username = self.username.trim().to_owned();
        self.first_name = self.first_name.trim().to_owned();
        self.last_name = self.last_name.trim().to_owned();
        self.email = self.email.trim().to_owned();
        self.image = normalize_text(self.image.take());

        validate_username(errors, self.username.as_str());
        max_length(errors, "first_name", self.first_name.as_str(), 150);
        max_length(errors, "last_name", self.last_name.as_str(), 150);
        if required(errors, "email", self.email.as_str()) {
            email(errors, "email", self.email.as_str());
        }
    }
}

fn validate_username(errors: &mut FormErrors, username: &str) {
    if !required(errors, "username", username) {
        return;
    }

    max_length(errors, "username", username, USERNAME_MAX_LENGTH);
    if !USERNAME_REGEX.is_match(username) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

fn validate_password(errors: &mut FormErrors, field: &str, password: &str, username: &str) {
    min_length(
        errors,
        field,
        password,
        PASSWORD_MIN_LENGTH,
        format!(
            "This password is too short. It must contain at least {PASSWORD_MIN_LENGTH} characters."
        ),
    );
    if password.chars().all(|char| char.is_ascii_digit()) {
        errors.add(field, "This password is entirely numeric.");
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        errors.add(field, "This password is too common.");
    }

    let password = password.to_lowercase();
    let username = username.to_lowercase();
    if username.chars().count() >= 3 && (password.contains(&username) || username.contains(&password))
    {
        errors.add(field, "The password is too similar to the username.");
    }
}

/// Adds an error when another account already uses the username.
#[instrument(skip(errors, current, connection))]
pub async fn check_username_available(
    errors: &mut FormErrors,
    username: &str,
    current: Option<&Account>,
    connection: &DatabaseConnection,
) -> Result<()> {
    if username.is_empty() {
        return Ok(());
    }

    if let Some(existing) = Account::from_username(username, connection).await? {
        if current.map_or(true, |current| current.id().ne(existing.id())) {
            errors.add("username", "A user with that username already exists.");
        }
    }

    Ok(())
}
