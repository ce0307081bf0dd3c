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

use crate::error::ApplicationError;
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use surrealdb::sql::{self, Thing};

/// Characters of generated record keys.
const ALPHABET: [char; 62] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
    'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
    'V', 'W', 'X', 'Y', 'Z',
];

/// A record id in the form `table:key`. Records read from the database carry it as a
/// `Thing`, clients see the plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "Thing")]
pub struct Id {
    pub table: String,
    pub id: String,
}

impl From<Thing> for Id {
    fn from(thing: Thing) -> Self {
        let id = match thing.id {
            sql::Id::String(key) => key,
            other => other.to_string(),
        };

        Self {
            table: thing.tb,
            id,
        }
    }
}

impl TryFrom<(&str, &str)> for Id {
    type Error = ApplicationError;

    /// Accepts `table:key` as well as the bare key. Ids of any other table are rejected.
    fn try_from((force, raw): (&str, &str)) -> Result<Self, Self::Error> {
        let invalid = || ApplicationError::BadRequest("invalid id".to_owned());

        let key = match raw.split_once(':') {
            Some((table, key)) if table.eq(force) => key,
            Some(_) => return Err(invalid()),
            None => raw,
        };
        if key.is_empty() || key.contains(':') {
            return Err(invalid());
        }

        Ok(Self::new((force, key)))
    }
}

impl Id {
    pub fn new((table, id): (&str, &str)) -> Self {
        Self {
            table: table.to_string(),
            id: id.to_string(),
        }
    }

    /// A fresh id with an alphanumeric key of the given length.
    pub fn random(table: &str, length: usize) -> Self {
        let key = nanoid::nanoid!(length, &ALPHABET);

        Self::new((table, key.as_str()))
    }

    pub fn to_thing(&self) -> Thing {
        Thing::from((self.table.as_str(), self.id.as_str()))
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", &self.table, &self.id)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl JsonSchema for Id {
    fn schema_name() -> String {
        "Id".to_owned()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            format: Some("string".to_string()),
            ..Default::default()
        }
        .into()
    }
}
