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

#[macro_use]
extern crate quote;
extern crate darling;

use darling::ast::Data;
use darling::util::Ignored;
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Ident, Path, Type};

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(writer), supports(struct_named))]
struct DataWriterOptions {
    ident: Ident,
    data: Data<Ignored, DataWriterFieldOptions>,
    name: Option<String>,
    table: String,
}

#[derive(Debug, FromField)]
#[darling(attributes(writer))]
struct DataWriterFieldOptions {
    ident: Option<Ident>,
    ty: Type,
    /// fields the database owns, e.g. the record id
    #[darling(default)]
    skip: bool,
    /// value used when the record is created and the field was not set
    on_create: Option<Path>,
    /// value applied on every write
    on_write: Option<Path>,
}

/// Derives a `Write{Model}` builder. Every field becomes an optional setter; awaiting the
/// builder either creates a record in `table` or merges the set fields into the record
/// given with `set_target`.
#[proc_macro_derive(DataWriter, attributes(writer))]
pub fn data_writer_macro_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let options = match DataWriterOptions::from_derive_input(&input) {
        Ok(options) => options,
        Err(error) => return error.write_errors().into(),
    };

    let model = &options.ident;
    let table = &options.table;
    let writer = match &options.name {
        Some(name) => format_ident!("{}", name),
        None => format_ident!("Write{}", model),
    };

    let fields = match options.data {
        Data::Struct(fields) => fields.fields,
        Data::Enum(_) => unreachable!("restricted to named structs by darling"),
    };

    let mut field_names = Vec::<Ident>::new();
    let mut field_types = Vec::<Type>::new();
    let mut create_names = Vec::<Ident>::new();
    let mut create_values = Vec::<Path>::new();
    let mut write_names = Vec::<Ident>::new();
    let mut write_values = Vec::<Path>::new();

    for field in fields.into_iter().filter(|field| !field.skip) {
        let Some(ident) = field.ident else {
            continue;
        };

        if let Some(path) = field.on_create {
            create_names.push(ident.clone());
            create_values.push(path);
        }
        if let Some(path) = field.on_write {
            write_names.push(ident.clone());
            write_values.push(path);
        }

        field_names.push(ident);
        field_types.push(field.ty);
    }

    let expanded = quote! {
        #[derive(Clone, ::serde::Serialize, ::getset::Setters)]
        #[set = "pub"]
        pub struct #writer<'a> {
            #(
                #[serde(skip_serializing_if = "Option::is_none")]
                #field_names: Option<#field_types>,
            )*
            #[serde(skip)]
            connection: &'a crate::prelude::DatabaseConnection,
            #[serde(skip)]
            target: Option<&'a crate::prelude::Id>,
        }

        impl<'a> From<&'a crate::prelude::DatabaseConnection> for #writer<'a> {
            fn from(connection: &'a crate::prelude::DatabaseConnection) -> Self {
                Self {
                    connection,
                    target: None,
                    #(
                        #field_names: None,
                    )*
                }
            }
        }

        impl<'a> std::future::IntoFuture for #writer<'a> {
            type Output = crate::prelude::Result<#model>;
            type IntoFuture = std::pin::Pin<Box<dyn std::future::Future<Output = Self::Output> + Send + Sync + 'a>>;

            #[::tracing::instrument(skip_all, fields(table = #table))]
            fn into_future(mut self) -> Self::IntoFuture {
                Box::pin(async move {
                    let connection = self.connection;
                    #(
                        self.#write_names = Some(#write_values());
                    )*

                    let record = match self.target {
                        Some(target) => {
                            let updated: Option<#model> = crate::sql_span!(
                                connection.update(target.to_thing()).merge(self).await?,
                                #table
                            );

                            updated.ok_or(crate::prelude::ApplicationError::NotFound)?
                        }
                        None => {
                            #(
                                if self.#create_names.is_none() {
                                    self.#create_names = Some(#create_values());
                                }
                            )*

                            let created: Vec<#model> = crate::sql_span!(
                                connection.create(#table).content(self).await?,
                                #table
                            );

                            created
                                .into_iter()
                                .next()
                                .ok_or(crate::prelude::ApplicationError::InternalServerError)?
                        }
                    };

                    Ok(record)
                })
            }
        }
    };

    expanded.into()
}
