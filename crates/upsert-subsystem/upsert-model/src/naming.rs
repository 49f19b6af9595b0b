// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! GraphQL names derived from catalog names.
//!
//! A table `bikes` becomes the type `Bike`, exposed through the field `bike`; a column
//! `serial_number` becomes the field `serialNumber`.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

pub trait ToGraphQLName {
    /// Singular, UpperCamelCase type name for a table name.
    fn table_type_name(&self) -> String;
    /// lowerCamelCase field name for a column (or any snake_case) name.
    fn field_name(&self) -> String;
}

impl ToGraphQLName for str {
    fn table_type_name(&self) -> String {
        // Only the last word carries the plural (`no_primary_keys` -> `no_primary_key`)
        let singular = match self.rsplit_once('_') {
            Some((head, last)) => format!("{head}_{}", singularize(last)),
            None => singularize(self),
        };
        singular.to_upper_camel_case()
    }

    fn field_name(&self) -> String {
        self.to_lower_camel_case()
    }
}

fn singularize(word: &str) -> String {
    pluralizer::pluralize(word, 1, false)
}

pub fn table_field_name(type_name: &str) -> String {
    type_name.to_lower_camel_case()
}

pub fn upsert_operation_name(type_name: &str) -> String {
    format!("upsert{type_name}")
}

pub fn where_type_name(type_name: &str) -> String {
    format!("Upsert{type_name}Where")
}

pub fn upsert_input_type_name(type_name: &str) -> String {
    format!("Upsert{type_name}Input")
}

pub fn payload_type_name(type_name: &str) -> String {
    format!("Upsert{type_name}Payload")
}

pub fn on_conflict_type_name(type_name: &str) -> String {
    format!("Upsert{type_name}OnConflict")
}

pub fn do_update_type_name(type_name: &str) -> String {
    format!("Upsert{type_name}DoUpdate")
}

/// The standard insert input shape of a table.
pub fn table_input_type_name(type_name: &str) -> String {
    format!("{type_name}Input")
}
