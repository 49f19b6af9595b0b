// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Print the generated types and the `Mutation` extension as GraphQL SDL.

use async_graphql_parser::{
    Positioned,
    types::{FieldDefinition, InputValueDefinition, TypeDefinition, TypeKind},
};

use upsert_model::subsystem::UpsertSubsystem;

pub fn print_sdl(subsystem: &UpsertSubsystem) -> String {
    let mut blocks: Vec<String> = subsystem.types.iter().map(type_block).collect();

    if !subsystem.operations.is_empty() {
        let mut block = String::from("extend type Mutation {\n");
        for field in subsystem.mutation_fields() {
            push_field(&mut block, field);
        }
        block.push_str("}\n");
        blocks.push(block);
    }

    blocks.join("\n")
}

fn type_block(typ: &TypeDefinition) -> String {
    let mut block = String::new();

    if let Some(description) = &typ.description {
        block.push_str(&format!("\"\"\"\n{}\n\"\"\"\n", description.node));
    }

    let name = &typ.name.node;
    match &typ.kind {
        TypeKind::Scalar => block.push_str(&format!("scalar {name}\n")),
        TypeKind::Object(object) => {
            block.push_str(&format!("type {name} {{\n"));
            for field in &object.fields {
                push_field(&mut block, &field.node);
            }
            block.push_str("}\n");
        }
        TypeKind::InputObject(input) => {
            block.push_str(&format!("input {name} {{\n"));
            for field in &input.fields {
                push_description(&mut block, &field.node.description);
                block.push_str(&format!("  {}\n", input_value(&field.node)));
            }
            block.push_str("}\n");
        }
        TypeKind::Enum(enum_type) => {
            block.push_str(&format!("enum {name} {{\n"));
            for value in &enum_type.values {
                block.push_str(&format!("  {}\n", value.node.value.node));
            }
            block.push_str("}\n");
        }
        // Never generated
        TypeKind::Interface(_) | TypeKind::Union(_) => {}
    }

    block
}

fn push_field(block: &mut String, field: &FieldDefinition) {
    push_description(block, &field.description);

    let arguments = if field.arguments.is_empty() {
        String::new()
    } else {
        let arguments: Vec<String> = field
            .arguments
            .iter()
            .map(|argument| input_value(&argument.node))
            .collect();
        format!("({})", arguments.join(", "))
    };

    block.push_str(&format!(
        "  {}{}: {}\n",
        field.name.node, arguments, field.ty.node
    ));
}

fn input_value(value: &InputValueDefinition) -> String {
    format!("{}: {}", value.name.node, value.ty.node)
}

fn push_description(block: &mut String, description: &Option<Positioned<String>>) {
    if let Some(description) = description {
        let escaped = description.node.replace('\\', "\\\\").replace('"', "\\\"");
        block.push_str(&format!("  \"{escaped}\"\n"));
    }
}

#[cfg(test)]
mod tests {
    use upsert_model::{
        policy::SmartTagPolicy, subsystem::BuildOptions, test_fixtures::bikes_table,
    };
    use upsert_sql::schema::CatalogSpec;

    use super::*;
    use crate::build;

    #[test]
    fn prints_bikes() {
        let subsystem = build(
            &CatalogSpec::new(vec![bikes_table()]),
            &SmartTagPolicy,
            &BuildOptions::default(),
        )
        .unwrap();

        insta::assert_snapshot!(print_sdl(&subsystem), @r#"
        """
        A row of the `public.bikes` table.
        """
        type Bike {
          id: Int!
          weight: Float
          make: String
          model: String
          serialNumber: String
          trim: String
        }

        """
        An input for mutations affecting `Bike`
        """
        input BikeInput {
          id: Int
          weight: Float
          make: String
          model: String
          serialNumber: String
          trim: String
        }

        """
        Where conditions for the upsert `Bike` mutation.
        """
        input UpsertBikeWhere {
          id: Int
          serialNumber: String
          weight: Float
        }

        """
        All input for the upsert `Bike` mutation.
        """
        input UpsertBikeInput {
          "An arbitrary string value with no semantic meaning. Will be included in the payload verbatim. May be used to track mutations by the client."
          clientMutationId: String
          "The `Bike` to be upserted by this mutation."
          bike: BikeInput!
        }

        """
        The output of our upsert `Bike` mutation.
        """
        type UpsertBikePayload {
          "The exact same `clientMutationId` that was provided in the mutation input, unchanged and unused. May be used by a client to track mutations."
          clientMutationId: String
          "The `Bike` that was upserted by this mutation."
          bike: Bike
        }

        extend type Mutation {
          "Upserts a single `Bike`."
          upsertBike(where: UpsertBikeWhere, input: UpsertBikeInput!): UpsertBikePayload
        }
        "#);
    }

    #[test]
    fn prints_conflict_tuning_types() {
        let options = BuildOptions {
            enable_conflict_tuning: true,
        };
        let subsystem = build(
            &CatalogSpec::new(vec![bikes_table()]),
            &SmartTagPolicy,
            &options,
        )
        .unwrap();

        let sdl = print_sdl(&subsystem);

        assert!(sdl.contains(
            "upsertBike(where: UpsertBikeWhere, input: UpsertBikeInput!, onConflict: UpsertBikeOnConflict): UpsertBikePayload"
        ));
        assert!(sdl.contains("input UpsertBikeDoUpdate {\n  id: UpsertUpdateAction\n"));
        assert!(sdl.ends_with(
            "enum UpsertUpdateAction {\n  update\n  ignore\n  current_timestamp\n}\n\nextend type Mutation {\n  \"Upserts a single `Bike`.\"\n  upsertBike(where: UpsertBikeWhere, input: UpsertBikeInput!, onConflict: UpsertBikeOnConflict): UpsertBikePayload\n}\n"
        ));
    }

    #[test]
    fn empty_subsystem() {
        let subsystem = build(
            &CatalogSpec::default(),
            &SmartTagPolicy,
            &BuildOptions::default(),
        )
        .unwrap();

        assert_eq!(print_sdl(&subsystem), "");
    }
}
