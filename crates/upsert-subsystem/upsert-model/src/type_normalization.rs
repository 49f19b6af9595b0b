// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::{
    Pos, Positioned,
    types::{
        BaseType, EnumType, EnumValueDefinition, FieldDefinition, InputObjectType,
        InputValueDefinition, ObjectType, Type, TypeDefinition, TypeKind,
    },
};
use async_graphql_value::Name;

pub trait TypeDefinitionProvider {
    fn type_definition(&self) -> TypeDefinition;
}

pub fn default_positioned<T>(value: T) -> Positioned<T> {
    Positioned::new(value, Pos::default())
}

pub fn default_positioned_name(value: &str) -> Positioned<Name> {
    default_positioned(Name::new(value))
}

fn positioned_description(description: Option<String>) -> Option<Positioned<String>> {
    description.map(default_positioned)
}

pub fn named_type(name: &str, nullable: bool) -> Type {
    Type {
        base: BaseType::Named(Name::new(name)),
        nullable,
    }
}

pub fn input_value(name: &str, typ: Type, description: Option<String>) -> InputValueDefinition {
    InputValueDefinition {
        description: positioned_description(description),
        name: default_positioned_name(name),
        ty: default_positioned(typ),
        default_value: None,
        directives: vec![],
    }
}

pub fn field_definition(
    name: &str,
    typ: Type,
    arguments: Vec<InputValueDefinition>,
    description: Option<String>,
) -> FieldDefinition {
    FieldDefinition {
        description: positioned_description(description),
        name: default_positioned_name(name),
        arguments: arguments.into_iter().map(default_positioned).collect(),
        ty: default_positioned(typ),
        directives: vec![],
    }
}

pub fn input_object_type(
    name: &str,
    description: Option<String>,
    fields: Vec<InputValueDefinition>,
) -> TypeDefinition {
    TypeDefinition {
        extend: false,
        description: positioned_description(description),
        name: default_positioned_name(name),
        directives: vec![],
        kind: TypeKind::InputObject(InputObjectType {
            fields: fields.into_iter().map(default_positioned).collect(),
        }),
    }
}

pub fn object_type(
    name: &str,
    description: Option<String>,
    fields: Vec<FieldDefinition>,
) -> TypeDefinition {
    TypeDefinition {
        extend: false,
        description: positioned_description(description),
        name: default_positioned_name(name),
        directives: vec![],
        kind: TypeKind::Object(ObjectType {
            implements: vec![],
            fields: fields.into_iter().map(default_positioned).collect(),
        }),
    }
}

pub fn enum_type(name: &str, description: Option<String>, values: &[&str]) -> TypeDefinition {
    TypeDefinition {
        extend: false,
        description: positioned_description(description),
        name: default_positioned_name(name),
        directives: vec![],
        kind: TypeKind::Enum(EnumType {
            values: values
                .iter()
                .map(|value| {
                    default_positioned(EnumValueDefinition {
                        description: None,
                        value: default_positioned_name(value),
                        directives: vec![],
                    })
                })
                .collect(),
        }),
    }
}

pub fn scalar_type(name: &str) -> TypeDefinition {
    TypeDefinition {
        extend: false,
        description: None,
        name: default_positioned_name(name),
        directives: vec![],
        kind: TypeKind::Scalar,
    }
}

/// The innermost named type, e.g. `Bike` for `[Bike!]!`
pub fn innermost_typename(typ: &Type) -> &str {
    match &typ.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(inner) => innermost_typename(inner),
    }
}
