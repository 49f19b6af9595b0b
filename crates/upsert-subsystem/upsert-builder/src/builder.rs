// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashSet;

use async_graphql_parser::types::{TypeDefinition, TypeKind};
use indexmap::IndexMap;
use tracing::{debug, instrument};

use upsert_model::{
    error::ModelBuildingError,
    naming::payload_type_name,
    policy::{OmitAction, PolicyLookup},
    scalar::is_builtin_scalar,
    subsystem::{BuildOptions, UpsertOperation, UpsertSubsystem},
    type_normalization::{TypeDefinitionProvider, innermost_typename, scalar_type},
    update_action::UpdateActionType,
};
use upsert_sql::{PhysicalTable, schema::CatalogSpec};

use crate::{
    table_type_builder::{input_type_definition, object_type_definition, upsert_table},
    upsert_type_builder::{
        do_update_type_definition, mutation_field, on_conflict_type_definition,
        payload_type_definition, upsert_input_type_definition, where_fields,
        where_type_definition,
    },
};

/// Derive the upsert operations and their GraphQL types from a catalog snapshot.
///
/// Tables that are not eligible (see [`is_eligible`]) are skipped silently. Any inconsistency in
/// the catalog of an eligible table fails the whole build.
#[instrument(name = "upsert_builder::build", skip_all, fields(tables = catalog.tables.len()))]
pub fn build(
    catalog: &CatalogSpec,
    policy: &dyn PolicyLookup,
    options: &BuildOptions,
) -> Result<UpsertSubsystem, ModelBuildingError> {
    let mut subsystem = UpsertSubsystem {
        options: *options,
        ..Default::default()
    };

    for table in catalog.tables.iter() {
        if !is_eligible(table, policy) {
            debug!("Not generating an upsert for '{}'", table.name);
            continue;
        }

        build_table(table, policy, options, &mut subsystem)?;
    }

    if options.enable_conflict_tuning && !subsystem.operations.is_empty() {
        subsystem.types.push(UpdateActionType.type_definition());
    }

    let scalars: Vec<TypeDefinition> = referenced_scalars(&subsystem.types)
        .iter()
        .map(|name| scalar_type(name))
        .collect();
    subsystem.types.splice(0..0, scalars);

    ensure_unique_type_names(&subsystem.types)?;

    debug!("Generated {} upsert operations", subsystem.operations.len());

    Ok(subsystem)
}

/// A table gets an upsert when it lives in a schema, is not marked `@omit upsert`, the current
/// role may select, insert, and update it, and it has at least one primary key or unique
/// constraint.
fn is_eligible(table: &PhysicalTable, policy: &dyn PolicyLookup) -> bool {
    let privileges = &table.privileges;

    !table.name.schema.is_empty()
        && !policy.omit_table(table, OmitAction::Upsert)
        && privileges.select
        && privileges.insert
        && privileges.update
        && !table.constraints.is_empty()
}

fn build_table(
    table: &PhysicalTable,
    policy: &dyn PolicyLookup,
    options: &BuildOptions,
    subsystem: &mut UpsertSubsystem,
) -> Result<(), ModelBuildingError> {
    let upsert_table = upsert_table(table);

    let where_fields = where_fields(&upsert_table, policy)?;
    let where_field_names: Vec<String> =
        where_fields.iter().map(|field| field.name.clone()).collect();

    let (input_type, input_fields) =
        input_type_definition(&upsert_table, &where_field_names, policy);

    let mut types = vec![object_type_definition(&upsert_table, policy), input_type];
    if !where_fields.is_empty() {
        types.push(where_type_definition(&upsert_table, &where_fields));
    }
    types.push(upsert_input_type_definition(&upsert_table));
    types.push(payload_type_definition(&upsert_table));

    let do_update_fields = if options.enable_conflict_tuning {
        let (do_update_type, do_update_fields) = do_update_type_definition(&upsert_table, policy);
        types.push(on_conflict_type_definition(&upsert_table));
        types.push(do_update_type);
        do_update_fields
    } else {
        vec![]
    };

    let field_definition = mutation_field(
        &upsert_table,
        !where_fields.is_empty(),
        options.enable_conflict_tuning,
    );
    let name = field_definition.name.node.to_string();

    let operation = UpsertOperation {
        name: name.clone(),
        table_index: subsystem.tables.len(),
        where_fields: where_field_names,
        input_fields,
        do_update_fields,
        payload_type_name: payload_type_name(&upsert_table.type_name),
        field_definition,
    };

    if subsystem.operations.contains_key(&name) {
        return Err(ModelBuildingError::DuplicateType(name));
    }

    subsystem.tables.push(upsert_table);
    subsystem.operations.insert(name, operation);
    subsystem.types.extend(types);

    Ok(())
}

/// Names used as field types that are neither generated here nor built into GraphQL, in order of
/// first use.
fn referenced_scalars(types: &[TypeDefinition]) -> Vec<String> {
    let defined: HashSet<&str> = types.iter().map(|typ| typ.name.node.as_str()).collect();

    let referenced = types.iter().flat_map(|typ| -> Vec<&str> {
        match &typ.kind {
            TypeKind::Object(object) => object
                .fields
                .iter()
                .map(|field| innermost_typename(&field.node.ty.node))
                .collect(),
            TypeKind::InputObject(input) => input
                .fields
                .iter()
                .map(|field| innermost_typename(&field.node.ty.node))
                .collect(),
            _ => vec![],
        }
    });

    let mut scalars: IndexMap<&str, ()> = IndexMap::new();
    for name in referenced {
        if !defined.contains(name) && !is_builtin_scalar(name) {
            scalars.insert(name, ());
        }
    }

    scalars.into_keys().map(str::to_string).collect()
}

fn ensure_unique_type_names(types: &[TypeDefinition]) -> Result<(), ModelBuildingError> {
    let mut seen = HashSet::new();

    for typ in types {
        let name = typ.name.node.as_str();
        if !seen.insert(name) {
            return Err(ModelBuildingError::DuplicateType(name.to_string()));
        }
    }

    Ok(())
}
