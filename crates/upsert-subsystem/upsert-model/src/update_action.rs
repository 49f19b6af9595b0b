// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::type_normalization::{TypeDefinitionProvider, enum_type};
use async_graphql_parser::types::TypeDefinition;

pub const UPDATE_ACTION_TYPE_NAME: &str = "UpsertUpdateAction";

/// What a `doUpdate` entry asks for a column when the upsert hits a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    /// `col = excluded.col` (the default for every inserted column)
    Update,
    /// Leave the column out of the update
    Ignore,
    /// `col = CURRENT_TIMESTAMP`
    CurrentTimestamp,
}

impl UpdateAction {
    pub const ALL: [UpdateAction; 3] = [
        UpdateAction::Update,
        UpdateAction::Ignore,
        UpdateAction::CurrentTimestamp,
    ];

    pub fn graphql_name(&self) -> &'static str {
        match self {
            UpdateAction::Update => "update",
            UpdateAction::Ignore => "ignore",
            UpdateAction::CurrentTimestamp => "current_timestamp",
        }
    }

    pub fn from_graphql_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.graphql_name() == name)
    }
}

/// The `UpsertUpdateAction` enum shared by all tables.
pub struct UpdateActionType;

impl TypeDefinitionProvider for UpdateActionType {
    fn type_definition(&self) -> TypeDefinition {
        let values: Vec<&str> = UpdateAction::ALL
            .iter()
            .map(|action| action.graphql_name())
            .collect();

        enum_type(
            UPDATE_ACTION_TYPE_NAME,
            Some("Action to take for a column when an upsert conflicts with an existing row.".into()),
            &values,
        )
    }
}
