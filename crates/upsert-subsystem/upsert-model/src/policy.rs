// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Declarative per-table and per-column policies.
//!
//! Generation and resolution ask a [`PolicyLookup`] whether an action is omitted for a table or
//! column. The default implementation, [`SmartTagPolicy`], reads `@omit` tags from catalog
//! comments:
//!
//! ```text
//! COMMENT ON COLUMN roles.rank IS E'@omit updateOnConflict';
//! COMMENT ON TABLE audit_log IS E'@omit upsert,update';
//! COMMENT ON TABLE internal IS E'@omit';
//! ```

use std::collections::HashSet;

use upsert_sql::{PhysicalColumn, PhysicalTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OmitAction {
    Read,
    Create,
    Update,
    Upsert,
    UpdateOnConflict,
}

impl OmitAction {
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "read" => Some(OmitAction::Read),
            "create" => Some(OmitAction::Create),
            "update" => Some(OmitAction::Update),
            "upsert" => Some(OmitAction::Upsert),
            "updateOnConflict" => Some(OmitAction::UpdateOnConflict),
            _ => None,
        }
    }
}

pub trait PolicyLookup: Send + Sync {
    fn omit_table(&self, table: &PhysicalTable, action: OmitAction) -> bool;

    fn omit_column(
        &self,
        table: &PhysicalTable,
        column: &PhysicalColumn,
        action: OmitAction,
    ) -> bool;
}

/// The `@omit` tags found in one comment.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OmitTags {
    all: bool,
    actions: HashSet<OmitAction>,
}

impl OmitTags {
    pub fn contains(&self, action: OmitAction) -> bool {
        self.all || self.actions.contains(&action)
    }
}

/// Parse every `@omit` line of a comment. A bare `@omit` omits all actions; unknown action names
/// are ignored.
pub fn parse_omit_tags(comment: Option<&str>) -> OmitTags {
    let mut tags = OmitTags::default();

    for line in comment.into_iter().flat_map(str::lines) {
        let Some(rest) = line.trim().strip_prefix("@omit") else {
            continue;
        };
        // `@omitted` is not an omit tag
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            continue;
        }

        let rest = rest.trim();
        if rest.is_empty() {
            tags.all = true;
        } else {
            tags.actions.extend(
                rest.split(',')
                    .filter_map(|name| OmitAction::from_tag_name(name.trim())),
            );
        }
    }

    tags
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SmartTagPolicy;

impl PolicyLookup for SmartTagPolicy {
    fn omit_table(&self, table: &PhysicalTable, action: OmitAction) -> bool {
        parse_omit_tags(table.comment.as_deref()).contains(action)
    }

    fn omit_column(
        &self,
        _table: &PhysicalTable,
        column: &PhysicalColumn,
        action: OmitAction,
    ) -> bool {
        parse_omit_tags(column.comment.as_deref()).contains(action)
    }
}

/// A policy given as explicit (table, column, action) entries, keyed by unqualified table name.
#[derive(Debug, Default, Clone)]
pub struct StaticPolicy {
    tables: HashSet<(String, OmitAction)>,
    columns: HashSet<(String, String, OmitAction)>,
}

impl StaticPolicy {
    pub fn with_omitted_table(mut self, table: &str, action: OmitAction) -> Self {
        self.tables.insert((table.to_string(), action));
        self
    }

    pub fn with_omitted_column(mut self, table: &str, column: &str, action: OmitAction) -> Self {
        self.columns
            .insert((table.to_string(), column.to_string(), action));
        self
    }
}

impl PolicyLookup for StaticPolicy {
    fn omit_table(&self, table: &PhysicalTable, action: OmitAction) -> bool {
        self.tables.contains(&(table.name.name.clone(), action))
    }

    fn omit_column(
        &self,
        table: &PhysicalTable,
        column: &PhysicalColumn,
        action: OmitAction,
    ) -> bool {
        self.columns
            .contains(&(table.name.name.clone(), column.name.clone(), action))
    }
}
