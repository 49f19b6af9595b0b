// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, column::Column};

/// A select over a single named relation (typically a CTE alias).
#[derive(Debug)]
pub struct Select<'a> {
    pub columns: Vec<Column<'a>>,
    pub from: String,
    /// A top-level selection is cast to text, so the driver hands back JSON text rather than a
    /// `json` value.
    pub top_level_selection: bool,
}

impl ExpressionBuilder for Select<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("SELECT ");
        builder.push_iter(self.columns.iter(), ", ", |builder, column| {
            column.build(builder);
            if self.top_level_selection {
                builder.push_str("::text");
            }
        });
        builder.push_str(" FROM ");
        builder.push_identifier(&self.from);
    }
}
