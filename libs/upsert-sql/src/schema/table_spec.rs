// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tokio_postgres::Row;

use crate::{
    PhysicalTable, SchemaObjectName, TablePrivileges,
    database_error::{DatabaseError, WithContext},
    sql::connect::database_client::DatabaseClient,
};

use super::{column_spec::columns_from_live_db, constraint_spec::constraints_from_live_db};

pub(super) struct TableRow {
    oid: u32,
    name: SchemaObjectName,
    privileges: TablePrivileges,
    comment: Option<String>,
}

impl TableRow {
    pub(super) fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            oid: row.try_get("table_oid")?,
            name: SchemaObjectName::new(
                row.try_get::<_, String>("schema_name")?,
                row.try_get::<_, String>("table_name")?,
            ),
            privileges: TablePrivileges {
                select: row.try_get("can_select")?,
                insert: row.try_get("can_insert")?,
                update: row.try_get("can_update")?,
            },
            comment: row.try_get("comment")?,
        })
    }

    pub(super) async fn into_table(
        self,
        client: &DatabaseClient,
    ) -> Result<PhysicalTable, DatabaseError> {
        let context = format!("while introspecting table {}", self.name);

        let columns = columns_from_live_db(client, self.oid)
            .await
            .with_context(context.clone())?;
        let constraints = constraints_from_live_db(client, self.oid)
            .await
            .with_context(context)?;

        Ok(PhysicalTable {
            name: self.name,
            columns,
            constraints,
            privileges: self.privileges,
            comment: self.comment,
        })
    }
}
