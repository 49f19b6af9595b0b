// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing::instrument;

use crate::{
    PhysicalTable, SchemaObjectName, database_error::DatabaseError,
    sql::connect::database_client::DatabaseClient,
};

use super::table_spec::TableRow;

const TABLES_QUERY: &str = "
SELECT
    pg_class.oid AS table_oid,
    pg_namespace.nspname AS schema_name,
    pg_class.relname AS table_name,
    has_table_privilege(pg_class.oid, 'SELECT') AS can_select,
    has_table_privilege(pg_class.oid, 'INSERT') AS can_insert,
    has_table_privilege(pg_class.oid, 'UPDATE') AS can_update,
    obj_description(pg_class.oid, 'pg_class') AS comment
FROM
    pg_class
    JOIN pg_namespace ON pg_class.relnamespace = pg_namespace.oid
WHERE
    pg_class.relkind IN ('r', 'p')
    AND NOT pg_class.relispartition
    AND pg_namespace.nspname = ANY($1)
ORDER BY
    pg_namespace.nspname, pg_class.relname
";

/// A snapshot of the catalog facts that drive upsert generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSpec {
    pub tables: Vec<PhysicalTable>,
}

impl CatalogSpec {
    pub fn new(tables: Vec<PhysicalTable>) -> Self {
        Self { tables }
    }

    pub fn get_table(&self, name: &SchemaObjectName) -> Option<&PhysicalTable> {
        self.tables.iter().find(|table| &table.name == name)
    }

    /// Read all ordinary and partitioned tables in the given schemas.
    #[instrument(skip(client))]
    pub async fn from_live_database(
        client: &DatabaseClient,
        schemas: &[String],
    ) -> Result<CatalogSpec, DatabaseError> {
        let schemas = schemas.to_vec();
        let rows = client
            .query(TABLES_QUERY, &[&schemas])
            .await
            .map_err(|e| DatabaseError::Delegate(e).with_context("Failed to list tables".into()))?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            let table_row = TableRow::from_row(row)?;
            tables.push(table_row.into_table(client).await?);
        }

        tracing::debug!("Introspected {} tables", tables.len());

        Ok(CatalogSpec { tables })
    }
}
