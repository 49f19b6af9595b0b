// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{
    PhysicalColumn, database_error::DatabaseError, sql::column_type::ColumnType,
    sql::connect::database_client::DatabaseClient,
};

const COLUMNS_QUERY: &str = "
SELECT
    pg_attribute.attnum AS num,
    pg_attribute.attname AS name,
    pg_type.typname AS type_name,
    pg_attribute.atttypmod AS type_modifier,
    pg_attribute.attnotnull AS not_null,
    pg_attribute.atthasdef AS has_default,
    col_description(pg_attribute.attrelid, pg_attribute.attnum) AS comment
FROM
    pg_attribute
    JOIN pg_type ON pg_attribute.atttypid = pg_type.oid
WHERE
    pg_attribute.attrelid = $1
    AND pg_attribute.attnum > 0
    AND NOT pg_attribute.attisdropped
ORDER BY
    pg_attribute.attnum
";

pub(super) async fn columns_from_live_db(
    client: &DatabaseClient,
    table_oid: u32,
) -> Result<Vec<PhysicalColumn>, DatabaseError> {
    client
        .query(COLUMNS_QUERY, &[&table_oid])
        .await?
        .iter()
        .map(|row| -> Result<PhysicalColumn, DatabaseError> {
            let type_name: String = row.try_get("type_name")?;
            let not_null: bool = row.try_get("not_null")?;

            Ok(PhysicalColumn {
                num: row.try_get("num")?,
                name: row.try_get("name")?,
                typ: ColumnType::from_pg_type_name(&type_name),
                type_name,
                type_modifier: row.try_get("type_modifier")?,
                nullable: !not_null,
                has_default: row.try_get("has_default")?,
                comment: row.try_get("comment")?,
            })
        })
        .collect()
}
