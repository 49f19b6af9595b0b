// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{
    ConstraintKind, UniqueConstraint, database_error::DatabaseError,
    sql::connect::database_client::DatabaseClient,
};

// Creation order (oid) is the order in which constraints are considered as conflict targets.
const CONSTRAINT_QUERY: &str = "
SELECT
    conname,
    contype,
    conkey
FROM
    pg_constraint
WHERE
    conrelid = $1
    AND contype IN ('p', 'u')
ORDER BY
    oid
";

pub(super) async fn constraints_from_live_db(
    client: &DatabaseClient,
    table_oid: u32,
) -> Result<Vec<UniqueConstraint>, DatabaseError> {
    client
        .query(CONSTRAINT_QUERY, &[&table_oid])
        .await?
        .iter()
        .map(|row| -> Result<UniqueConstraint, DatabaseError> {
            let contype: i8 = row.try_get("contype")?;
            let kind = match contype as u8 as char {
                'p' => ConstraintKind::Primary,
                'u' => ConstraintKind::Unique,
                other => {
                    return Err(DatabaseError::Validation(format!(
                        "Unexpected constraint type '{other}'"
                    )));
                }
            };

            Ok(UniqueConstraint {
                name: row.try_get("conname")?,
                kind,
                column_nums: row.try_get("conkey")?,
            })
        })
        .collect()
}
