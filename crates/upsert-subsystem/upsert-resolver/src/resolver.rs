// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use serde_json::Value;
use tokio_postgres::types::ToSql;
use tracing::{debug, instrument};

use upsert_model::{
    policy::PolicyLookup,
    subsystem::{UpsertOperation, UpsertSubsystem, UpsertTable},
};
use upsert_sql::{ExpressionBuilder, SQLParam};

use crate::{
    conflict_resolver::plan,
    error::UpsertExecutionError,
    executor::UpsertExecutor,
    projection::{payload_response, payload_selection},
    upsert_request::UpsertRequest,
    upsert_statement::{AliasGenerator, upsert_statement},
    validated_field::ValidatedField,
    value_encoder::{CastingValueEncoder, ValueEncoder},
};

const UPSERTED_ALIAS_PREFIX: &str = "upserted";

/// Resolves the `upsert<T>` mutation fields of a built [`UpsertSubsystem`].
pub struct UpsertResolver {
    subsystem: UpsertSubsystem,
    policy: Arc<dyn PolicyLookup>,
    encoder: Arc<dyn ValueEncoder>,
}

/// A statement ready to run, along with what is needed to shape its result.
pub struct PreparedUpsert<'a> {
    pub operation: &'a UpsertOperation,
    pub table: &'a UpsertTable,
    pub request: UpsertRequest<'a>,
    pub sql: String,
    pub params: Vec<Arc<dyn SQLParam>>,
}

impl UpsertResolver {
    pub fn new(subsystem: UpsertSubsystem, policy: Arc<dyn PolicyLookup>) -> Self {
        Self {
            subsystem,
            policy,
            encoder: Arc::new(CastingValueEncoder),
        }
    }

    pub fn with_encoder(self, encoder: Arc<dyn ValueEncoder>) -> Self {
        Self { encoder, ..self }
    }

    pub fn subsystem(&self) -> &UpsertSubsystem {
        &self.subsystem
    }

    /// Build the statement for `field` without running it. Returns `Ok(None)` if the field is not
    /// one of our mutations.
    pub fn prepare<'a>(
        &'a self,
        field: &'a ValidatedField,
        aliases: &mut AliasGenerator,
    ) -> Result<Option<PreparedUpsert<'a>>, UpsertExecutionError> {
        let Some(operation) = self.subsystem.operation(field.name.as_str()) else {
            return Ok(None);
        };
        let table = self.subsystem.table(operation);

        let request = UpsertRequest::from_arguments(
            &field.arguments,
            operation,
            table,
            self.subsystem.options.enable_conflict_tuning,
        )?;
        let plan = plan(table, &request, self.policy.as_ref())?;

        let alias = aliases.next_alias(UPSERTED_ALIAS_PREFIX);
        let selection = payload_selection(
            table,
            &operation.payload_type_name,
            field,
            &alias,
            self.policy.as_ref(),
        )?;

        let (sql, params) =
            upsert_statement(table, plan, selection, alias, self.encoder.as_ref())?.into_sql();

        Ok(Some(PreparedUpsert {
            operation,
            table,
            request,
            sql,
            params,
        }))
    }

    /// Run the upsert for `field` and return its payload. Returns `Ok(None)` if the field is not
    /// one of our mutations.
    #[instrument(name = "UpsertResolver::resolve", skip_all, fields(operation = %field.name))]
    pub async fn resolve(
        &self,
        field: &ValidatedField,
        executor: &dyn UpsertExecutor,
    ) -> Result<Option<Value>, UpsertExecutionError> {
        let mut aliases = AliasGenerator::new();
        let Some(prepared) = self.prepare(field, &mut aliases)? else {
            return Ok(None);
        };

        debug!("Executing SQL operation: {}", prepared.sql);

        let params: Vec<&(dyn ToSql + Sync)> =
            prepared.params.iter().map(|param| param.as_pg()).collect();
        let mut rows = executor.query_json(&prepared.sql, &params).await?;

        // `DO NOTHING` on a conflict returns no row
        let row = match rows.len() {
            0 => None,
            1 => rows.pop(),
            count => return Err(UpsertExecutionError::NonUniqueResult(count)),
        };

        payload_response(
            prepared.table,
            &prepared.operation.payload_type_name,
            field,
            &prepared.request,
            row,
        )
        .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use test_log::test;

    use upsert_builder::build;
    use upsert_model::{
        policy::SmartTagPolicy, subsystem::BuildOptions, test_fixtures::test_catalog,
    };
    use upsert_sql::database_error::DatabaseError;

    use crate::validated_field::parse_mutation;

    use super::*;

    /// Records each statement with its parameters (debug-formatted) and answers with fixed rows.
    struct RecordingExecutor {
        rows: Vec<Value>,
        statements: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl RecordingExecutor {
        fn returning(rows: Vec<Value>) -> Self {
            Self {
                rows,
                statements: Mutex::new(vec![]),
            }
        }

        fn statements(&self) -> Vec<(String, Vec<String>)> {
            self.statements.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpsertExecutor for RecordingExecutor {
        async fn query_json(
            &self,
            sql: &str,
            params: &[&(dyn ToSql + Sync)],
        ) -> Result<Vec<Value>, DatabaseError> {
            let params = params.iter().map(|param| format!("{param:?}")).collect();
            self.statements
                .lock()
                .unwrap()
                .push((sql.to_string(), params));
            Ok(self.rows.clone())
        }
    }

    fn resolver(enable_conflict_tuning: bool) -> UpsertResolver {
        let subsystem = build(
            &test_catalog(),
            &SmartTagPolicy,
            &BuildOptions {
                enable_conflict_tuning,
            },
        )
        .unwrap();
        UpsertResolver::new(subsystem, Arc::new(SmartTagPolicy))
    }

    fn single_field(query: &str) -> ValidatedField {
        let mut fields = parse_mutation(query, None).unwrap();
        assert_eq!(fields.len(), 1);
        fields.remove(0)
    }

    #[test(tokio::test)]
    async fn upsert_through_where_constraint() {
        let resolver = resolver(false);
        let field = single_field(
            r#"mutation {
                upsertBike(
                    where: { serialNumber: "abc", weight: 20 }
                    input: { clientMutationId: "m1", bike: { make: "Honda", model: "CRF", serialNumber: "abc", weight: 20 } }
                ) {
                    clientMutationId
                    bike { id make }
                }
            }"#,
        );
        let executor = RecordingExecutor::returning(vec![json!({ "bike": { "id": 1, "make": "Honda" } })]);

        let response = resolver.resolve(&field, &executor).await.unwrap();

        assert_eq!(
            executor.statements(),
            vec![(
                r#"WITH "upserted_1" AS (INSERT INTO "public"."bikes" ("weight", "make", "model", "serial_number") VALUES ($1, $2, $3, $4) ON CONFLICT ON CONSTRAINT "serial_weight_unique" DO UPDATE SET "weight" = excluded."weight", "make" = excluded."make", "model" = excluded."model", "serial_number" = excluded."serial_number" RETURNING *) SELECT json_build_object('bike', json_build_object('id', "upserted_1"."id", 'make', "upserted_1"."make"))::text FROM "upserted_1""#
                    .to_string(),
                vec![
                    "20.0".to_string(),
                    r#""Honda""#.to_string(),
                    r#""CRF""#.to_string(),
                    r#""abc""#.to_string(),
                ]
            )]
        );
        assert_eq!(
            response,
            Some(json!({ "clientMutationId": "m1", "bike": { "id": 1, "make": "Honda" } }))
        );
    }

    #[test(tokio::test)]
    async fn omitted_column_is_kept_out_of_update_set() {
        let resolver = resolver(false);
        let field = single_field(
            r#"mutation {
                upsertRole(input: { role: { projectName: "sales", title: "director", name: "Ann", rank: 1 } }) {
                    role { id name }
                }
            }"#,
        );
        let executor = RecordingExecutor::returning(vec![json!({ "role": { "id": 7, "name": "Ann" } })]);

        resolver.resolve(&field, &executor).await.unwrap();

        let (sql, params) = executor.statements().remove(0);
        assert_eq!(
            sql,
            r#"WITH "upserted_1" AS (INSERT INTO "public"."roles" ("project_name", "title", "name", "rank") VALUES ($1, $2, $3, $4) ON CONFLICT ON CONSTRAINT "roles_project_name_title_key" DO UPDATE SET "project_name" = excluded."project_name", "title" = excluded."title", "name" = excluded."name" RETURNING *) SELECT json_build_object('role', json_build_object('id', "upserted_1"."id", 'name', "upserted_1"."name"))::text FROM "upserted_1""#
        );
        assert_eq!(params, vec![r#""sales""#, r#""director""#, r#""Ann""#, "1"]);
    }

    #[test(tokio::test)]
    async fn no_row_on_conflict_yields_null() {
        let resolver = resolver(true);
        let field = single_field(
            r#"mutation {
                upsertBike(
                    input: { bike: { id: 1, make: "Honda" } }
                    onConflict: { doNothing: true }
                ) {
                    __typename
                    aliased: bike { id }
                }
            }"#,
        );
        let executor = RecordingExecutor::returning(vec![]);

        let response = resolver.resolve(&field, &executor).await.unwrap();

        let (sql, _) = executor.statements().remove(0);
        assert!(sql.contains("ON CONFLICT DO NOTHING RETURNING *"), "{sql}");
        assert!(sql.contains("json_build_object('aliased', "), "{sql}");
        assert_eq!(
            response,
            Some(json!({ "__typename": "UpsertBikePayload", "aliased": null }))
        );
    }

    #[test(tokio::test)]
    async fn typename_inside_row_is_filled_in() {
        let resolver = resolver(false);
        let field = single_field(
            r#"mutation {
                upsertBike(input: { bike: { id: 3 } }) { bike { __typename id } }
            }"#,
        );
        let executor = RecordingExecutor::returning(vec![json!({ "bike": { "id": 3 } })]);

        let response = resolver.resolve(&field, &executor).await.unwrap();

        assert_eq!(
            response,
            Some(json!({ "bike": { "__typename": "Bike", "id": 3 } }))
        );
    }

    #[test(tokio::test)]
    async fn unknown_operations_are_not_ours() {
        let resolver = resolver(false);
        let field = single_field("mutation { createBike(data: {}) { id } }");
        let executor = RecordingExecutor::returning(vec![]);

        assert_eq!(resolver.resolve(&field, &executor).await.unwrap(), None);
        assert!(executor.statements().is_empty());
    }

    #[test(tokio::test)]
    async fn caller_errors_skip_the_database() {
        let resolver = resolver(false);
        let field = single_field(
            r#"mutation {
                upsertBike(input: { bike: { make: "Honda", model: "CRF" } }) { bike { id } }
            }"#,
        );
        let executor = RecordingExecutor::returning(vec![]);

        let error = resolver.resolve(&field, &executor).await.unwrap_err();

        assert_eq!(
            error.user_error_message(),
            "Unable to determine upsert unique constraint for given upserted columns: make, model"
        );
        assert!(executor.statements().is_empty());
    }

    #[test(tokio::test)]
    async fn multiple_rows_are_rejected() {
        let resolver = resolver(false);
        let field = single_field(
            r#"mutation { upsertBike(input: { bike: { id: 1 } }) { bike { id } } }"#,
        );
        let executor = RecordingExecutor::returning(vec![json!({}), json!({})]);

        let error = resolver.resolve(&field, &executor).await.unwrap_err();

        assert!(matches!(error, UpsertExecutionError::NonUniqueResult(2)));
        assert_eq!(error.user_error_message(), "Operation failed");
    }

    #[test]
    fn unsupplied_variable_is_left_out_of_insert() {
        let resolver = resolver(false);
        let mut fields = parse_mutation(
            "mutation($trim: String) { upsertBike(input: { bike: { id: 1, trim: $trim } }) { bike { id } } }",
            Some(&serde_json::Map::new()),
        )
        .unwrap();

        let field = fields.remove(0);
        let prepared = resolver
            .prepare(&field, &mut AliasGenerator::new())
            .unwrap()
            .unwrap();

        assert!(!prepared.sql.contains(r#""trim""#), "{}", prepared.sql);
        assert!(prepared.sql.contains(r#"INSERT INTO "public"."bikes" ("id") VALUES ($1)"#), "{}", prepared.sql);
    }

    #[test]
    fn aliases_advance_across_prepared_statements() {
        let resolver = resolver(false);
        let field = single_field(r#"mutation { upsertBike(input: { bike: { id: 1 } }) { bike { id } } }"#);

        let mut aliases = AliasGenerator::new();
        let first = resolver.prepare(&field, &mut aliases).unwrap().unwrap();
        let second = resolver.prepare(&field, &mut aliases).unwrap().unwrap();

        assert!(first.sql.starts_with(r#"WITH "upserted_1" AS"#));
        assert!(second.sql.starts_with(r#"WITH "upserted_2" AS"#));
    }
}
