// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Upserts against a live database. Skipped unless `EXO_TEST_POSTGRES_URL` is set.

use std::sync::Arc;

use serde_json::{Value, json};
use test_log::test;

use upsert_builder::build;
use upsert_model::{policy::SmartTagPolicy, subsystem::BuildOptions};
use upsert_resolver::{UpsertExecutionError, UpsertResolver, parse_mutation};
use upsert_sql::{DatabaseClient, schema::CatalogSpec};

const INIT_SCRIPT: &str = r#"
    CREATE TABLE bikes (
        id serial PRIMARY KEY,
        weight real,
        make varchar,
        model varchar,
        serial_number varchar,
        trim varchar DEFAULT 'standard',
        CONSTRAINT serial_weight_unique UNIQUE (serial_number, weight)
    );
    CREATE TABLE roles (
        id serial PRIMARY KEY,
        project_name varchar,
        title varchar,
        name varchar,
        rank integer,
        updated timestamptz,
        UNIQUE (project_name, title)
    );
    COMMENT ON COLUMN roles.rank IS E'@omit updateOnConflict';
    CREATE TABLE no_primary_keys (name text);
"#;

async fn resolver(client: &DatabaseClient) -> UpsertResolver {
    let catalog = CatalogSpec::from_live_database(client, &["public".to_string()])
        .await
        .unwrap();
    let subsystem = build(
        &catalog,
        &SmartTagPolicy,
        &BuildOptions {
            enable_conflict_tuning: true,
        },
    )
    .unwrap();
    UpsertResolver::new(subsystem, Arc::new(SmartTagPolicy))
}

async fn execute(
    resolver: &UpsertResolver,
    client: &DatabaseClient,
    query: &str,
) -> Result<Value, UpsertExecutionError> {
    let field = parse_mutation(query, None).unwrap().remove(0);
    Ok(resolver.resolve(&field, client).await?.unwrap())
}

fn upsert_bike(fields: &str) -> String {
    format!(
        r#"mutation {{ upsertBike(input: {{ bike: {{ {fields} }} }}) {{ clientMutationId }} }}"#
    )
}

/// `(make, model, weight, serial_number, trim)`
type BikeRow = (
    Option<String>,
    Option<String>,
    Option<f32>,
    Option<String>,
    Option<String>,
);

async fn bikes(client: &DatabaseClient) -> Vec<BikeRow> {
    client
        .query(
            "SELECT make, model, weight, serial_number, trim FROM bikes ORDER BY id",
            &[],
        )
        .await
        .unwrap()
        .iter()
        .map(|row| (row.get(0), row.get(1), row.get(2), row.get(3), row.get(4)))
        .collect()
}

/// `(name, rank)` of every role, by id.
async fn roles(client: &DatabaseClient) -> Vec<(Option<String>, Option<i32>)> {
    client
        .query("SELECT name, rank FROM roles ORDER BY id", &[])
        .await
        .unwrap()
        .iter()
        .map(|row| (row.get(0), row.get(1)))
        .collect()
}

fn upsert_director(name: &str, rank: i32, on_conflict: &str) -> String {
    format!(
        r#"mutation {{
            upsertRole(
                {on_conflict}
                where: {{ projectName: "sales", title: "director" }}
                input: {{ role: {{ projectName: "sales", title: "director", name: "{name}", rank: {rank} }} }}
            ) {{ role {{ name rank }} }}
        }}"#
    )
}

#[test(tokio::test)]
async fn upsert_without_unique_key_inserts_through_primary_key() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;

        execute(&resolver, &client, &upsert_bike(r#"make: "kona", model: "kula deluxe", weight: 0.0"#))
            .await
            .unwrap();

        let bikes = bikes(&client).await;
        assert_eq!(bikes.len(), 1);
        assert_eq!(bikes[0].0.as_deref(), Some("kona"));
    })
    .await;
}

#[test(tokio::test)]
async fn repeated_upsert_on_unique_key_updates_one_row() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;

        execute(
            &resolver,
            &client,
            &upsert_bike(r#"make: "kona", model: "kula deluxe", weight: 20, serialNumber: "123""#),
        )
        .await
        .unwrap();
        execute(
            &resolver,
            &client,
            &upsert_bike(r#"make: "kona", model: "updated_model", weight: 20, serialNumber: "123""#),
        )
        .await
        .unwrap();

        let bikes = bikes(&client).await;
        assert_eq!(bikes.len(), 1);
        assert_eq!(bikes[0].1.as_deref(), Some("updated_model"));
        assert_eq!(bikes[0].4.as_deref(), Some("standard"));
    })
    .await;
}

#[test(tokio::test)]
async fn pooled_upsert_with_unsupplied_variable_keeps_column_default() {
    upsert_sql::testing::with_pool_init_script(INIT_SCRIPT, |client, pool| async move {
        let resolver = resolver(&client).await;
        let query = r#"mutation($model: String, $trim: String) {
            upsertBike(input: { bike: { make: "kona", model: $model, weight: 20, serialNumber: "123", trim: $trim } }) {
                bike { model trim }
            }
        }"#;

        for model in ["kula deluxe", "updated_model"] {
            let variables = json!({ "model": model });
            let field = parse_mutation(query, variables.as_object())
                .unwrap()
                .remove(0);
            let response = resolver.resolve(&field, &pool).await.unwrap().unwrap();
            assert_eq!(response, json!({ "bike": { "model": model, "trim": "standard" } }));
        }

        let bikes = bikes(&client).await;
        assert_eq!(bikes.len(), 1);
        assert_eq!(bikes[0].1.as_deref(), Some("updated_model"));
        assert_eq!(bikes[0].4.as_deref(), Some("standard"));
    })
    .await;
}

#[test(tokio::test)]
async fn zero_is_a_value() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;

        execute(
            &resolver,
            &client,
            &upsert_bike(r#"make: "kona", model: "kula deluxe", weight: 0.0, serialNumber: "123""#),
        )
        .await
        .unwrap();
        execute(
            &resolver,
            &client,
            r#"mutation {
                upsertBike(
                    where: { weight: 0.0, serialNumber: "123" }
                    input: { bike: { model: "kula deluxe v2", weight: 0.0, serialNumber: "123" } }
                ) { bike { weight model } }
            }"#,
        )
        .await
        .unwrap();

        let bikes = bikes(&client).await;
        assert_eq!(bikes.len(), 1);
        assert_eq!(bikes[0].1.as_deref(), Some("kula deluxe v2"));
        assert_eq!(bikes[0].2, Some(0.0));
    })
    .await;
}

#[test(tokio::test)]
async fn where_values_fill_in_omitted_input() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;

        let response = execute(
            &resolver,
            &client,
            r#"mutation {
                upsertBike(
                    where: { weight: 0.0, serialNumber: "123" }
                    input: { clientMutationId: "c1", bike: { model: "kula deluxe v2" } }
                ) { clientMutationId bike { serialNumber model } }
            }"#,
        )
        .await
        .unwrap();

        assert_eq!(
            response,
            json!({
                "clientMutationId": "c1",
                "bike": { "serialNumber": "123", "model": "kula deluxe v2" }
            })
        );
        let bikes = bikes(&client).await;
        assert_eq!(bikes.len(), 1);
        assert_eq!(bikes[0].3.as_deref(), Some("123"));
        assert_eq!(bikes[0].2, Some(0.0));
    })
    .await;
}

#[test(tokio::test)]
async fn mismatched_where_value_changes_nothing() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;

        execute(
            &resolver,
            &client,
            &upsert_bike(r#"make: "kona", model: "kula deluxe", weight: 0.0, serialNumber: "123""#),
        )
        .await
        .unwrap();
        let before = bikes(&client).await;

        let error = execute(
            &resolver,
            &client,
            r#"mutation {
                upsertBike(
                    where: { weight: 0.0, serialNumber: "123" }
                    input: { bike: { model: "kula deluxe v2", weight: 0.0, serialNumber: "1234" } }
                ) { clientMutationId }
            }"#,
        )
        .await
        .unwrap_err();

        assert_eq!(
            error.user_error_message(),
            "Value passed in the input for serialNumber does not match the where clause value."
        );
        assert_eq!(bikes(&client).await, before);
    })
    .await;
}

#[test(tokio::test)]
async fn tables_without_unique_keys_get_no_mutation() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;
        let subsystem = resolver.subsystem();

        assert!(subsystem.operation("upsertBike").is_some());
        assert!(subsystem.operation("upsertRole").is_some());
        assert!(subsystem.operation("upsertNoPrimaryKey").is_none());
        assert!(subsystem.get_type("UpsertNoPrimaryKeyInput").is_none());
    })
    .await;
}

#[test(tokio::test)]
async fn omitted_column_keeps_its_value_on_conflict() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;

        execute(&resolver, &client, &upsert_director("jerry", 1, "")).await.unwrap();
        let response = execute(&resolver, &client, &upsert_director("frank", 2, ""))
            .await
            .unwrap();

        assert_eq!(response, json!({ "role": { "name": "frank", "rank": 1 } }));
        assert_eq!(roles(&client).await, vec![(Some("frank".to_string()), Some(1))]);
    })
    .await;
}

#[test(tokio::test)]
async fn empty_update_set_leaves_row_untouched() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;
        let on_conflict = "onConflict: { doUpdate: { projectName: ignore, title: ignore, name: ignore } }";

        execute(&resolver, &client, &upsert_director("jerry", 1, on_conflict))
            .await
            .unwrap();
        let response = execute(&resolver, &client, &upsert_director("frank", 2, on_conflict))
            .await
            .unwrap();

        assert_eq!(response, json!({ "role": null }));
        assert_eq!(roles(&client).await, vec![(Some("jerry".to_string()), Some(1))]);
    })
    .await;
}

#[test(tokio::test)]
async fn do_nothing_leaves_row_untouched() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;
        let on_conflict = "onConflict: { doNothing: true }";

        execute(&resolver, &client, &upsert_director("jerry", 1, on_conflict))
            .await
            .unwrap();
        execute(&resolver, &client, &upsert_director("frank", 2, on_conflict))
            .await
            .unwrap();

        assert_eq!(roles(&client).await, vec![(Some("jerry".to_string()), Some(1))]);
    })
    .await;
}

#[test(tokio::test)]
async fn current_timestamp_is_applied_on_conflict() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;
        let on_conflict = "onConflict: { doUpdate: { name: ignore, updated: current_timestamp } }";

        execute(&resolver, &client, &upsert_director("jerry", 1, on_conflict))
            .await
            .unwrap();
        execute(&resolver, &client, &upsert_director("frank", 2, on_conflict))
            .await
            .unwrap();

        let row = client
            .query_one("SELECT name, updated IS NOT NULL FROM roles", &[])
            .await
            .unwrap();
        assert_eq!(row.get::<_, Option<String>>(0).as_deref(), Some("jerry"));
        assert!(row.get::<_, bool>(1));
    })
    .await;
}

#[test(tokio::test)]
async fn database_errors_are_reported_verbatim() {
    upsert_sql::testing::with_init_script(INIT_SCRIPT, |client| async move {
        let resolver = resolver(&client).await;

        // Two existing rows, each unique on its own, then an update that would merge them
        execute(&resolver, &client, &upsert_bike(r#"id: 1, weight: 1, serialNumber: "a""#))
            .await
            .unwrap();
        execute(&resolver, &client, &upsert_bike(r#"id: 2, weight: 2, serialNumber: "b""#))
            .await
            .unwrap();
        let error = execute(&resolver, &client, &upsert_bike(r#"id: 2, weight: 1, serialNumber: "a""#))
            .await
            .unwrap_err();

        assert!(
            error
                .user_error_message()
                .starts_with("duplicate key value violates unique constraint"),
            "{}",
            error.user_error_message()
        );
    })
    .await;
}
