// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::{
    parse_query,
    types::{DocumentOperations, OperationType, Selection, SelectionSet},
};
use async_graphql_value::{ConstValue, Name, Value};
use indexmap::IndexMap;

use crate::error::UpsertExecutionError;

/// A selected field with its arguments resolved to constants.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedField {
    pub alias: Option<Name>,
    /// The name of the field.
    pub name: Name,
    /// The arguments to the field, empty if no arguments are provided.
    pub arguments: IndexMap<String, ConstValue>,

    /// The subfields being selected in this field, if it is an object. Empty if no fields are
    /// being selected.
    pub subfields: Vec<ValidatedField>,
}

impl ValidatedField {
    pub fn output_name(&self) -> String {
        self.alias.as_ref().unwrap_or(&self.name).to_string()
    }
}

/// Parse a mutation document into its top-level fields, substituting variables (falling back to
/// their declared defaults).
///
/// Only plain field selections are supported; fragments are rejected.
pub fn parse_mutation(
    query: &str,
    variables: Option<&serde_json::Map<String, serde_json::Value>>,
) -> Result<Vec<ValidatedField>, UpsertExecutionError> {
    let document = parse_query(query)
        .map_err(|e| UpsertExecutionError::Generic(format!("Invalid query: {e}")))?;

    let operation = match document.operations {
        DocumentOperations::Single(operation) => operation.node,
        DocumentOperations::Multiple(_) => {
            return Err(UpsertExecutionError::Generic(
                "Expected a single operation".to_string(),
            ));
        }
    };

    if operation.ty != OperationType::Mutation {
        return Err(UpsertExecutionError::Generic(
            "Expected a mutation".to_string(),
        ));
    }

    // `None` marks a declared variable that was neither supplied nor defaulted
    let mut variable_values: VariableValues = IndexMap::new();
    for definition in operation.variable_definitions {
        let name = definition.node.name.node;
        let supplied = variables.and_then(|variables| variables.get(name.as_str()));

        let value = match (supplied, definition.node.default_value) {
            (Some(value), _) => Some(ConstValue::from_json(value.clone()).map_err(|e| {
                UpsertExecutionError::Generic(format!("Invalid value for variable '{name}': {e}"))
            })?),
            (None, Some(default_value)) => Some(default_value.node),
            (None, None) => None,
        };
        variable_values.insert(name, value);
    }

    validate_selection_set(operation.selection_set.node, &variable_values)
}

type VariableValues = IndexMap<Name, Option<ConstValue>>;

fn validate_selection_set(
    selection_set: SelectionSet,
    variables: &VariableValues,
) -> Result<Vec<ValidatedField>, UpsertExecutionError> {
    selection_set
        .items
        .into_iter()
        .map(|selection| match selection.node {
            Selection::Field(field) => {
                let field = field.node;

                // An argument bound to an unsupplied variable is absent
                let mut arguments = IndexMap::new();
                for (name, value) in field.arguments {
                    if let Some(value) = resolve_value(value.node, variables)? {
                        arguments.insert(name.node.to_string(), value);
                    }
                }

                Ok(ValidatedField {
                    alias: field.alias.map(|alias| alias.node),
                    name: field.name.node,
                    arguments,
                    subfields: validate_selection_set(field.selection_set.node, variables)?,
                })
            }
            Selection::FragmentSpread(_) | Selection::InlineFragment(_) => Err(
                UpsertExecutionError::Generic("Fragments are not supported".to_string()),
            ),
        })
        .collect()
}

/// Substitute variables into `value`. Returns `None` if `value` is itself an unsupplied variable;
/// object fields holding one are dropped, so their keys stay absent. Inside a list an unsupplied
/// variable becomes `null`.
fn resolve_value(
    value: Value,
    variables: &VariableValues,
) -> Result<Option<ConstValue>, UpsertExecutionError> {
    match value {
        Value::Variable(name) => match variables.get(&name) {
            Some(value) => Ok(value.clone()),
            None => Err(UpsertExecutionError::Generic(format!(
                "Variable '{name}' is not defined"
            ))),
        },
        Value::List(items) => items
            .into_iter()
            .map(|item| Ok(resolve_value(item, variables)?.unwrap_or(ConstValue::Null)))
            .collect::<Result<Vec<_>, UpsertExecutionError>>()
            .map(|items| Some(ConstValue::List(items))),
        Value::Object(fields) => {
            let mut object = IndexMap::new();
            for (name, value) in fields {
                if let Some(value) = resolve_value(value, variables)? {
                    object.insert(name, value);
                }
            }
            Ok(Some(ConstValue::Object(object)))
        }
        scalar => scalar
            .into_const_with(|variable| {
                Err(UpsertExecutionError::Generic(format!(
                    "Unexpected variable '{variable}'"
                )))
            })
            .map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_arguments_and_selection() {
        let fields = parse_mutation(
            r#"mutation($weight: Float = 0.0) {
                upsertBike(where: {weight: $weight, serialNumber: "123"}, input: {bike: {model: "kula"}}) {
                    clientMutationId
                    saved: bike { id model }
                }
            }"#,
            None,
        )
        .unwrap();

        assert_eq!(fields.len(), 1);
        let field = &fields[0];
        assert_eq!(field.name.as_str(), "upsertBike");
        assert_eq!(
            field.arguments["where"].clone().into_json().unwrap(),
            serde_json::json!({"weight": 0.0, "serialNumber": "123"})
        );
        assert_eq!(field.subfields[1].output_name(), "saved");
        assert_eq!(field.subfields[1].subfields.len(), 2);
    }

    #[test]
    fn substitutes_variables() {
        let variables = serde_json::json!({"input": {"bike": {"make": "kona"}}});

        let fields = parse_mutation(
            "mutation($input: UpsertBikeInput!) { upsertBike(input: $input) { clientMutationId } }",
            variables.as_object(),
        )
        .unwrap();

        assert_eq!(
            fields[0].arguments["input"].clone().into_json().unwrap(),
            serde_json::json!({"bike": {"make": "kona"}})
        );
    }

    #[test]
    fn unsupplied_variables_leave_keys_absent() {
        let fields = parse_mutation(
            r#"mutation($trim: String, $serial: String, $where: UpsertBikeWhere, $tags: String) {
                upsertBike(
                    where: $where
                    input: { bike: { id: 1, trim: $trim, serialNumber: $serial, model: [$tags] } }
                ) { clientMutationId }
            }"#,
            Some(&serde_json::Map::new()),
        )
        .unwrap();

        let arguments = &fields[0].arguments;
        assert!(!arguments.contains_key("where"));
        assert_eq!(
            arguments["input"].clone().into_json().unwrap(),
            serde_json::json!({"bike": {"id": 1, "model": [null]}})
        );
    }

    #[test]
    fn supplied_null_is_kept() {
        let variables = serde_json::json!({"trim": null});

        let fields = parse_mutation(
            "mutation($trim: String) { upsertBike(input: { bike: { id: 1, trim: $trim } }) { clientMutationId } }",
            variables.as_object(),
        )
        .unwrap();

        assert_eq!(
            fields[0].arguments["input"].clone().into_json().unwrap(),
            serde_json::json!({"bike": {"id": 1, "trim": null}})
        );
    }

    #[test]
    fn rejects_queries() {
        assert!(parse_mutation("{ allBikes { id } }", None).is_err());
        assert!(parse_mutation("mutation { upsertBike(input: $missing) { id } }", None).is_err());
    }
}
