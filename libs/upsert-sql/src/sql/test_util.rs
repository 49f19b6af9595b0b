// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#![cfg(test)]

//! Test assertions to check SQL statements and parameters.

/// Assert that the given parameters match the expected ones, in order.
///
/// ```no_run
/// assert_params!(actual_params, 1, "hello".to_string());
/// ```
macro_rules! assert_params {
    ($actual_params:expr $(, $expected_param:expr)* $(,)?) => {
        let actual_params = &$actual_params;
        let expected_params: Vec<Box<dyn $crate::sql::SQLParam>> = vec![$(Box::new($expected_param) as Box<dyn $crate::sql::SQLParam>),*];
        assert_eq!(
            actual_params.len(),
            expected_params.len(),
            "Parameter count mismatch"
        );
        for (actual, expected) in actual_params.iter().zip(expected_params.iter()) {
            assert!(
                actual.as_ref() == expected.as_ref(),
                "Parameter mismatch: {:?} != {:?}",
                actual,
                expected
            );
        }
    };
}

/// Assert that the given `(sql, params)` pair matches the expected statement and parameters.
macro_rules! assert_binding {
    ($actual:expr, $expected_stmt:expr $(, $expected_param:expr)* $(,)?) => {
        let (actual_stmt, actual_params) = $actual;
        assert_eq!(actual_stmt, $expected_stmt);
        assert_params!(actual_params $(, $expected_param)*);
    };
}
