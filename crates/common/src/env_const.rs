// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub const EXO_POSTGRES_URL: &str = "EXO_POSTGRES_URL";
pub const EXO_POSTGRES_USER: &str = "EXO_POSTGRES_USER";
pub const EXO_POSTGRES_PASSWORD: &str = "EXO_POSTGRES_PASSWORD";
pub const EXO_CONNECTION_POOL_SIZE: &str = "EXO_CONNECTION_POOL_SIZE";
pub const EXO_CHECK_CONNECTION_ON_STARTUP: &str = "EXO_CHECK_CONNECTION_ON_STARTUP";

pub const EXO_UPSERT_CONFLICT_TUNING: &str = "EXO_UPSERT_CONFLICT_TUNING";
pub const EXO_UPSERT_SCHEMAS: &str = "EXO_UPSERT_SCHEMAS";

pub const EXO_TEST_POSTGRES_URL: &str = "EXO_TEST_POSTGRES_URL";

pub const EXO_LOG: &str = "EXO_LOG";
