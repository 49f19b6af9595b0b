// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The schema-extension pass: a pure function from a catalog snapshot to the upsert operations
//! and GraphQL types it implies.

mod builder;
mod sdl;
mod table_type_builder;
mod upsert_type_builder;

pub use builder::build;
pub use sdl::print_sdl;
