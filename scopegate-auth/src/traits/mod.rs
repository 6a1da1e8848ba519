// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces to collaborators outside of the engine.
mod id_normalizer;
mod schema_registry;

pub use id_normalizer::IdNormalizer;
pub use schema_registry::SchemaRegistry;
