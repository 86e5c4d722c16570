//! relbench - relation query strategies for an ORM, side by side
//!
//! This crate rewrites relation traversals declared against a model catalog
//! into SQL and benchmarks the resulting query shapes:
//! - Model catalogs declared in YAML (tables, keys, global scopes, relations)
//! - Relation paths translated into joins, IN-subqueries or EXISTS-subqueries
//! - SQL generation from an in-memory query representation
//! - A SQLite harness that seeds data and times each strategy

pub mod config;
pub mod harness;
pub mod model_catalog;
pub mod query_builder;
pub mod relation_translator;
pub mod sql_generator;
