//! Integration tests - translated queries executed against SQLite
//!
//! These tests run every strategy's SQL on the same in-memory data and check
//! that the strategies agree.

mod fixtures;
mod strategy_equivalence_tests;
mod translator_behavior_tests;
