//! Unit tests - public API behavior that needs no database

mod catalog_loading_tests;
mod path_parsing_tests;
mod sql_rendering_tests;
