// src/tests/mod.rs

//! Tests for the library, one module per library module under test.

pub mod analysis_tests;
pub mod catalog_tests;
pub mod classifier_tests;
