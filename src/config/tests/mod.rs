//! Unit tests for espruino-build settings types.
//!
//! This module contains tests organised into:
//! - [`helpers`] - Shared fixtures and helper functions
//! - [`types_tests`] - Defaults and serialisation tests
//! - [`validation`] - Path and tool command validation tests
//! - [`layer_precedence_tests`] - `MergeComposer` layer precedence tests
//! - [`environment_tests`] - Board parameter parsing tests

mod helpers;
