//! Build pipeline for TypeScript projects targeting Espruino boards.
//!
//! `espruino-build` turns a project's TypeScript sources into a single
//! board-ready bundle. It merges the application configuration into a
//! generated module, compiles the sources, copies plain JavaScript alongside
//! the compiler output, strips the CommonJS interop marker Espruino chokes
//! on, and hands the result to the Espruino command-line tool. A live
//! console session can be fed through a watched file.
//!
//! # Architecture
//!
//! The pipeline is a fixed graph of eight named tasks. A small scheduler
//! walks the dependency closure of the selected task, overlapping the tasks
//! that touch disjoint files and halting on the first failure. Task bodies do
//! file work through capability handles on the project directory and reach
//! external tools through the [`tool::CommandRunner`] seam.
//!
//! # Modules
//!
//! - [`api`]: Orchestration entry points used by the binary and embedders
//! - [`app_config`]: Application configuration merge and module generation
//! - [`config`]: Runner settings with layered precedence (CLI > env > file > defaults)
//! - [`error`]: Semantic error types for the application
//! - [`graph`]: Task graph and dependency-ordered scheduler
//! - [`logging`]: Structured logging setup
//! - [`tasks`]: Bodies of the pipeline tasks
//! - [`tool`]: External tool invocation and exit policy

pub mod api;
pub mod app_config;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod tasks;
pub mod tool;
