//! Atlas Analysis Orchestration Library
//!
//! This library crate defines the core modules of the analysis service.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`executor`**: The asynchronous task engine. Implements the work queue
//!   (lease-based, at-least-once), the worker pool, and the per-kind dispatch.
//! - **`analysis`**: The predictor/genotype/distance orchestration, including
//!   the genotype fan-out into follow-up distance tasks.
//! - **`search`**: BIGSI genomic search intake, dispatch, and query
//!   fingerprinting.
//! - **`tree`**: The versioned phylogenetic reference tree: version
//!   resolution, document serving, and the startup-built leaf-sample index.
//! - **`report`**: Best-effort delivery of computed results to the external
//!   reporting API.

pub mod analysis;
pub mod config;
pub mod executor;
pub mod report;
pub mod search;
pub mod tree;
