//! Reference Tree Module
//!
//! Handles the versioned phylogenetic reference tree: resolving symbolic
//! version labels, serving tree documents, and deriving the leaf-sample set
//! that backs tree-distance queries.

pub mod fetch;
pub mod handlers;
pub mod samples;
pub mod version;

#[cfg(test)]
mod tests;
