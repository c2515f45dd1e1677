//! Request-level operations over the loaded artifacts.
//!
//! Each function is synchronous and pure over its inputs; handlers call them
//! directly with the shared [`crate::artifacts::Artifacts`].

pub mod analysis;
pub mod nearby;
pub mod predictor;
pub mod recommendations;
