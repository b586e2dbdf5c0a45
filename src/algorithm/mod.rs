//! Algorithm implementations for coverage determination
//!
//! This module contains the evaluators of the engine, leaf to root:
//! measurement normalization, quality assessment, the binding compliance
//! checks, the advisory engine, diabetic classification context and the
//! pre-eligibility orchestrator that composes them.

pub mod advisory;
pub mod compliance;
pub mod diabetic;
pub mod eligibility;
pub mod normalization;
pub mod quality;
