//! Utility functions for code generation and link construction.
//!
//! - [`code_generator`] - Random short codes, escalation policy, prefix validation
//! - [`short_link`] - Percent-escaped public links and redirect targets

pub mod code_generator;
pub mod short_link;
