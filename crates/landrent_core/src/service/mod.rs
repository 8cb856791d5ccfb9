//! Core use-case services.
//!
//! # Responsibility
//! - Expose the operations the presentation layer calls.
//! - Keep UI layers decoupled from storage details.

pub mod entry_service;
