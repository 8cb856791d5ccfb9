//! Domain model for land-rental contracts.
//!
//! # Responsibility
//! - Define the entry aggregate and the person/coordinate records it owns or
//!   references.
//! - Keep payload validation next to the data it checks.
//!
//! # Invariants
//! - A person is identified by its exact (first name, last name) pair.
//! - Coordinates belong to exactly one entry and keep their input order.

pub mod entry;
pub mod person;
