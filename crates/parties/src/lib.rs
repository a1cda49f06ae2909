//! Counterparties module (customers and vendors).
//!
//! This crate contains the counterparty records quotations are addressed to
//! and vendor quotes are sourced from, plus the read-only directory seam the
//! rest of the system resolves them through. Pure domain logic: no IO, no
//! HTTP, no storage.

pub mod counterparty;
pub mod directory;

pub use counterparty::{ContactInfo, Counterparty, CounterpartyKind, PostalAddress};
pub use directory::{Directory, InMemoryDirectory};
