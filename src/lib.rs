//! Invoice selection and simulated payment-authorization workflow.
//!
//! The crate is split into a domain layer (invoices, selection, the
//! workflow vocabulary), an application layer (the timed state machine and
//! the session facade), infrastructure (the tokio timer behind the `Delay`
//! port), and interfaces (CSV catalog loading).

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
