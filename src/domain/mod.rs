//! Domain layer: invoices, selection bookkeeping, and the workflow
//! vocabulary. Pure data and rules; no timers, no I/O.

pub mod invoice;
pub mod ports;
pub mod selection;
pub mod workflow;
