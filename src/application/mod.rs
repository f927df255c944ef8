//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `WorkflowEngine` state machine that drives a
//! simulated payment attempt on its own timers, and the `PaymentSession`
//! facade that a presentation layer talks to.

pub mod engine;
pub mod session;
