//! Result Reporting Module
//!
//! Best-effort delivery of computed results to the external reporting API,
//! decoupled from task execution by an outbound queue.

pub mod publisher;
