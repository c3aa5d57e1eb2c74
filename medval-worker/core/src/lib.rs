//! Core building blocks of the media validation worker.
//!
//! Holds the queue and storage notification data model, the batch event
//! processor that turns a queue batch into per-message outcomes, and the
//! diagnostic sink capability the processor reports through.

pub mod diagnostics;
pub mod notification;
pub mod outcome;
pub mod processor;
pub mod queue;
