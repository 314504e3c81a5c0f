//! Batch processing: a queue of card images and the worker that reads them.

pub mod queue;
pub mod worker;

pub use queue::{create_work_queue, CardResult, CardWorkItem};
pub use worker::{run_card_worker, OutputFormat};
