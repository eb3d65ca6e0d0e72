//! Algoscope Algorithms
//!
//! Sorting and searching algorithms, each normalized into a replayable
//! [`StepList`](algoscope_core::StepList) through one of a few adapters.
//!
//! # Example
//!
//! ```
//! use algoscope_algorithms::{run_algorithm, Category};
//! use serde_json::json;
//!
//! let run = run_algorithm("bubbleSort", &json!([3, 1, 2]), None).unwrap();
//! assert_eq!(run.category, Category::Sorting);
//! assert_eq!(run.final_array, vec![1.0, 2.0, 3.0]);
//! ```

pub mod adapter;
pub mod catalog;
mod error;
mod run;
pub mod searching;
pub mod sorting;
pub mod validate;

pub use adapter::{
    CallbackAdapter, Color, Event, EventLogAdapter, PassThrough, Produced, StepProducer,
    ValueAdapter,
};
pub use catalog::{algorithms, classify, producer_for, AdapterShape, AlgorithmInfo, Category};
pub use error::{Result, ValidationError};
pub use run::{execute, run_algorithm, AlgorithmRun};
