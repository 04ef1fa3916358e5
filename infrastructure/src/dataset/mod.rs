//! Dataset file readers.

mod json_dataset;

pub use json_dataset::JsonDataset;
