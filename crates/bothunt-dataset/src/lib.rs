//! Persistent account feature table and the incremental filler that
//! populates it.
//!
//! A [`Dataset`] is read fully into memory from CSV, mutated one cell at a
//! time by [`RowFiller`], and written back through a [`Persist`] sink after
//! every row that changed, so an interrupted run loses at most one row.

pub mod dataset;
pub mod driver;
pub mod error;
pub mod export;
pub mod filler;
pub mod store;

pub use dataset::{Dataset, DatasetRow, ID_COLUMN, LABEL_COLUMN};
pub use driver::{FillOptions, FillReport};
pub use error::DatasetError;
pub use export::{export_tweets, write_tweets};
pub use filler::{RowFill, RowFiller};
pub use store::{read_dataset, write_dataset, CsvStore, Persist};
