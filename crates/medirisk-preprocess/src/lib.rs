//! Clinical record preprocessing.
//!
//! Turns a raw, headerless heart-disease record file into a cleaned,
//! fully numeric file ready for model training and downstream reuse.
//!
//! # Column layout
//!
//! | Columns | Content |
//! |---------|---------|
//! | 0-12 | Features in schema order (`age` ... `thal`) |
//! | 13 | Target severity (0 = absent, 1-4 = present) |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use medirisk_preprocess::{PreprocessOptions, Preprocessor};
//!
//! fn main() -> medirisk_common::Result<()> {
//!     let preprocessor = Preprocessor::new(PreprocessOptions::default())?;
//!     let report = preprocessor.run(
//!         Path::new("data/heart_raw.csv"),
//!         Path::new("data/heart_cleaned.csv"),
//!     )?;
//!     println!("{} rows, {} values imputed", report.rows, report.total_missing());
//!     Ok(())
//! }
//! ```

pub mod impute;
pub mod io;
pub mod pipeline;

pub use io::{read_cleaned_records, read_raw_records, write_cleaned_records};
pub use pipeline::{
    preprocess, CleanedBatch, ColumnSummary, PreprocessOptions, PreprocessReport, Preprocessor,
    RawRecord, DEFAULT_SENTINEL,
};
