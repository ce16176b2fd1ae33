pub mod export;
pub mod import;

pub use export::{DatabaseSnapshot, Exporter};
pub use import::{ImportError, ImportOptions, ImportResult, Importer};
