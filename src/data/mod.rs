//! Data module - CSV loading and indicator normalization

mod loader;
mod normalizer;
mod record;
mod sources;

pub use loader::{DataLoader, LoadedData, RawTable};
pub use normalizer::{IndicatorNormalizer, IndicatorSeries, IndicatorSnapshot};
pub use record::{AnnotatedRecord, Change, FinancialRecord};
pub use sources::DataSources;
