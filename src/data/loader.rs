//! CSV Data Loader Module
//! Reads the three dashboard datasets with Polars and turns them into
//! typed financial records and plain display tables.

use crate::data::{DataSources, FinancialRecord};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

const NAME_COL: &str = "Name";
const YEAR_COL: &str = "Fiscal Year";
const INDICATOR_COL: &str = "Indicator";
const VALUE_COL: &str = "Value";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("{path}: missing column '{column}'")]
    MissingColumn { path: PathBuf, column: String },
    #[error("{path}: row {row} has an empty '{column}' field")]
    EmptyField {
        path: PathBuf,
        row: usize,
        column: &'static str,
    },
    #[error("{path}: row {row} has a non-numeric Value '{value}'")]
    InvalidValue {
        path: PathBuf,
        row: usize,
        value: String,
    },
}

/// A dataset kept as text, shown verbatim in a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Everything read at startup.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub financial: Vec<FinancialRecord>,
    pub top_discharges: RawTable,
    pub discharges_by_location: RawTable,
}

/// Loads the dashboard datasets from a set of CSV paths.
pub struct DataLoader {
    sources: DataSources,
}

impl DataLoader {
    pub fn new(sources: DataSources) -> Self {
        Self { sources }
    }

    /// Read all three files in parallel. Any single failure fails the load.
    pub fn load_all(&self) -> Result<LoadedData, LoaderError> {
        let started = Instant::now();
        let sources = &self.sources;

        let (financial, (top_discharges, discharges_by_location)) = rayon::join(
            || Self::load_financial(&sources.financial),
            || {
                rayon::join(
                    || Self::load_raw_table(&sources.top_discharges),
                    || Self::load_raw_table(&sources.discharges_by_location),
                )
            },
        );

        let data = LoadedData {
            financial: financial?,
            top_discharges: top_discharges?,
            discharges_by_location: discharges_by_location?,
        };

        info!(
            financial_rows = data.financial.len(),
            top_discharge_rows = data.top_discharges.row_count(),
            location_rows = data.discharges_by_location.row_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "datasets loaded"
        );
        Ok(data)
    }

    /// Read a CSV with every column as text.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let csv_err = |source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        };

        // Zero-length inference keeps all columns as strings
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .map_err(csv_err)?
            .collect()
            .map_err(csv_err)?;

        debug!(path = %path.display(), rows = df.height(), "csv read");
        Ok(df)
    }

    /// Parse the financial indicators file into typed records.
    pub fn load_financial(path: &Path) -> Result<Vec<FinancialRecord>, LoaderError> {
        let df = Self::load_csv(path)?;
        Self::parse_financial(&df, path)
    }

    /// Read a file as a display table.
    pub fn load_raw_table(path: &Path) -> Result<RawTable, LoaderError> {
        let df = Self::load_csv(path)?;

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut cells: Vec<Vec<Option<String>>> = Vec::with_capacity(columns.len());
        for name in &columns {
            cells.push(Self::text_column(&df, path, name)?);
        }

        let rows = (0..df.height())
            .map(|i| {
                cells
                    .iter()
                    .map(|col| col.get(i).cloned().flatten().unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(RawTable { columns, rows })
    }

    fn parse_financial(df: &DataFrame, path: &Path) -> Result<Vec<FinancialRecord>, LoaderError> {
        let names = Self::text_column(df, path, NAME_COL)?;
        let years = Self::text_column(df, path, YEAR_COL)?;
        let indicators = Self::text_column(df, path, INDICATOR_COL)?;
        let values = Self::text_column(df, path, VALUE_COL)?;

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let field = |cell: &Option<String>, column: &'static str| {
                cell.as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| LoaderError::EmptyField {
                        path: path.to_path_buf(),
                        row,
                        column,
                    })
            };

            let hospital_name = field(&names[row], NAME_COL)?;
            let fiscal_year = field(&years[row], YEAR_COL)?;
            let indicator = field(&indicators[row], INDICATOR_COL)?;
            let raw_value = field(&values[row], VALUE_COL)?;

            let value = raw_value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| LoaderError::InvalidValue {
                    path: path.to_path_buf(),
                    row,
                    value: raw_value.clone(),
                })?;

            records.push(FinancialRecord::new(
                hospital_name,
                fiscal_year,
                indicator,
                value,
            ));
        }

        Ok(records)
    }

    fn text_column(
        df: &DataFrame,
        path: &Path,
        name: &str,
    ) -> Result<Vec<Option<String>>, LoaderError> {
        let csv_err = |source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let column = df.column(name).map_err(|_| LoaderError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })?;
        let column = column.cast(&DataType::String).map_err(csv_err)?;
        let ca = column.as_materialized_series().str().map_err(csv_err)?;

        Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    const FINANCIAL_CSV: &str = "Name,Fiscal Year,Indicator,Value
Alpha General,2014,Operating Margin,0.031
Alpha General,2015,Operating Margin,0.045
Alpha General,2014,Net Assets, 1250000
";

    fn write_sources(dir: &Path, financial: &str) -> Result<DataSources> {
        let sources = DataSources::in_dir(dir);
        fs::write(&sources.financial, financial)?;
        fs::write(
            &sources.top_discharges,
            "Hospital,DRG,Discharges\nAlpha General,Sepsis,412\nBeta Medical,Heart Failure,\n",
        )?;
        fs::write(
            &sources.discharges_by_location,
            "Hospital,Town,Discharges\nAlpha General,Boston,1200\n",
        )?;
        Ok(sources)
    }

    #[test]
    fn test_load_financial_records() -> Result<()> {
        let dir = tempdir()?;
        let sources = write_sources(dir.path(), FINANCIAL_CSV)?;

        let records = DataLoader::load_financial(&sources.financial)?;
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            FinancialRecord::new("Alpha General", "2014", "Operating Margin", 0.031)
        );
        assert_eq!(records[2].indicator, "Net Assets");
        assert_eq!(records[2].value, 1_250_000.0);
        Ok(())
    }

    #[test]
    fn test_load_all_reads_three_files() -> Result<()> {
        let dir = tempdir()?;
        let sources = write_sources(dir.path(), FINANCIAL_CSV)?;

        let data = DataLoader::new(sources).load_all()?;
        assert_eq!(data.financial.len(), 3);
        assert_eq!(data.top_discharges.columns, vec!["Hospital", "DRG", "Discharges"]);
        assert_eq!(data.top_discharges.row_count(), 2);
        assert_eq!(data.top_discharges.rows[1][2], "");
        assert_eq!(data.discharges_by_location.rows[0][1], "Boston");
        Ok(())
    }

    #[test]
    fn test_missing_file_fails_whole_load() -> Result<()> {
        let dir = tempdir()?;
        let sources = write_sources(dir.path(), FINANCIAL_CSV)?;
        fs::remove_file(&sources.discharges_by_location)?;

        let err = DataLoader::new(sources).load_all().unwrap_err();
        assert!(matches!(err, LoaderError::Csv { .. }));
        Ok(())
    }

    #[test]
    fn test_missing_column_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let sources = write_sources(dir.path(), "Name,Fiscal Year,Value\nAlpha,2014,1\n")?;

        let err = DataLoader::load_financial(&sources.financial).unwrap_err();
        match err {
            LoaderError::MissingColumn { column, .. } => assert_eq!(column, "Indicator"),
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn test_non_numeric_value_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let sources = write_sources(
            dir.path(),
            "Name,Fiscal Year,Indicator,Value\nAlpha,2014,Margin,abc\n",
        )?;

        let err = DataLoader::load_financial(&sources.financial).unwrap_err();
        match err {
            LoaderError::InvalidValue { row, value, .. } => {
                assert_eq!(row, 0);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn test_empty_value_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let sources = write_sources(
            dir.path(),
            "Name,Fiscal Year,Indicator,Value\nAlpha,2014,Margin,1\nAlpha,2015,Margin,\n",
        )?;

        let err = DataLoader::load_financial(&sources.financial).unwrap_err();
        assert!(matches!(err, LoaderError::EmptyField { row: 1, column: "Value", .. }));
        Ok(())
    }
}
