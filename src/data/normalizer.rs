//! Indicator Normalizer Module
//! Groups financial records by hospital and indicator and annotates each
//! record with its change relative to the dataset's baseline year.

use crate::data::{AnnotatedRecord, Change, FinancialRecord};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

/// A (hospital, indicator) group has no record for the baseline year.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{hospital} / {indicator}: no value for baseline year {baseline_year}")]
pub struct MissingBaselineError {
    pub hospital: String,
    pub indicator: String,
    pub baseline_year: String,
}

/// Annotated records of one hospital for one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub hospital: String,
    pub indicator: String,
    pub baseline_value: f64,
    pub records: Vec<AnnotatedRecord>,
}

impl IndicatorSeries {
    /// Record for a fiscal year, if the hospital reported one.
    pub fn at_year(&self, year: &str) -> Option<&AnnotatedRecord> {
        self.records.iter().find(|r| r.fiscal_year() == year)
    }

    pub fn last(&self) -> Option<&AnnotatedRecord> {
        self.records.last()
    }
}

pub type GroupOutcome = Result<IndicatorSeries, MissingBaselineError>;

/// Records grouped by hospital, then by indicator.
pub type GroupedRecords<'a> = Vec<(String, Vec<(String, Vec<&'a FinancialRecord>)>)>;

/// One indicator group of a hospital.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorGroup {
    pub indicator: String,
    pub outcome: GroupOutcome,
}

/// All indicator groups of one hospital, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct HospitalIndicators {
    pub hospital: String,
    pub indicators: Vec<IndicatorGroup>,
}

impl HospitalIndicators {
    pub fn indicator(&self, indicator: &str) -> Option<&GroupOutcome> {
        self.indicators
            .iter()
            .find(|g| g.indicator == indicator)
            .map(|g| &g.outcome)
    }
}

/// Groups that could not be normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationReport {
    pub normalized_groups: usize,
    pub missing_baselines: Vec<MissingBaselineError>,
}

impl NormalizationReport {
    pub fn is_clean(&self) -> bool {
        self.missing_baselines.is_empty()
    }
}

/// Immutable result of normalization, shared read-only with the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSnapshot {
    pub all_hospitals: Vec<String>,
    pub all_years: Vec<String>,
    pub hospitals: Vec<HospitalIndicators>,
}

impl IndicatorSnapshot {
    pub fn baseline_year(&self) -> Option<&str> {
        self.all_years.first().map(String::as_str)
    }

    pub fn hospital(&self, name: &str) -> Option<&HospitalIndicators> {
        self.hospitals.iter().find(|h| h.hospital == name)
    }

    pub fn series(&self, hospital: &str, indicator: &str) -> Option<&GroupOutcome> {
        self.hospital(hospital)?.indicator(indicator)
    }

    /// Indicator names reported by a hospital, in first-seen order.
    pub fn indicators_for(&self, hospital: &str) -> Vec<&str> {
        self.hospital(hospital)
            .map(|h| h.indicators.iter().map(|g| g.indicator.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn year_index(&self, year: &str) -> Option<usize> {
        self.all_years.binary_search_by(|y| y.as_str().cmp(year)).ok()
    }

    pub fn report(&self) -> NormalizationReport {
        let mut report = NormalizationReport::default();
        for group in self.hospitals.iter().flat_map(|h| &h.indicators) {
            match &group.outcome {
                Ok(_) => report.normalized_groups += 1,
                Err(e) => report.missing_baselines.push(e.clone()),
            }
        }
        report
    }
}

/// Computes baseline-relative change for every financial record.
pub struct IndicatorNormalizer;

impl IndicatorNormalizer {
    /// Distinct fiscal years in ascending order.
    pub fn all_years(records: &[FinancialRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.fiscal_year.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Group by hospital then indicator, preserving first-seen order.
    pub fn group(records: &[FinancialRecord]) -> GroupedRecords<'_> {
        let mut hospitals: GroupedRecords<'_> = Vec::new();
        let mut hospital_idx: HashMap<&str, usize> = HashMap::new();
        let mut indicator_idx: HashMap<(&str, &str), usize> = HashMap::new();

        for record in records {
            let h = *hospital_idx
                .entry(record.hospital_name.as_str())
                .or_insert_with(|| {
                    hospitals.push((record.hospital_name.clone(), Vec::new()));
                    hospitals.len() - 1
                });
            let indicators = &mut hospitals[h].1;
            let i = *indicator_idx
                .entry((record.hospital_name.as_str(), record.indicator.as_str()))
                .or_insert_with(|| {
                    indicators.push((record.indicator.clone(), Vec::new()));
                    indicators.len() - 1
                });
            indicators[i].1.push(record);
        }

        hospitals
    }

    /// Annotate one group against the baseline year.
    pub fn annotate_group(
        hospital: &str,
        indicator: &str,
        records: &[&FinancialRecord],
        baseline_year: &str,
    ) -> GroupOutcome {
        let baseline_value = records
            .iter()
            .find(|r| r.fiscal_year == baseline_year)
            .map(|r| r.value)
            .ok_or_else(|| MissingBaselineError {
                hospital: hospital.to_string(),
                indicator: indicator.to_string(),
                baseline_year: baseline_year.to_string(),
            })?;

        let records = records
            .iter()
            .map(|r| AnnotatedRecord {
                record: (*r).clone(),
                change: Change::between(r.value, baseline_value),
            })
            .collect();

        Ok(IndicatorSeries {
            hospital: hospital.to_string(),
            indicator: indicator.to_string(),
            baseline_value,
            records,
        })
    }

    /// Build the immutable snapshot consumed by the dashboard.
    pub fn normalize(records: &[FinancialRecord]) -> IndicatorSnapshot {
        let all_years = Self::all_years(records);
        let Some(baseline_year) = all_years.first().cloned() else {
            return IndicatorSnapshot::default();
        };

        let grouped = Self::group(records);
        let all_hospitals: Vec<String> = grouped.iter().map(|(h, _)| h.clone()).collect();

        let hospitals: Vec<HospitalIndicators> = grouped
            .into_iter()
            .map(|(hospital, indicators)| {
                let indicators = indicators
                    .into_iter()
                    .map(|(indicator, group)| {
                        let outcome =
                            Self::annotate_group(&hospital, &indicator, &group, &baseline_year);
                        if let Err(e) = &outcome {
                            warn!(
                                hospital = %e.hospital,
                                indicator = %e.indicator,
                                baseline_year = %e.baseline_year,
                                "missing baseline value"
                            );
                        }
                        IndicatorGroup { indicator, outcome }
                    })
                    .collect();
                HospitalIndicators {
                    hospital,
                    indicators,
                }
            })
            .collect();

        debug!(
            hospitals = hospitals.len(),
            years = all_years.len(),
            baseline_year = %baseline_year,
            "normalized indicators"
        );

        IndicatorSnapshot {
            all_hospitals,
            all_years,
            hospitals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn rec(hospital: &str, year: &str, indicator: &str, value: f64) -> FinancialRecord {
        FinancialRecord::new(hospital, year, indicator, value)
    }

    fn sample() -> Vec<FinancialRecord> {
        vec![
            rec("A", "2015", "Margin", 12.0),
            rec("A", "2014", "Margin", 10.0),
            rec("B", "2014", "Margin", 4.0),
            rec("A", "2014", "Net Assets", 200.0),
            rec("B", "2016", "Margin", 3.0),
            rec("A", "2016", "Net Assets", 150.0),
            rec("A", "2016", "Margin", 9.0),
        ]
    }

    #[test]
    fn test_all_years_sorted_distinct() {
        let snapshot = IndicatorNormalizer::normalize(&sample());
        assert_eq!(snapshot.all_years, vec!["2014", "2015", "2016"]);
        assert_eq!(snapshot.baseline_year(), Some("2014"));
        assert_eq!(snapshot.year_index("2016"), Some(2));
        assert_eq!(snapshot.year_index("2013"), None);
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let snapshot = IndicatorNormalizer::normalize(&sample());
        assert_eq!(snapshot.all_hospitals, vec!["A", "B"]);
        assert_eq!(snapshot.indicators_for("A"), vec!["Margin", "Net Assets"]);
        assert_eq!(snapshot.indicators_for("B"), vec!["Margin"]);
        assert!(snapshot.indicators_for("Z").is_empty());

        let series = snapshot.series("A", "Margin").unwrap().as_ref().unwrap();
        let years: Vec<&str> = series.records.iter().map(|r| r.fiscal_year()).collect();
        assert_eq!(years, vec!["2015", "2014", "2016"]);
    }

    #[test]
    fn test_change_matches_formula() {
        let snapshot = IndicatorNormalizer::normalize(&sample());
        for group in snapshot.hospitals.iter().flat_map(|h| &h.indicators) {
            let series = group.outcome.as_ref().unwrap();
            for r in &series.records {
                let expected = (r.value() - series.baseline_value) / series.baseline_value;
                let got = r.change.value().unwrap();
                assert!((got - expected).abs() < EPS);
                if r.fiscal_year() == "2014" {
                    assert_eq!(got, 0.0);
                }
            }
        }
    }

    #[test]
    fn test_two_year_margin_scenario() {
        let records = vec![rec("A", "2014", "Margin", 10.0), rec("A", "2015", "Margin", 12.0)];
        let snapshot = IndicatorNormalizer::normalize(&records);
        assert_eq!(snapshot.all_years, vec!["2014", "2015"]);

        let series = snapshot.series("A", "Margin").unwrap().as_ref().unwrap();
        assert_eq!(series.at_year("2014").unwrap().change, Change::Computed(0.0));
        let later = series.at_year("2015").unwrap().change.value().unwrap();
        assert!((later - 0.2).abs() < EPS);
    }

    #[test]
    fn test_missing_baseline_isolated_per_group() {
        let mut records = sample();
        records.push(rec("C", "2015", "Margin", 1.0));
        records.push(rec("C", "2016", "Margin", 2.0));
        records.push(rec("C", "2015", "Net Assets", 7.0));

        let snapshot = IndicatorNormalizer::normalize(&records);

        for indicator in ["Margin", "Net Assets"] {
            let err = snapshot.series("C", indicator).unwrap().as_ref().unwrap_err();
            assert_eq!(
                err,
                &MissingBaselineError {
                    hospital: "C".to_string(),
                    indicator: indicator.to_string(),
                    baseline_year: "2014".to_string(),
                }
            );
        }
        assert!(snapshot.series("A", "Margin").unwrap().is_ok());
        assert!(snapshot.series("B", "Margin").unwrap().is_ok());

        let report = snapshot.report();
        assert!(!report.is_clean());
        assert_eq!(report.missing_baselines.len(), 2);
        assert_eq!(report.normalized_groups, 3);
    }

    #[test]
    fn test_missing_baseline_message_names_group() {
        let err = MissingBaselineError {
            hospital: "Beta Medical".to_string(),
            indicator: "Operating Margin".to_string(),
            baseline_year: "2014".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Beta Medical / Operating Margin: no value for baseline year 2014"
        );
    }

    #[test]
    fn test_zero_baseline_is_not_computable() {
        let records = vec![rec("A", "2014", "Margin", 0.0), rec("A", "2015", "Margin", 5.0)];
        let snapshot = IndicatorNormalizer::normalize(&records);
        let series = snapshot.series("A", "Margin").unwrap().as_ref().unwrap();
        assert!(series
            .records
            .iter()
            .all(|r| r.change == Change::NotComputable));
        assert!(snapshot.report().is_clean());
    }

    #[test]
    fn test_duplicate_baseline_year_uses_first() {
        let records = vec![
            rec("A", "2014", "Margin", 10.0),
            rec("A", "2014", "Margin", 20.0),
            rec("A", "2015", "Margin", 15.0),
        ];
        let snapshot = IndicatorNormalizer::normalize(&records);
        let series = snapshot.series("A", "Margin").unwrap().as_ref().unwrap();
        assert_eq!(series.baseline_value, 10.0);
        assert_eq!(series.records[1].change, Change::Computed(1.0));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let records = sample();
        let first = IndicatorNormalizer::normalize(&records);
        let second = IndicatorNormalizer::normalize(&records);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let snapshot = IndicatorNormalizer::normalize(&[]);
        assert!(snapshot.all_years.is_empty());
        assert!(snapshot.all_hospitals.is_empty());
        assert_eq!(snapshot.baseline_year(), None);
        assert!(snapshot.report().is_clean());
    }
}
