//! Financial record types shared by the loader, normalizer and charts.

/// One row of the hospital financial indicators dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRecord {
    pub hospital_name: String,
    pub fiscal_year: String,
    pub indicator: String,
    pub value: f64,
}

impl FinancialRecord {
    pub fn new(
        hospital_name: impl Into<String>,
        fiscal_year: impl Into<String>,
        indicator: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            hospital_name: hospital_name.into(),
            fiscal_year: fiscal_year.into(),
            indicator: indicator.into(),
            value,
        }
    }
}

/// Fractional deviation of a value from its group's baseline-year value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    Computed(f64),
    /// Baseline value was zero, so no ratio exists.
    NotComputable,
}

impl Change {
    /// Relative change of `value` against `baseline`.
    pub fn between(value: f64, baseline: f64) -> Self {
        if baseline == 0.0 {
            return Change::NotComputable;
        }
        let ratio = (value - baseline) / baseline;
        if ratio.is_finite() {
            Change::Computed(ratio)
        } else {
            Change::NotComputable
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Change::Computed(v) => Some(v),
            Change::NotComputable => None,
        }
    }
}

/// A record enriched with its baseline-relative change.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    pub record: FinancialRecord,
    pub change: Change,
}

impl AnnotatedRecord {
    pub fn fiscal_year(&self) -> &str {
        &self.record.fiscal_year
    }

    pub fn value(&self) -> f64 {
        self.record.value
    }
}
