//! Comparison Chart Model
//! Per-indicator line data for the selected hospitals, independent of
//! the drawing backend.

use crate::data::{AnnotatedRecord, Change, IndicatorSeries, IndicatorSnapshot};
use std::cmp::Ordering;

/// Line colours, assigned by position in the selection.
pub const PALETTE: [(u8, u8, u8); 5] = [
    (0x11, 0x9e, 0xb9),
    (0xfc, 0x8d, 0x62),
    (0x66, 0xc2, 0xa5),
    (0xe7, 0x8a, 0xc3),
    (0xe5, 0xc4, 0x94),
];

pub fn palette_rgb(color_index: usize) -> (u8, u8, u8) {
    PALETTE[color_index % PALETTE.len()]
}

/// One hospital's line on an indicator chart.
#[derive(Debug, Clone)]
pub struct SeriesLine<'a> {
    pub hospital: &'a str,
    pub color_index: usize,
    pub series: &'a IndicatorSeries,
}

/// Hover tooltip row for one hospital at one year.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow<'a> {
    pub hospital: &'a str,
    pub color_index: usize,
    pub value: f64,
    pub change: Change,
}

/// Change label drawn at the end of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct EndLabel {
    pub x: f64,
    pub y: f64,
    pub change: Change,
}

/// Everything needed to draw one small-multiple chart.
#[derive(Debug, Clone)]
pub struct ComparisonChart<'a> {
    pub indicator: &'a str,
    pub snapshot: &'a IndicatorSnapshot,
    /// Reverse selection order so the first selected hospital draws on top.
    pub lines: Vec<SeriesLine<'a>>,
    /// Selected hospitals whose series has no baseline value.
    pub missing_baseline: Vec<&'a str>,
}

impl<'a> ComparisonChart<'a> {
    pub fn build(snapshot: &'a IndicatorSnapshot, indicator: &'a str, selected: &[String]) -> Self {
        let mut lines = Vec::new();
        let mut missing_baseline = Vec::new();

        for (color_index, hospital) in selected.iter().enumerate() {
            match snapshot.series(hospital, indicator) {
                Some(Ok(series)) => lines.push(SeriesLine {
                    hospital: series.hospital.as_str(),
                    color_index,
                    series,
                }),
                Some(Err(e)) => missing_baseline.push(e.hospital.as_str()),
                None => {}
            }
        }
        lines.reverse();

        Self {
            indicator,
            snapshot,
            lines,
            missing_baseline,
        }
    }

    /// One chart per indicator the target hospital reports.
    pub fn for_target(
        snapshot: &'a IndicatorSnapshot,
        target: &str,
        selected: &[String],
    ) -> Vec<Self> {
        snapshot
            .indicators_for(target)
            .into_iter()
            .map(|indicator| Self::build(snapshot, indicator, selected))
            .collect()
    }

    pub fn all_years(&self) -> &'a [String] {
        &self.snapshot.all_years
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Plot coordinates of a line: x is the year index, y the change.
    /// Records without a computable change are skipped.
    pub fn points(&self, line: &SeriesLine<'a>) -> Vec<[f64; 2]> {
        line.series
            .records
            .iter()
            .filter_map(|r| self.point(r))
            .collect()
    }

    fn point(&self, record: &AnnotatedRecord) -> Option<[f64; 2]> {
        let x = self.snapshot.year_index(record.fiscal_year())? as f64;
        let y = record.change.value()?;
        Some([x, y])
    }

    /// Joint min/max of computable change across all lines.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        self.lines
            .iter()
            .flat_map(|l| &l.series.records)
            .filter_map(|r| r.change.value())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Year closest to an x position in year-index space. Ties go to the
    /// earlier year.
    pub fn nearest_year(&self, x: f64) -> Option<&'a str> {
        let years = self.all_years();
        let last = years.len().checked_sub(1)?;

        let lower = (x.floor().max(0.0) as usize).min(last);
        let upper = (lower + 1).min(last);
        let idx = if x - lower as f64 > upper as f64 - x {
            upper
        } else {
            lower
        };
        years.get(idx).map(String::as_str)
    }

    /// Tooltip rows for a year, highest change first.
    pub fn tooltip_at(&self, year: &str) -> Vec<TooltipRow<'a>> {
        let mut rows: Vec<TooltipRow<'a>> = self
            .lines
            .iter()
            .filter_map(|line| {
                let record = line.series.at_year(year)?;
                Some(TooltipRow {
                    hospital: line.hospital,
                    color_index: line.color_index,
                    value: record.value(),
                    change: record.change,
                })
            })
            .collect();

        rows.sort_by(|a, b| compare_change_desc(a.change, b.change));
        rows
    }

    /// Focus markers for a hovered year.
    pub fn focus_points(&self, year: &str) -> Vec<(usize, [f64; 2])> {
        self.lines
            .iter()
            .filter_map(|line| {
                let record = line.series.at_year(year)?;
                Some((line.color_index, self.point(record)?))
            })
            .collect()
    }

    pub fn end_label(&self, line: &SeriesLine<'a>) -> Option<EndLabel> {
        let last = line.series.last()?;
        let [x, y] = self.point(last)?;
        Some(EndLabel {
            x,
            y,
            change: last.change,
        })
    }
}

fn compare_change_desc(a: Change, b: Change) -> Ordering {
    match (a, b) {
        (Change::Computed(a), Change::Computed(b)) => b.total_cmp(&a),
        (Change::Computed(_), Change::NotComputable) => Ordering::Less,
        (Change::NotComputable, Change::Computed(_)) => Ordering::Greater,
        (Change::NotComputable, Change::NotComputable) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FinancialRecord, IndicatorNormalizer};

    fn snapshot() -> IndicatorSnapshot {
        let rows = [
            ("A", "2014", "Margin", 10.0),
            ("A", "2015", "Margin", 12.0),
            ("A", "2016", "Margin", 8.0),
            ("B", "2014", "Margin", 5.0),
            ("B", "2015", "Margin", 10.0),
            ("C", "2015", "Margin", 3.0),
            ("D", "2014", "Margin", 0.0),
            ("D", "2015", "Margin", 1.0),
            ("A", "2014", "Net Assets", 100.0),
        ];
        let records: Vec<FinancialRecord> = rows
            .iter()
            .map(|&(h, y, i, v)| FinancialRecord::new(h, y, i, v))
            .collect();
        IndicatorNormalizer::normalize(&records)
    }

    fn selected(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lines_in_reverse_selection_order() {
        let snapshot = snapshot();
        let chart = ComparisonChart::build(&snapshot, "Margin", &selected(&["B", "A", "C"]));

        let hospitals: Vec<&str> = chart.lines.iter().map(|l| l.hospital).collect();
        assert_eq!(hospitals, vec!["A", "B"]);
        assert_eq!(chart.lines[0].color_index, 1);
        assert_eq!(chart.lines[1].color_index, 0);
        assert_eq!(chart.missing_baseline, vec!["C"]);
    }

    #[test]
    fn test_hospital_without_indicator_is_skipped() {
        let snapshot = snapshot();
        let chart = ComparisonChart::build(&snapshot, "Net Assets", &selected(&["A", "B"]));
        assert_eq!(chart.lines.len(), 1);
        assert!(chart.missing_baseline.is_empty());
    }

    #[test]
    fn test_y_range_spans_selected_lines() {
        let snapshot = snapshot();
        let chart = ComparisonChart::build(&snapshot, "Margin", &selected(&["A", "B"]));
        let (lo, hi) = chart.y_range().unwrap();
        assert!((lo - -0.2).abs() < 1e-12);
        assert!((hi - 1.0).abs() < 1e-12);

        let empty = ComparisonChart::build(&snapshot, "Margin", &selected(&["D"]));
        assert_eq!(empty.y_range(), None);
    }

    #[test]
    fn test_points_skip_non_computable() {
        let snapshot = snapshot();
        let chart = ComparisonChart::build(&snapshot, "Margin", &selected(&["D", "B"]));
        let d = chart.lines.iter().find(|l| l.hospital == "D").unwrap();
        assert!(chart.points(d).is_empty());
        assert_eq!(chart.end_label(d), None);

        let b = chart.lines.iter().find(|l| l.hospital == "B").unwrap();
        assert_eq!(chart.points(b), vec![[0.0, 0.0], [1.0, 1.0]]);
        assert_eq!(
            chart.end_label(b),
            Some(EndLabel {
                x: 1.0,
                y: 1.0,
                change: Change::Computed(1.0)
            })
        );
    }

    #[test]
    fn test_nearest_year() {
        let snapshot = snapshot();
        let chart = ComparisonChart::build(&snapshot, "Margin", &selected(&["A"]));
        assert_eq!(chart.nearest_year(-3.0), Some("2014"));
        assert_eq!(chart.nearest_year(0.4), Some("2014"));
        assert_eq!(chart.nearest_year(0.5), Some("2014"));
        assert_eq!(chart.nearest_year(0.6), Some("2015"));
        assert_eq!(chart.nearest_year(1.9), Some("2016"));
        assert_eq!(chart.nearest_year(42.0), Some("2016"));

        let empty = IndicatorSnapshot::default();
        let chart = ComparisonChart::build(&empty, "Margin", &[]);
        assert_eq!(chart.nearest_year(0.0), None);
    }

    #[test]
    fn test_tooltip_sorted_by_change_desc() {
        let snapshot = snapshot();
        let chart = ComparisonChart::build(&snapshot, "Margin", &selected(&["A", "D", "B"]));

        let rows = chart.tooltip_at("2015");
        let hospitals: Vec<&str> = rows.iter().map(|r| r.hospital).collect();
        assert_eq!(hospitals, vec!["B", "A", "D"]);
        assert_eq!(rows[0].value, 10.0);
        assert_eq!(rows[2].change, Change::NotComputable);

        let rows = chart.tooltip_at("2016");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hospital, "A");
    }

    #[test]
    fn test_focus_points() {
        let snapshot = snapshot();
        let chart = ComparisonChart::build(&snapshot, "Margin", &selected(&["A", "B"]));
        let focus = chart.focus_points("2015");
        assert_eq!(focus.len(), 2);
        assert!(focus.contains(&(1, [1.0, 1.0])));
    }

    #[test]
    fn test_for_target_follows_target_indicators() {
        let snapshot = snapshot();
        let charts = ComparisonChart::for_target(&snapshot, "A", &selected(&["A", "B"]));
        let indicators: Vec<&str> = charts.iter().map(|c| c.indicator).collect();
        assert_eq!(indicators, vec!["Margin", "Net Assets"]);

        assert!(ComparisonChart::for_target(&snapshot, "Nobody", &selected(&["A"])).is_empty());
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_rgb(0), (0x11, 0x9e, 0xb9));
        assert_eq!(palette_rgb(5), palette_rgb(0));
    }
}
