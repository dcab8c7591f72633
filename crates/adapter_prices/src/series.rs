//! Daily price series types.
//!
//! A [`PriceSeries`] is built from raw provider [`PriceRow`]s and enforces the
//! series invariants on construction: ascending unique dates and finite,
//! strictly positive prices.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One raw daily row as returned by a price provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    /// Trading date
    pub date: NaiveDate,
    /// Unadjusted closing price
    pub close: Option<f64>,
    /// Closing price adjusted for dividends and splits
    pub adj_close: Option<f64>,
}

impl PriceRow {
    /// Create a row with only an unadjusted close.
    pub fn close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close: Some(close),
            adj_close: None,
        }
    }

    /// Create a row carrying both close fields.
    pub fn adjusted(date: NaiveDate, close: f64, adj_close: f64) -> Self {
        Self {
            date,
            close: Some(close),
            adj_close: Some(adj_close),
        }
    }
}

/// Which close field a series was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    /// Adjusted close
    Adjusted,
    /// Unadjusted close
    Close,
}

impl PriceField {
    /// Pick the field for a batch of rows.
    ///
    /// The adjusted close wins whenever the provider supplied that field for
    /// any row.
    pub fn select(rows: &[PriceRow]) -> Self {
        if rows.iter().any(|r| r.adj_close.is_some()) {
            PriceField::Adjusted
        } else {
            PriceField::Close
        }
    }

    fn extract(&self, row: &PriceRow) -> Option<f64> {
        match self {
            PriceField::Adjusted => row.adj_close,
            PriceField::Close => row.close,
        }
    }
}

/// A single dated price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Price on that date
    pub price: f64,
}

/// Chronologically ordered daily prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
    field: PriceField,
}

impl PriceSeries {
    /// Build a series from provider rows.
    ///
    /// Rows are sorted by date, a duplicated date keeps its last row, and
    /// entries whose selected price is missing, non-finite or non-positive
    /// are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use adapter_prices::{PriceRow, PriceSeries};
    /// use chrono::NaiveDate;
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
    /// let rows = vec![
    ///     PriceRow::close(d(3), 101.0),
    ///     PriceRow::close(d(2), 100.0),
    ///     PriceRow { date: d(4), close: None, adj_close: None },
    /// ];
    /// let series = PriceSeries::from_rows(rows);
    /// assert_eq!(series.prices(), vec![100.0, 101.0]);
    /// ```
    pub fn from_rows(mut rows: Vec<PriceRow>) -> Self {
        let field = PriceField::select(&rows);
        rows.sort_by_key(|r| r.date);

        let mut points: Vec<PricePoint> = Vec::with_capacity(rows.len());
        for row in &rows {
            let Some(price) = field.extract(row) else {
                continue;
            };
            if !price.is_finite() || price <= 0.0 {
                continue;
            }
            let point = PricePoint {
                date: row.date,
                price,
            };
            match points.last_mut() {
                Some(last) if last.date == row.date => *last = point,
                _ => points.push(point),
            }
        }

        Self { points, field }
    }

    /// Dated points in ascending date order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Prices in ascending date order.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// The field the prices were taken from.
    pub fn field(&self) -> PriceField {
        self.field
    }

    /// Most recent point, if any.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Number of prices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series holds no prices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_prefers_adjusted_close_when_present() {
        let rows = vec![
            PriceRow::adjusted(d(1), 100.0, 98.0),
            PriceRow::adjusted(d(4), 102.0, 99.5),
        ];
        let series = PriceSeries::from_rows(rows);

        assert_eq!(series.field(), PriceField::Adjusted);
        assert_eq!(series.prices(), vec![98.0, 99.5]);
    }

    #[test]
    fn test_falls_back_to_close() {
        let rows = vec![PriceRow::close(d(1), 100.0), PriceRow::close(d(4), 102.0)];
        let series = PriceSeries::from_rows(rows);

        assert_eq!(series.field(), PriceField::Close);
        assert_eq!(series.prices(), vec![100.0, 102.0]);
    }

    #[test]
    fn test_adjusted_field_drops_rows_missing_adjusted_value() {
        let rows = vec![
            PriceRow::adjusted(d(1), 100.0, 98.0),
            PriceRow::close(d(4), 102.0),
            PriceRow::adjusted(d(5), 103.0, 101.0),
        ];
        let series = PriceSeries::from_rows(rows);

        assert_eq!(series.prices(), vec![98.0, 101.0]);
    }

    #[test]
    fn test_drops_missing_and_invalid_prices() {
        let rows = vec![
            PriceRow::close(d(1), 100.0),
            PriceRow {
                date: d(4),
                close: None,
                adj_close: None,
            },
            PriceRow::close(d(5), f64::NAN),
            PriceRow::close(d(6), 0.0),
            PriceRow::close(d(7), -3.0),
            PriceRow::close(d(8), 104.0),
        ];
        let series = PriceSeries::from_rows(rows);

        assert_eq!(series.len(), 2);
        assert_eq!(series.prices(), vec![100.0, 104.0]);
    }

    #[test]
    fn test_sorts_and_deduplicates_dates() {
        let rows = vec![
            PriceRow::close(d(5), 105.0),
            PriceRow::close(d(1), 101.0),
            PriceRow::close(d(5), 106.0),
        ];
        let series = PriceSeries::from_rows(rows);

        assert_eq!(series.prices(), vec![101.0, 106.0]);
        assert_eq!(series.last().unwrap().date, d(5));
    }

    #[test]
    fn test_empty_rows_give_empty_series() {
        let series = PriceSeries::from_rows(Vec::new());
        assert!(series.is_empty());
        assert!(series.last().is_none());
    }

    proptest! {
        #[test]
        fn prop_dates_strictly_increasing_and_prices_positive(
            raw in prop::collection::vec((0u32..60, -50.0f64..500.0), 0..80)
        ) {
            let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
            let rows: Vec<PriceRow> = raw
                .iter()
                .map(|(offset, price)| {
                    PriceRow::close(base + chrono::Duration::days(*offset as i64), *price)
                })
                .collect();
            let series = PriceSeries::from_rows(rows);

            for pair in series.points().windows(2) {
                prop_assert!(pair[0].date < pair[1].date);
            }
            for point in series.points() {
                prop_assert!(point.price > 0.0);
            }
        }
    }
}
