//! Observation series data types.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Type usable as the x coordinate of an observation series.
///
/// Maps each x value to the numeric domain used for regression, relative to
/// the smallest x of the series (`origin`).
pub trait Abscissa: Clone + PartialOrd + Debug {
    /// Position of `self` in the numeric domain.
    fn offset_from(&self, origin: &Self) -> f64;
}

impl Abscissa for f64 {
    fn offset_from(&self, _origin: &Self) -> f64 {
        *self
    }
}

impl Abscissa for i64 {
    fn offset_from(&self, _origin: &Self) -> f64 {
        *self as f64
    }
}

impl Abscissa for usize {
    fn offset_from(&self, _origin: &Self) -> f64 {
        *self as f64
    }
}

impl Abscissa for NaiveDate {
    fn offset_from(&self, origin: &Self) -> f64 {
        (*self - *origin).num_days() as f64
    }
}

impl Abscissa for NaiveDateTime {
    // Whole days only: partial days are truncated.
    fn offset_from(&self, origin: &Self) -> f64 {
        (*self - *origin).num_days() as f64
    }
}

/// Ordered sequence of (x, y) observations.
///
/// Built from pairs, so `x` and `y` always have the same length.
/// Duplicate x values are kept as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series<X> {
    x: Vec<X>,
    y: Vec<f64>,
}

impl<X> Series<X> {
    /// Number of observations.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Get the x values of the series.
    pub fn x(&self) -> &[X] {
        &self.x
    }

    /// Get the y values of the series.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Create a series with the same x values and new y values.
    ///
    /// `y` must have the same length as the series.
    pub(crate) fn with_y(&self, y: Vec<f64>) -> Self
    where
        X: Clone,
    {
        debug_assert_eq!(y.len(), self.x.len());
        Self {
            x: self.x.clone(),
            y,
        }
    }
}

impl<X: Abscissa> Series<X> {
    /// Smallest and largest x value, or `None` for an empty series.
    pub fn x_range(&self) -> Option<(&X, &X)> {
        let mut iter = self.x.iter();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), x| {
            (if x < min { x } else { min }, if x > max { x } else { max })
        }))
    }

    /// Map every x value to the numeric domain.
    pub fn numeric_x(&self) -> Vec<f64> {
        match self.x_range() {
            Some((origin, _)) => self.x.iter().map(|x| x.offset_from(origin)).collect(),
            None => Vec::new(),
        }
    }
}

impl<X> FromIterator<(X, f64)> for Series<X> {
    fn from_iter<I: IntoIterator<Item = (X, f64)>>(iter: I) -> Self {
        let (x, y) = iter.into_iter().unzip();
        Self { x, y }
    }
}

/// Dataset stored on disk: an observation series with its x domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Dataset {
    /// Series indexed by ordinal position.
    Indexed(Series<f64>),
    /// Series indexed by calendar date.
    Dated(Series<NaiveDate>),
}

impl Dataset {
    /// Number of observations.
    pub fn len(&self) -> usize {
        match self {
            Dataset::Indexed(series) => series.len(),
            Dataset::Dated(series) => series.len(),
        }
    }
}
