//! Statistical overlays over an observation series.
//!
//! Every function here is pure: the result depends only on the input series
//! and the parameters, and nothing is cached between calls. None of them
//! depends on how the overlay is eventually drawn.

use crate::error::OverlayError;
use crate::series::{Abscissa, Series};
use crate::stats::{Accumulator, compute_mean};
use serde::{Deserialize, Serialize};

/// Least-squares linear trend of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLine<X> {
    pub slope: f64,
    pub intercept: f64,
    /// Predicted values at the original x values.
    pub series: Series<X>,
}

/// Scalar bounds of a dispersion band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandBounds {
    pub mean: f64,
    pub std_dev: f64,
    pub z: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Shape in which a dispersion band is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandMode {
    /// Two constant series aligned with the input x values.
    #[default]
    Lines,
    /// One rectangle spanning the x range of the input.
    Region,
}

/// Band of mean ± z standard deviations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DispersionBand<X> {
    Lines {
        bounds: BandBounds,
        upper: Series<X>,
        lower: Series<X>,
    },
    Region {
        bounds: BandBounds,
        x_min: X,
        x_max: X,
    },
}

impl<X> DispersionBand<X> {
    pub fn bounds(&self) -> &BandBounds {
        match self {
            DispersionBand::Lines { bounds, .. } => bounds,
            DispersionBand::Region { bounds, .. } => bounds,
        }
    }
}

/// Fit `y = slope * x' + intercept` by ordinary least squares.
///
/// `x'` is the numeric domain given by [`Abscissa`]: the value itself for
/// numeric x, whole days since the earliest observation for dates.
/// The returned series keeps the original x values.
///
/// # Errors
/// [`OverlayError::InsufficientData`] for fewer than 2 observations and
/// [`OverlayError::DegenerateDomain`] when all `x'` are identical or too close
/// together for a finite slope.
pub fn compute_trend<X: Abscissa>(series: &Series<X>) -> Result<TrendLine<X>, OverlayError> {
    let n = series.len();
    OverlayError::check_len(n, 2)?;

    let x = series.numeric_x();
    let y = series.y();

    // Compared exactly: the mean of equal values may differ from them by one ulp.
    if x.iter().all(|&val| val == x[0]) {
        return Err(OverlayError::DegenerateDomain { n });
    }

    let x_mean = compute_mean(&x);
    let y_mean = compute_mean(y);

    let (s_xy, s_xx) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(s_xy, s_xx), (&x_i, &y_i)| {
            let dx = x_i - x_mean;
            (s_xy + dx * (y_i - y_mean), s_xx + dx * dx)
        });

    // Distinct but nearly equal x' can still make `s_xx` underflow to zero.
    if !(s_xx.is_finite() && s_xx > 0.0) {
        return Err(OverlayError::DegenerateDomain { n });
    }

    let slope = s_xy / s_xx;
    let intercept = y_mean - slope * x_mean;
    if !(slope.is_finite() && intercept.is_finite()) {
        return Err(OverlayError::DegenerateDomain { n });
    }

    let y_pred = x.iter().map(|&x_i| slope * x_i + intercept).collect();

    Ok(TrendLine {
        slope,
        intercept,
        series: series.with_y(y_pred),
    })
}

/// Causal moving average over the last `window` observations.
///
/// Element `i` is the mean of `y[max(0, i + 1 - window)..=i]`, so the first
/// `window - 1` elements average the available prefix.
///
/// # Errors
/// [`OverlayError::InvalidParameter`] for `window == 0` and
/// [`OverlayError::InsufficientData`] for an empty series.
pub fn compute_rolling_mean<X: Clone>(
    series: &Series<X>,
    window: usize,
) -> Result<Series<X>, OverlayError> {
    if window == 0 {
        return Err(OverlayError::InvalidParameter {
            param: "window",
            value: window as f64,
        });
    }
    OverlayError::check_len(series.len(), 1)?;

    let y = series.y();
    if window == 1 {
        return Ok(series.with_y(y.to_vec()));
    }

    // Rolling calculation
    let mut sum = 0.0;
    let mut y_mean = Vec::with_capacity(y.len());
    for (i, &y_i) in y.iter().enumerate() {
        sum += y_i;
        if i >= window {
            sum -= y[i - window];
        }
        y_mean.push(sum / (i + 1).min(window) as f64);
    }

    Ok(series.with_y(y_mean))
}

/// Population mean ± `z` population standard deviations of the whole series.
///
/// # Errors
/// [`OverlayError::InvalidParameter`] unless `z` is positive and finite, and
/// [`OverlayError::InsufficientData`] for an empty series.
pub fn band_bounds<X>(series: &Series<X>, z: f64) -> Result<BandBounds, OverlayError> {
    if !(z.is_finite() && z > 0.0) {
        return Err(OverlayError::InvalidParameter {
            param: "z",
            value: z,
        });
    }
    OverlayError::check_len(series.len(), 1)?;

    let report = series.y().iter().copied().collect::<Accumulator>().report();

    Ok(BandBounds {
        mean: report.mean,
        std_dev: report.std_dev,
        z,
        upper: report.mean + z * report.std_dev,
        lower: report.mean - z * report.std_dev,
    })
}

/// Dispersion band of the series in the requested shape.
///
/// See [`band_bounds`] for the errors.
pub fn compute_dispersion_band<X: Abscissa>(
    series: &Series<X>,
    z: f64,
    mode: BandMode,
) -> Result<DispersionBand<X>, OverlayError> {
    let bounds = band_bounds(series, z)?;

    match mode {
        BandMode::Lines => Ok(DispersionBand::Lines {
            bounds,
            upper: series.with_y(vec![bounds.upper; series.len()]),
            lower: series.with_y(vec![bounds.lower; series.len()]),
        }),
        BandMode::Region => {
            let (x_min, x_max) = series
                .x_range()
                .ok_or(OverlayError::InsufficientData {
                    required: 1,
                    actual: 0,
                })?;
            Ok(DispersionBand::Region {
                bounds,
                x_min: x_min.clone(),
                x_max: x_max.clone(),
            })
        }
    }
}
