//! Overlay error types.

use thiserror::Error;

/// Errors that can occur while computing an overlay.
///
/// All of them are precondition violations detected from the shape of the
/// input series or from the parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    /// Too few observations for the requested computation.
    #[error("insufficient data: need {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations provided.
        actual: usize,
    },

    /// The x values have no usable spread in the numeric domain.
    #[error("degenerate domain: the {n} x values have no usable spread")]
    DegenerateDomain {
        /// Number of observations.
        n: usize,
    },

    /// Non-positive (or non-finite) window or multiplier.
    #[error("invalid parameter: {param} = {value} (must be positive)")]
    InvalidParameter {
        /// Parameter name.
        param: &'static str,
        /// Parameter value.
        value: f64,
    },
}

impl OverlayError {
    /// Fail with [`OverlayError::InsufficientData`] when `actual < required`.
    pub fn check_len(actual: usize, required: usize) -> Result<(), Self> {
        if actual < required {
            return Err(OverlayError::InsufficientData { required, actual });
        }
        Ok(())
    }
}
