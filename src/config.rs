use crate::overlay::BandMode;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Overlay configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Synthetic dataset parameters.
    pub dataset: DatasetConfig,
    /// Overlay parameters.
    pub overlay: OverlayConfig,
    /// Visual template handed to the renderer.
    #[serde(default)]
    pub theme: Theme,
}

/// X domain of a generated dataset.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Index,
    Date,
}

/// Shape of a generated dataset.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// `base + drift * i` plus independent noise.
    Linear,
    /// Random walk starting at `base` with steps of mean `drift`.
    Walk,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Number of observations.
    pub n_obs: usize,
    /// X domain of the observations.
    pub domain: Domain,
    /// Date of the first observation (date domain only).
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    pub shape: Shape,
    /// Initial level.
    pub base: f64,
    /// Mean change per observation.
    pub drift: f64,
    /// Standard deviation of the noise.
    pub noise_std_dev: f64,
    /// Random seed; OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Rolling mean window sizes, one overlay each.
    #[serde(default = "default_windows")]
    pub windows: Vec<usize>,
    /// Dispersion band multipliers, one overlay each.
    #[serde(default = "default_z_scores")]
    pub z_scores: Vec<f64>,
    #[serde(default)]
    pub band_mode: BandMode,
}

/// Visual template of the rendered charts.
///
/// Set once when the configuration is loaded and only read afterwards.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub template: String,
    pub font_family: String,
    pub font_size: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            template: "plotly_white".to_string(),
            font_family: "Arial".to_string(),
            font_size: 14,
        }
    }
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn default_windows() -> Vec<usize> {
    vec![30]
}

fn default_z_scores() -> Vec<f64> {
    vec![2.0]
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let dataset = &self.dataset;
        check_num(dataset.n_obs, 2..=1_000_000).context("invalid number of observations")?;
        check_finite(dataset.base).context("invalid base level")?;
        check_finite(dataset.drift).context("invalid drift")?;
        check_num(dataset.noise_std_dev, 0.0..1e12).context("invalid noise standard deviation")?;

        let overlay = &self.overlay;
        check_num(overlay.windows.len(), 1..=16).context("invalid number of windows")?;
        for &window in &overlay.windows {
            check_num(window, 1..=dataset.n_obs).context("invalid window size")?;
        }
        check_num(overlay.z_scores.len(), 1..=16).context("invalid number of band multipliers")?;
        for &z in &overlay.z_scores {
            check_num(z, f64::MIN_POSITIVE..100.0).context("invalid band multiplier")?;
        }

        check_num(self.theme.font_size, 1..=200).context("invalid font size")?;
        if self.theme.template.is_empty() {
            bail!("theme template must not be empty");
        }

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_finite(num: f64) -> Result<()> {
    if !num.is_finite() {
        bail!("number must be finite, but is {num:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[dataset]
n_obs = 365
domain = "date"
start_date = "2024-01-01"
shape = "linear"
base = 100.0
drift = 0.5
noise_std_dev = 10.0
seed = 42

[overlay]
windows = [7, 30]
z_scores = [1.0, 2.0]
band_mode = "region"
"#;

    fn parse(contents: &str) -> Result<Config> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(CONFIG).unwrap();

        assert_eq!(config.dataset.n_obs, 365);
        assert_eq!(config.dataset.domain, Domain::Date);
        assert_eq!(
            config.dataset.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(config.dataset.shape, Shape::Linear);
        assert_eq!(config.dataset.seed, Some(42));
        assert_eq!(config.overlay.windows, vec![7, 30]);
        assert_eq!(config.overlay.z_scores, vec![1.0, 2.0]);
        assert_eq!(config.overlay.band_mode, BandMode::Region);
        assert_eq!(config.theme, Theme::default());
    }

    #[test]
    fn test_overlay_defaults() {
        let contents = r#"
[dataset]
n_obs = 100
domain = "index"
shape = "walk"
base = 20.0
drift = 0.0
noise_std_dev = 2.0

[overlay]

[theme]
template = "plotly_dark"
font_family = "Helvetica"
font_size = 12
"#;
        let config = parse(contents).unwrap();

        assert_eq!(config.dataset.seed, None);
        assert_eq!(config.overlay.windows, vec![30]);
        assert_eq!(config.overlay.z_scores, vec![2.0]);
        assert_eq!(config.overlay.band_mode, BandMode::Lines);
        assert_eq!(config.theme.template, "plotly_dark");
        assert_eq!(config.theme.font_size, 12);
    }

    #[test]
    fn test_reject_invalid_values() {
        for (from, to) in [
            ("n_obs = 365", "n_obs = 1"),
            ("windows = [7, 30]", "windows = []"),
            ("windows = [7, 30]", "windows = [7, 0]"),
            ("windows = [7, 30]", "windows = [400]"),
            ("z_scores = [1.0, 2.0]", "z_scores = []"),
            ("z_scores = [1.0, 2.0]", "z_scores = [1.0, 0.0]"),
            ("z_scores = [1.0, 2.0]", "z_scores = [-1.5]"),
            ("noise_std_dev = 10.0", "noise_std_dev = -1.0"),
            ("drift = 0.5", "drift = nan"),
        ] {
            let contents = CONFIG.replace(from, to);
            assert!(parse(&contents).is_err(), "accepted {to:?}");
        }
    }

    #[test]
    fn test_reject_unknown_band_mode() {
        let contents = CONFIG.replace("\"region\"", "\"ribbon\"");
        assert!(parse(&contents).is_err());
    }
}
