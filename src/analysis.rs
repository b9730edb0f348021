use crate::config::{Config, Domain, Theme};
use crate::error::OverlayError;
use crate::overlay::{BandMode, compute_dispersion_band, compute_rolling_mean, compute_trend};
use crate::series::{Abscissa, Dataset, Series};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub trait Overlay<X> {
    fn name(&self) -> &'static str;
    fn params(&self) -> serde_json::Value;
    fn compute(&self, series: &Series<X>) -> Result<serde_json::Value, OverlayError>;
}

pub struct Trend;

impl<X: Abscissa + Serialize> Overlay<X> for Trend {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn params(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    fn compute(&self, series: &Series<X>) -> Result<serde_json::Value, OverlayError> {
        let trend = compute_trend(series)?;
        Ok(serde_json::json!(trend))
    }
}

pub struct RollingMean {
    window: usize,
}

impl<X: Clone + Serialize> Overlay<X> for RollingMean {
    fn name(&self) -> &'static str {
        "rolling_mean"
    }

    fn params(&self) -> serde_json::Value {
        serde_json::json!({ "window": self.window })
    }

    fn compute(&self, series: &Series<X>) -> Result<serde_json::Value, OverlayError> {
        let rolling = compute_rolling_mean(series, self.window)?;
        Ok(serde_json::json!(rolling))
    }
}

pub struct ZScoreBand {
    z: f64,
    mode: BandMode,
}

impl<X: Abscissa + Serialize> Overlay<X> for ZScoreBand {
    fn name(&self) -> &'static str {
        "dispersion_band"
    }

    fn params(&self) -> serde_json::Value {
        serde_json::json!({ "z": self.z, "mode": self.mode })
    }

    fn compute(&self, series: &Series<X>) -> Result<serde_json::Value, OverlayError> {
        let band = compute_dispersion_band(series, self.z, self.mode)?;
        log::debug!("{:?}", band.bounds());
        Ok(serde_json::json!(band))
    }
}

/// Outcome of one overlay over one dataset.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OverlayEntry {
    Computed {
        name: &'static str,
        params: serde_json::Value,
        result: serde_json::Value,
    },
    Skipped {
        name: &'static str,
        params: serde_json::Value,
        reason: String,
    },
}

/// Overlays of one dataset, ready to be handed to a renderer.
#[derive(Debug, Serialize)]
pub struct Report {
    pub n_obs: usize,
    pub domain: Domain,
    pub theme: Theme,
    pub overlays: Vec<OverlayEntry>,
}

pub struct Analyzer<X> {
    overlay_ptr_vec: Vec<Box<dyn Overlay<X>>>,
}

impl<X: Abscissa + Serialize> Analyzer<X> {
    pub fn new(cfg: &Config) -> Self {
        let mut overlay_ptr_vec: Vec<Box<dyn Overlay<X>>> = Vec::new();
        overlay_ptr_vec.push(Box::new(Trend));
        for &window in &cfg.overlay.windows {
            overlay_ptr_vec.push(Box::new(RollingMean { window }));
        }
        for &z in &cfg.overlay.z_scores {
            overlay_ptr_vec.push(Box::new(ZScoreBand {
                z,
                mode: cfg.overlay.band_mode,
            }));
        }
        Self { overlay_ptr_vec }
    }

    /// Compute every overlay; the ones that fail are reported as skipped.
    pub fn analyze(&self, series: &Series<X>) -> Vec<OverlayEntry> {
        self.overlay_ptr_vec
            .iter()
            .map(|overlay| {
                let name = overlay.name();
                let params = overlay.params();
                match overlay.compute(series) {
                    Ok(result) => {
                        log::debug!("computed {name} overlay {params}");
                        OverlayEntry::Computed {
                            name,
                            params,
                            result,
                        }
                    }
                    Err(error) => {
                        log::warn!("skipped {name} overlay {params}: {error}");
                        OverlayEntry::Skipped {
                            name,
                            params,
                            reason: error.to_string(),
                        }
                    }
                }
            })
            .collect()
    }
}

/// Build the overlay report of a dataset.
pub fn analyze_dataset(dataset: &Dataset, cfg: &Config) -> Report {
    let (domain, overlays) = match dataset {
        Dataset::Indexed(series) => (Domain::Index, Analyzer::new(cfg).analyze(series)),
        Dataset::Dated(series) => (Domain::Date, Analyzer::new(cfg).analyze(series)),
    };
    Report {
        n_obs: dataset.len(),
        domain,
        theme: cfg.theme.clone(),
        overlays,
    }
}

/// Save a report as pretty-printed JSON.
pub fn save_report<P: AsRef<Path>>(report: &Report, file: P) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).context("failed to serialize report")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatasetConfig, OverlayConfig, Shape};
    use chrono::NaiveDate;

    fn config(windows: Vec<usize>, z_scores: Vec<f64>, band_mode: BandMode) -> Config {
        Config {
            dataset: DatasetConfig {
                n_obs: 5,
                domain: Domain::Index,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                shape: Shape::Linear,
                base: 0.0,
                drift: 1.0,
                noise_std_dev: 0.0,
                seed: Some(0),
            },
            overlay: OverlayConfig {
                windows,
                z_scores,
                band_mode,
            },
            theme: Theme::default(),
        }
    }

    #[test]
    fn test_report_of_indexed_dataset() {
        let series: Series<f64> = (0..5).map(|i| (i as f64, i as f64 + 1.0)).collect();
        let report = analyze_dataset(&Dataset::Indexed(series), &config(vec![2], vec![1.0], BandMode::Lines));

        assert_eq!(report.n_obs, 5);
        assert_eq!(report.domain, Domain::Index);
        assert_eq!(report.overlays.len(), 3);

        let value = serde_json::to_value(&report).unwrap();
        let overlays = value["overlays"].as_array().unwrap();
        assert!(overlays.iter().all(|entry| entry["status"] == "computed"));

        assert_eq!(overlays[0]["name"], "trend");
        assert!((overlays[0]["result"]["slope"].as_f64().unwrap() - 1.0).abs() < 1e-10);

        assert_eq!(overlays[1]["name"], "rolling_mean");
        assert_eq!(overlays[1]["params"]["window"], 2);
        assert_eq!(
            overlays[1]["result"]["y"],
            serde_json::json!([1.0, 1.5, 2.5, 3.5, 4.5])
        );

        assert_eq!(overlays[2]["name"], "dispersion_band");
        assert_eq!(overlays[2]["params"]["z"], 1.0);
        assert_eq!(overlays[2]["result"]["mode"], "lines");
        assert_eq!(value["theme"]["template"], "plotly_white");
    }

    #[test]
    fn test_failed_overlay_is_skipped() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let series: Series<NaiveDate> = vec![(day, 3.0), (day, 5.0)].into_iter().collect();
        let report = analyze_dataset(&Dataset::Dated(series), &config(vec![1], vec![2.0], BandMode::Region));

        assert_eq!(report.domain, Domain::Date);
        assert!(matches!(
            report.overlays[0],
            OverlayEntry::Skipped { name: "trend", .. }
        ));
        assert!(matches!(
            report.overlays[1],
            OverlayEntry::Computed {
                name: "rolling_mean",
                ..
            }
        ));

        let value = serde_json::to_value(&report).unwrap();
        let band = &value["overlays"][2]["result"];
        assert_eq!(band["mode"], "region");
        assert_eq!(band["x_min"], "2024-06-01");
        assert_eq!(band["bounds"]["mean"], 4.0);
    }

    #[test]
    fn test_one_overlay_per_window_and_multiplier() {
        let series: Series<f64> = (0..10).map(|i| (i as f64, (i % 3) as f64)).collect();
        let report = analyze_dataset(
            &Dataset::Indexed(series),
            &config(vec![7, 30], vec![1.0, 2.0], BandMode::Lines),
        );

        let value = serde_json::to_value(&report).unwrap();
        let overlays = value["overlays"].as_array().unwrap();
        assert_eq!(overlays.len(), 5);

        let names: Vec<_> = overlays
            .iter()
            .map(|entry| entry["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            [
                "trend",
                "rolling_mean",
                "rolling_mean",
                "dispersion_band",
                "dispersion_band"
            ]
        );
        assert_eq!(overlays[1]["params"]["window"], 7);
        assert_eq!(overlays[2]["params"]["window"], 30);
        assert_eq!(overlays[3]["params"]["z"], 1.0);
        assert_eq!(overlays[4]["params"]["z"], 2.0);

        let width = |entry: &serde_json::Value| {
            entry["result"]["bounds"]["upper"].as_f64().unwrap()
                - entry["result"]["bounds"]["lower"].as_f64().unwrap()
        };
        assert!((width(&overlays[4]) - 2.0 * width(&overlays[3])).abs() < 1e-10);
    }
}
