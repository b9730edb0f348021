use crate::config::{DatasetConfig, Domain, Shape};
use crate::series::{Dataset, Series};
use anyhow::{Context, Result};
use chrono::Days;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Normal;
use rmp_serde::{decode, encode};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Synthetic dataset generator.
///
/// Holds the dataset configuration and the random number generator.
pub struct Generator {
    cfg: DatasetConfig,
    rng: ChaCha12Rng,
}

impl Generator {
    /// Create a new `Generator`, seeded from the configuration or from OS entropy.
    pub fn new(cfg: DatasetConfig) -> Result<Self> {
        let rng = match cfg.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };
        Ok(Self { cfg, rng })
    }

    /// Generate one dataset.
    ///
    /// Successive calls continue the same random stream, so each one yields
    /// a different dataset.
    pub fn generate_dataset(&mut self) -> Result<Dataset> {
        let y = self.generate_values().context("failed to generate values")?;

        let dataset = match self.cfg.domain {
            Domain::Index => Dataset::Indexed(
                y.into_iter()
                    .enumerate()
                    .map(|(i, val)| (i as f64, val))
                    .collect(),
            ),
            Domain::Date => {
                let start = self.cfg.start_date;
                let series: Option<Series<_>> = y
                    .into_iter()
                    .enumerate()
                    .map(|(i, val)| Some((start.checked_add_days(Days::new(i as u64))?, val)))
                    .collect();
                Dataset::Dated(series.context("date out of range")?)
            }
        };

        Ok(dataset)
    }

    fn generate_values(&mut self) -> Result<Vec<f64>> {
        let noise_dist = Normal::new(0.0, self.cfg.noise_std_dev)?;
        let n_obs = self.cfg.n_obs;
        let base = self.cfg.base;
        let drift = self.cfg.drift;

        let vals = match self.cfg.shape {
            Shape::Linear => (0..n_obs)
                .map(|i| base + drift * i as f64 + noise_dist.sample(&mut self.rng))
                .collect(),
            Shape::Walk => {
                let mut level = base;
                let mut vals = Vec::with_capacity(n_obs);
                for _ in 0..n_obs {
                    vals.push(level);
                    level += drift + noise_dist.sample(&mut self.rng);
                }
                vals
            }
        };

        Ok(vals)
    }
}

/// Save a dataset to a MessagePack file.
pub fn save_dataset<P: AsRef<Path>>(dataset: &Dataset, file: P) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write(&mut writer, dataset).context("failed to serialize dataset")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

/// Load a dataset previously saved with [`save_dataset`].
pub fn load_dataset<P: AsRef<Path>>(file: P) -> Result<Dataset> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let dataset = decode::from_read(&mut reader).context("failed to deserialize dataset")?;
    Ok(dataset)
}
