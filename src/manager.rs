use crate::analysis::{analyze_dataset, save_report};
use crate::config::Config;
use crate::generator::{Generator, load_dataset, save_dataset};
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    data_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(data_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { data_dir, cfg })
    }

    pub fn generate_dataset(&self) -> Result<()> {
        let dataset_idx = self
            .glob_files("dataset-*.msgpack")
            .context("failed to count dataset files")?
            .len();

        // Seeded runs skip ahead so each new file gets a fresh dataset.
        let mut generator =
            Generator::new(self.cfg.dataset.clone()).context("failed to construct generator")?;
        let mut dataset = generator
            .generate_dataset()
            .context("failed to generate dataset")?;
        if self.cfg.dataset.seed.is_some() {
            for _ in 0..dataset_idx {
                dataset = generator
                    .generate_dataset()
                    .context("failed to generate dataset")?;
            }
        }

        let dataset_file = self.dataset_file(dataset_idx);
        save_dataset(&dataset, &dataset_file)
            .with_context(|| format!("failed to save {dataset_file:?}"))?;
        log::info!("created {dataset_file:?}");

        Ok(())
    }

    pub fn compute_overlays(&self) -> Result<()> {
        let n_datasets = self
            .glob_files("dataset-*.msgpack")
            .context("failed to count dataset files")?
            .len();
        for dataset_idx in 0..n_datasets {
            let dataset_file = self.dataset_file(dataset_idx);
            let dataset = load_dataset(&dataset_file)
                .with_context(|| format!("failed to load {dataset_file:?}"))?;

            let report = analyze_dataset(&dataset, &self.cfg);

            let report_file = self.report_file(dataset_idx);
            save_report(&report, &report_file)
                .with_context(|| format!("failed to save {report_file:?}"))?;
            log::info!("created {report_file:?}");
        }

        Ok(())
    }

    pub fn clean(&self) -> Result<()> {
        for pattern in ["dataset-*.msgpack", "overlays-*.json"] {
            for file in self
                .glob_files(pattern)
                .with_context(|| format!("failed to glob {pattern}"))?
            {
                fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
                log::info!("removed {file:?}");
            }
        }

        Ok(())
    }

    fn glob_files(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = self.data_dir.join(pattern);
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let files = glob(pattern)
            .context("failed to glob files")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        Ok(files)
    }

    fn dataset_file(&self, dataset_idx: usize) -> PathBuf {
        self.data_dir
            .join(format!("dataset-{dataset_idx:04}.msgpack"))
    }

    fn report_file(&self, dataset_idx: usize) -> PathBuf {
        self.data_dir
            .join(format!("overlays-{dataset_idx:04}.json"))
    }
}
