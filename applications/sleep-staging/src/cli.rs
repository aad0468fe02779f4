use std::{collections::HashSet, path::PathBuf};

use clap::Parser;
use dreem_sleep::DreemLoaderConfig;

/// Training settings.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Load the Dreem sleep staging training set")]
pub struct Cli {
    /// input batch size for training
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// input batch size for testing
    #[arg(long, default_value_t = 1000)]
    pub test_batch_size: usize,

    /// number of epochs to train
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// learning rate
    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// SGD momentum
    #[arg(long, default_value_t = 0.5)]
    pub momentum: f64,

    /// disables accelerator use
    #[arg(long, default_value_t = false)]
    pub no_cuda: bool,

    /// random seed
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// how many batches to wait before logging status
    #[arg(long, default_value_t = 10)]
    pub log_interval: usize,

    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,

    #[arg(long, default_value = "dataset/train.h5")]
    pub data: PathBuf,

    #[arg(long, default_value = "dataset/train_y.csv")]
    pub labels: PathBuf,

    /// channels to keep, in batch order
    #[arg(long, value_delimiter = ',', default_value = "eeg_2,eeg_4")]
    pub keep_datasets: Vec<String>,

    /// keep every 2-D dataset of the data file, sorted by name
    #[arg(long, default_value_t = false, conflicts_with = "keep_datasets")]
    pub all_channels: bool,

    /// share of windows held out for validation
    #[arg(long, default_value_t = 0.0)]
    pub valid_fraction: f32,

    /// where to save the resolved loader config
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,
}

impl Cli {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("--batch-size must be > 0");
        }
        if self.test_batch_size == 0 {
            anyhow::bail!("--test-batch-size must be > 0");
        }
        if self.epochs == 0 {
            anyhow::bail!("--epochs must be > 0");
        }
        if !self.lr.is_finite() || self.lr <= 0.0 {
            anyhow::bail!("--lr must be a positive number, got {}", self.lr);
        }
        if !(0.0..1.0).contains(&self.momentum) {
            anyhow::bail!("--momentum must be in [0, 1), got {}", self.momentum);
        }
        if !(0.0..1.0).contains(&self.valid_fraction) {
            anyhow::bail!(
                "--valid-fraction must be in [0, 1), got {}",
                self.valid_fraction
            );
        }
        let mut seen = HashSet::new();
        for name in &self.keep_datasets {
            if name.is_empty() {
                anyhow::bail!("--keep-datasets has an empty entry");
            }
            if !seen.insert(name) {
                anyhow::bail!("--keep-datasets lists {name:?} twice");
            }
        }
        Ok(())
    }

    fn kept_channels(&self) -> Vec<String> {
        if self.all_channels {
            Vec::new()
        } else {
            self.keep_datasets.clone()
        }
    }

    pub fn loader_config(&self) -> DreemLoaderConfig {
        DreemLoaderConfig::new(
            self.data.display().to_string(),
            self.labels.display().to_string(),
            self.kept_channels(),
        )
        .with_batch_size(self.batch_size)
        .with_test_batch_size(self.test_batch_size)
        .with_num_workers(self.num_workers)
        .with_seed(self.seed)
        .with_valid_fraction(self.valid_fraction)
    }
}
