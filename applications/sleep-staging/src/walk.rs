use std::{fs, sync::Arc};

use anyhow::Context;
use burn::{
    config::Config,
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::Dataset,
    },
    tensor::backend::Backend,
};
use dreem_sleep::{DreemBatch, DreemBatcher, DreemDataset, DreemLoaderConfig};

use crate::cli::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassSummary {
    pub batches: usize,
    pub windows: usize,
}

/// Builds the training set described by `cli` and walks one pass over it.
pub fn run<B: Backend>(cli: &Cli, device: B::Device) -> anyhow::Result<PassSummary> {
    let config = cli.loader_config();
    if let Some(artifacts_dir) = &cli.artifacts_dir {
        fs::create_dir_all(artifacts_dir).with_context(|| {
            format!("failed to create artifacts dir {}", artifacts_dir.display())
        })?;
        let config_path = artifacts_dir.join("config.json");
        config
            .save(&config_path)
            .with_context(|| format!("failed to save {}", config_path.display()))?;
    }

    let train_set = DreemDataset::from_config(&config)?;
    walk_dataset::<B>(train_set, &config, cli.log_interval, device)
}

pub fn walk_dataset<B: Backend>(
    dataset: DreemDataset,
    config: &DreemLoaderConfig,
    log_interval: usize,
    device: B::Device,
) -> anyhow::Result<PassSummary> {
    log_dataset("dataset", &dataset);

    let (train, valid) = dataset.split(config.valid_fraction, config.seed)?;
    if !valid.is_empty() {
        log_dataset("train", &train);
        log_dataset("valid", &valid);
    }

    let dataloader_train = DataLoaderBuilder::new(DreemBatcher::<B>::new(device.clone()))
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(train);
    let summary = walk_loader("train", dataloader_train, log_interval);

    if !valid.is_empty() {
        let dataloader_valid = DataLoaderBuilder::new(DreemBatcher::<B>::new(device))
            .batch_size(config.test_batch_size)
            .num_workers(config.num_workers)
            .build(valid);
        walk_loader("valid", dataloader_valid, log_interval);
    }

    Ok(summary)
}

fn walk_loader<B: Backend>(
    split: &str,
    loader: Arc<dyn DataLoader<DreemBatch<B>>>,
    log_interval: usize,
) -> PassSummary {
    let mut summary = PassSummary::default();
    for batch in loader.iter() {
        let [batch_size, channels, samples] = batch.signals.dims();
        if log_interval > 0 && summary.batches % log_interval == 0 {
            tracing::info!(
                "{split} batch {}: {batch_size} windows x {channels} channels x {samples} samples",
                summary.batches
            );
        }
        summary.batches += 1;
        summary.windows += batch_size;
    }
    tracing::info!(
        "{split}: walked {} windows in {} batches",
        summary.windows,
        summary.batches
    );
    summary
}

fn log_dataset(split: &str, dataset: &DreemDataset) {
    let stages = dataset
        .stage_counts()
        .iter()
        .map(|(stage, count)| format!("{}={count}", stage.name()))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::info!(
        "{split}: {} windows, channels [{}], {} samples per window, stages {stages}",
        dataset.len(),
        dataset.channels().join(", "),
        dataset.window_len()
    );
}
