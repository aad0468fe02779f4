use std::{
    collections::{BTreeMap, HashSet},
    path::Path,
    sync::Arc,
};

use anyhow::Context;
use burn::{config::Config, data::dataset::Dataset};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    labels::Labels,
    store::{Hdf5Store, SignalStore},
    types::{DreemItem, SleepStage},
};

/// 1-D dataset holding the window id of every row, when the file has one.
pub const INDEX_DATASET: &str = "index";

#[derive(Config)]
pub struct DreemLoaderConfig {
    pub data_path: String,
    pub labels_path: String,
    /// Channels to load; empty keeps every 2-D dataset of the file.
    pub keep_datasets: Vec<String>,
    #[config(default = 64)]
    pub batch_size: usize,
    #[config(default = 1000)]
    pub test_batch_size: usize,
    #[config(default = 1)]
    pub num_workers: usize,
    #[config(default = 1)]
    pub seed: u64,
    #[config(default = 0.0)]
    pub valid_fraction: f32,
}

struct Recording {
    channels: Vec<String>,
    window_len: usize,
    ids: Vec<i64>,
    /// One `[windows * window_len]` buffer per channel.
    signals: Vec<Vec<f32>>,
    stages: Vec<SleepStage>,
}

/// Labelled sleep recording windows, restricted to the kept channels.
///
/// Clones share the loaded samples and only own their row selection.
#[derive(Clone)]
pub struct DreemDataset {
    recording: Arc<Recording>,
    rows: Vec<usize>,
}

impl DreemDataset {
    pub fn open<K: AsRef<str>>(
        data_path: impl AsRef<Path>,
        labels_path: impl AsRef<Path>,
        keep_datasets: &[K],
    ) -> anyhow::Result<Self> {
        let store = Hdf5Store::open(data_path.as_ref())?;
        let labels = Labels::from_path(labels_path.as_ref())?;
        Self::from_store(&store, &labels, keep_datasets)
            .with_context(|| format!("failed to load {}", data_path.as_ref().display()))
    }

    pub fn from_config(config: &DreemLoaderConfig) -> anyhow::Result<Self> {
        Self::open(
            &config.data_path,
            &config.labels_path,
            config.keep_datasets.as_slice(),
        )
    }

    pub fn from_store<S: SignalStore, K: AsRef<str>>(
        store: &S,
        labels: &Labels,
        keep_datasets: &[K],
    ) -> anyhow::Result<Self> {
        let names = store.dataset_names()?;
        let mut available = Vec::new();
        for name in &names {
            if store.shape(name)?.len() == 2 {
                available.push(name.clone());
            }
        }

        let channels: Vec<String> = if keep_datasets.is_empty() {
            available.clone()
        } else {
            keep_datasets
                .iter()
                .map(|name| name.as_ref().to_string())
                .collect()
        };
        if channels.is_empty() {
            anyhow::bail!("no 2-D signal datasets to load");
        }

        let mut seen = HashSet::new();
        let mut dims: Option<(usize, usize)> = None;
        for name in &channels {
            if !seen.insert(name.as_str()) {
                anyhow::bail!("channel {name:?} requested twice");
            }
            if !available.contains(name) {
                anyhow::bail!(
                    "unknown channel {name:?}, available channels: {}",
                    available.join(", ")
                );
            }
            let shape = store.shape(name)?;
            let (windows, window_len) = (shape[0], shape[1]);
            match dims {
                None => dims = Some((windows, window_len)),
                Some((expected, _)) if expected != windows => anyhow::bail!(
                    "channel {name:?} has {windows} windows, expected {expected}"
                ),
                Some((_, expected)) if expected != window_len => anyhow::bail!(
                    "channel {name:?} has windows of {window_len} samples, expected {expected}"
                ),
                Some(_) => {}
            }
        }
        let Some((windows, window_len)) = dims else {
            anyhow::bail!("no channels selected");
        };
        if windows == 0 {
            anyhow::bail!("recording has no windows");
        }

        let ids = if names.iter().any(|name| name == INDEX_DATASET)
            && store.shape(INDEX_DATASET)?.len() == 1
        {
            let ids = store.read_ids(INDEX_DATASET)?;
            if ids.len() != windows {
                anyhow::bail!(
                    "{INDEX_DATASET:?} has {} entries for {windows} windows",
                    ids.len()
                );
            }
            let mut unique = HashSet::with_capacity(ids.len());
            for id in &ids {
                if !unique.insert(*id) {
                    anyhow::bail!("duplicate window id {id} in {INDEX_DATASET:?}");
                }
            }
            ids
        } else {
            (0..windows as i64).collect()
        };

        let stages = ids
            .iter()
            .map(|id| {
                labels
                    .get(*id)
                    .with_context(|| format!("window id {id} has no label"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let matched: HashSet<i64> = ids.iter().copied().collect();
        let unused = labels.len().saturating_sub(matched.len());
        if unused > 0 {
            tracing::warn!("{unused} labels have no matching window");
        }

        let mut signals = Vec::with_capacity(channels.len());
        for name in &channels {
            let values = store.read_f32(name)?;
            if values.len() != windows * window_len {
                anyhow::bail!(
                    "channel {name:?} holds {} samples, expected {}",
                    values.len(),
                    windows * window_len
                );
            }
            signals.push(values);
        }

        tracing::info!(
            "loaded {windows} windows of {window_len} samples for channels [{}]",
            channels.join(", ")
        );

        Ok(Self {
            recording: Arc::new(Recording {
                channels,
                window_len,
                ids,
                signals,
                stages,
            }),
            rows: (0..windows).collect(),
        })
    }

    pub fn channels(&self) -> &[String] {
        &self.recording.channels
    }

    pub fn window_len(&self) -> usize {
        self.recording.window_len
    }

    pub fn stage_counts(&self) -> BTreeMap<SleepStage, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(self.recording.stages[*row]).or_insert(0) += 1;
        }
        counts
    }

    /// Shuffles the windows with `seed` and moves the last
    /// `round(len * valid_fraction)` of them into the second dataset.
    pub fn split(&self, valid_fraction: f32, seed: u64) -> anyhow::Result<(Self, Self)> {
        if !(0.0..1.0).contains(&valid_fraction) {
            anyhow::bail!("valid fraction must be in [0, 1), got {valid_fraction}");
        }

        let mut rows = self.rows.clone();
        rows.shuffle(&mut StdRng::seed_from_u64(seed));

        let valid_len = (rows.len() as f32 * valid_fraction).round() as usize;
        if valid_len >= rows.len() {
            anyhow::bail!(
                "valid fraction {valid_fraction} leaves no training windows out of {}",
                rows.len()
            );
        }
        let valid_rows = rows.split_off(rows.len() - valid_len);

        Ok((self.with_rows(rows), self.with_rows(valid_rows)))
    }

    fn with_rows(&self, rows: Vec<usize>) -> Self {
        Self {
            recording: Arc::clone(&self.recording),
            rows,
        }
    }
}

impl Dataset<DreemItem> for DreemDataset {
    fn get(&self, index: usize) -> Option<DreemItem> {
        let row = *self.rows.get(index)?;
        let recording = &self.recording;
        let start = row * recording.window_len;
        let end = start + recording.window_len;
        let signals = recording
            .signals
            .iter()
            .map(|channel| channel[start..end].to_vec())
            .collect();

        Some(DreemItem {
            id: recording.ids[row],
            signals,
            stage: recording.stages[row],
        })
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}
