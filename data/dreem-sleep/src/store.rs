use std::{collections::BTreeMap, path::Path};

use anyhow::Context;

/// Named numeric arrays a dataset can be built from.
pub trait SignalStore {
    fn dataset_names(&self) -> anyhow::Result<Vec<String>>;

    fn shape(&self, name: &str) -> anyhow::Result<Vec<usize>>;

    /// Row-major contents of `name` converted to `f32`.
    fn read_f32(&self, name: &str) -> anyhow::Result<Vec<f32>>;

    fn read_ids(&self, name: &str) -> anyhow::Result<Vec<i64>>;
}

/// Datasets found in the root group of an HDF5 file.
pub struct Hdf5Store {
    file: hdf5::File,
}

impl Hdf5Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = hdf5::File::open(path)
            .with_context(|| format!("failed to open HDF5 file {}", path.display()))?;
        tracing::debug!("opened {}", path.display());
        Ok(Self { file })
    }

    fn dataset(&self, name: &str) -> anyhow::Result<hdf5::Dataset> {
        self.file
            .dataset(name)
            .with_context(|| format!("no dataset named {name:?}"))
    }
}

impl SignalStore for Hdf5Store {
    fn dataset_names(&self) -> anyhow::Result<Vec<String>> {
        let mut names: Vec<String> = self
            .file
            .datasets()?
            .iter()
            .map(|ds| ds.name().trim_start_matches('/').to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    fn shape(&self, name: &str) -> anyhow::Result<Vec<usize>> {
        Ok(self.dataset(name)?.shape())
    }

    fn read_f32(&self, name: &str) -> anyhow::Result<Vec<f32>> {
        self.dataset(name)?
            .read_raw::<f32>()
            .with_context(|| format!("failed to read dataset {name:?} as f32"))
    }

    fn read_ids(&self, name: &str) -> anyhow::Result<Vec<i64>> {
        self.dataset(name)?
            .read_raw::<i64>()
            .with_context(|| format!("failed to read dataset {name:?} as integers"))
    }
}

#[derive(Debug, Clone)]
enum MemoryArray {
    Float { shape: Vec<usize>, values: Vec<f32> },
    Int { values: Vec<i64> },
}

/// In-memory store, handy when the arrays are already loaded.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    arrays: BTreeMap<String, MemoryArray>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `[windows, samples]` signal.
    pub fn with_signal(mut self, name: &str, rows: Vec<Vec<f32>>) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let shape = vec![rows.len(), width];
        let values = rows.into_iter().flatten().collect();
        self.arrays
            .insert(name.to_string(), MemoryArray::Float { shape, values });
        self
    }

    pub fn with_ids(mut self, name: &str, ids: Vec<i64>) -> Self {
        self.arrays
            .insert(name.to_string(), MemoryArray::Int { values: ids });
        self
    }

    fn array(&self, name: &str) -> anyhow::Result<&MemoryArray> {
        self.arrays
            .get(name)
            .with_context(|| format!("no dataset named {name:?}"))
    }
}

impl SignalStore for MemoryStore {
    fn dataset_names(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.arrays.keys().cloned().collect())
    }

    fn shape(&self, name: &str) -> anyhow::Result<Vec<usize>> {
        Ok(match self.array(name)? {
            MemoryArray::Float { shape, .. } => shape.clone(),
            MemoryArray::Int { values } => vec![values.len()],
        })
    }

    fn read_f32(&self, name: &str) -> anyhow::Result<Vec<f32>> {
        Ok(match self.array(name)? {
            MemoryArray::Float { values, .. } => values.clone(),
            MemoryArray::Int { values } => values.iter().map(|v| *v as f32).collect(),
        })
    }

    fn read_ids(&self, name: &str) -> anyhow::Result<Vec<i64>> {
        match self.array(name)? {
            MemoryArray::Int { values } => Ok(values.clone()),
            MemoryArray::Float { .. } => anyhow::bail!("dataset {name:?} does not hold integers"),
        }
    }
}
