use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use anyhow::Context;
use serde::Deserialize;

use crate::types::SleepStage;

#[derive(Debug, Deserialize)]
struct LabelRecord {
    id: i64,
    sleep_stage: u8,
}

/// Sleep stage per window id, as read from a `id,sleep_stage` CSV.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels {
    stages: BTreeMap<i64, SleepStage>,
}

impl Labels {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open label file {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("bad label file {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut stages = BTreeMap::new();
        for (row, record) in csv_reader.deserialize::<LabelRecord>().enumerate() {
            let record = record.with_context(|| format!("row {}", row + 1))?;
            let stage = SleepStage::try_from(record.sleep_stage)
                .with_context(|| format!("row {} (id {})", row + 1, record.id))?;
            if stages.insert(record.id, stage).is_some() {
                anyhow::bail!("duplicate label for window id {}", record.id);
            }
        }

        if stages.is_empty() {
            anyhow::bail!("label file has no rows");
        }

        Ok(Self { stages })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (i64, SleepStage)>) -> Self {
        Self {
            stages: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, id: i64) -> Option<SleepStage> {
        self.stages.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_id_and_stage_columns() {
        let csv = "id,sleep_stage\n0,2\n1, 4\n7,0\n";
        let labels = Labels::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(0), Some(SleepStage::N2));
        assert_eq!(labels.get(1), Some(SleepStage::Rem));
        assert_eq!(labels.get(7), Some(SleepStage::Wake));
        assert_eq!(labels.get(2), None);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let csv = "id,sleep_stage\n3,1\n3,2\n";
        let err = Labels::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("duplicate label for window id 3"));
    }

    #[test]
    fn unknown_stage_mentions_row() {
        let csv = "id,sleep_stage\n0,1\n1,9\n";
        let err = Labels::from_reader(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("row 2 (id 1)"));
    }

    #[test]
    fn header_only_file_is_empty_error() {
        let err = Labels::from_reader("id,sleep_stage\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("no rows"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = Labels::from_path(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}
