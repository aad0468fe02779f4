use burn::{
    data::dataloader::batcher::Batcher,
    tensor::{backend::Backend, Int, Tensor, TensorData},
};

mod labels;
mod loader;
mod store;
mod types;

pub use labels::Labels;
pub use loader::{DreemDataset, DreemLoaderConfig, INDEX_DATASET};
pub use store::{Hdf5Store, MemoryStore, SignalStore};
pub use types::{DreemItem, SleepStage};

#[derive(Clone)]
pub struct DreemBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> DreemBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<DreemItem, DreemBatch<B>> for DreemBatcher<B> {
    fn batch(&self, items: Vec<DreemItem>) -> DreemBatch<B> {
        let batch_size = items.len();
        let channels = items.first().map(|item| item.signals.len()).unwrap_or(0);
        let window_len = items
            .first()
            .and_then(|item| item.signals.first())
            .map(Vec::len)
            .unwrap_or(0);

        let mut samples = Vec::with_capacity(batch_size * channels * window_len);
        let mut stages = Vec::with_capacity(batch_size);
        for item in items {
            for row in item.signals {
                samples.extend(row);
            }
            stages.push(item.stage.as_class() as i64);
        }

        let signals = Tensor::<B, 3>::from_data(
            TensorData::new(samples, [batch_size, channels, window_len]).convert::<B::FloatElem>(),
            &self.device,
        );
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(stages, [batch_size]).convert::<B::IntElem>(),
            &self.device,
        );
        tracing::trace!("batched signals {:?}", signals.shape());

        DreemBatch { signals, targets }
    }
}

/// Windows stacked as `[batch, channels, samples]` with their stage classes.
#[derive(Debug, Clone)]
pub struct DreemBatch<B: Backend> {
    pub signals: Tensor<B, 3>,
    pub targets: Tensor<B, 1, Int>,
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    use super::*;

    type TestBackend = NdArray;

    #[test]
    fn batches_channels_in_item_order() {
        let items = vec![
            DreemItem {
                id: 0,
                signals: vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
                stage: SleepStage::N3,
            },
            DreemItem {
                id: 1,
                signals: vec![vec![7.0, 8.0, 9.0], vec![10.0, 11.0, 12.0]],
                stage: SleepStage::Rem,
            },
        ];

        let batcher = DreemBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(items);

        assert_eq!(batch.signals.dims(), [2, 2, 3]);
        assert_eq!(batch.targets.dims(), [2]);

        let signals = batch.signals.into_data().to_vec::<f32>().unwrap();
        assert_eq!(signals, (1..=12).map(|v| v as f32).collect::<Vec<_>>());
        let targets = batch.targets.into_data().to_vec::<i64>().unwrap();
        assert_eq!(targets, vec![3, 4]);
    }
}
