// ============================================================
// Layer 4 — Partitions
// ============================================================
// In-memory implementations of the Partition and DataSource
// traits.
//
// A BatchedPartition walks its dataset in a fixed order and
// yields `batch_size` samples at a time; the last batch may be
// smaller. Calling batches() again restarts from the first
// batch, which is what lets the trainer evaluate the same
// validation partition many times.
//
// The training partition can be shuffled ONCE, up front, with
// the run's seed (Fisher-Yates via rand::seq::SliceRandom).
// The order is then fixed for the whole run, so two runs with
// the same seed see identical batch sequences.

use burn::data::dataset::Dataset;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::{batcher::WindowBatcher, dataset::WindowDataset};
use crate::domain::{
    batch::Batch,
    traits::{DataSource, Partition},
};

#[derive(Debug)]
pub struct BatchedPartition {
    dataset:    WindowDataset,
    batcher:    WindowBatcher,
    batch_size: usize,
    order:      Vec<usize>,
}

impl BatchedPartition {
    pub fn new(dataset: WindowDataset, batch_size: usize) -> Self {
        let batcher = WindowBatcher::new(dataset.window(), dataset.features());
        let order   = (0..dataset.len()).collect();
        Self { dataset, batcher, batch_size: batch_size.max(1), order }
    }

    /// Permute the sample order once with a seeded RNG.
    pub fn shuffled(mut self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        self.order.shuffle(&mut rng);
        self
    }
}

impl Partition for BatchedPartition {
    fn batches(&self) -> Box<dyn Iterator<Item = Batch> + '_> {
        Box::new(self.order.chunks(self.batch_size).map(move |chunk| {
            let items = chunk.iter().filter_map(|&i| self.dataset.get(i)).collect();
            self.batcher.batch(items)
        }))
    }

    fn batch_count(&self) -> usize {
        self.order.len().div_ceil(self.batch_size)
    }
}

/// Train / validation / optional test partitions of one run.
#[derive(Debug)]
pub struct SplitData<P> {
    pub train:      P,
    pub validation: P,
    pub test:       Option<P>,
}

impl<P: Partition> DataSource for SplitData<P> {
    type Partition = P;

    fn train(&self) -> &P {
        &self.train
    }

    fn validation(&self) -> &P {
        &self.validation
    }

    fn test(&self) -> Option<&P> {
        self.test.as_ref()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::WindowSample;

    fn partition(n: usize, batch_size: usize) -> BatchedPartition {
        let samples = (0..n)
            .map(|i| WindowSample { inputs: vec![i as f32], target: i as f32 })
            .collect();
        BatchedPartition::new(WindowDataset::new(samples, 1, 1), batch_size)
    }

    #[test]
    fn test_batch_count_rounds_up() {
        assert_eq!(partition(10, 4).batch_count(), 3);
        assert_eq!(partition(8, 4).batch_count(), 2);
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn test_last_batch_is_partial() {
        let p     = partition(5, 2);
        let sizes: Vec<usize> = p.batches().map(|b| b.size).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_batches_restart_in_the_same_order() {
        let p      = partition(6, 4);
        let first:  Vec<Vec<f32>> = p.batches().map(|b| b.targets).collect();
        let second: Vec<Vec<f32>> = p.batches().map(|b| b.targets).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_shuffle_is_seeded_and_lossless() {
        let a: Vec<f32> = partition(20, 20).shuffled(7).batches().flat_map(|b| b.targets).collect();
        let b: Vec<f32> = partition(20, 20).shuffled(7).batches().flat_map(|b| b.targets).collect();
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_by(f32::total_cmp);
        assert_eq!(sorted, (0..20).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_data_exposes_optional_test() {
        let data = SplitData { train: partition(4, 2), validation: partition(2, 2), test: None };
        assert_eq!(data.train().batch_count(), 2);
        assert!(data.test().is_none());
    }
}
