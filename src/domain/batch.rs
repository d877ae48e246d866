// ============================================================
// Layer 3 — Batch Domain Type
// ============================================================
// A batch is kept as plain row-major f32 buffers rather than
// framework tensors, so partitions can be consumed by any
// Model implementation (the Burn LSTM, or a fake in tests).
// The model converts a batch to tensors on its own device.
//
//   inputs:  [size, window, features]
//   targets: [size, 1]

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub inputs:   Vec<f32>,
    pub targets:  Vec<f32>,
    pub size:     usize,
    pub window:   usize,
    pub features: usize,
}

impl Batch {
    pub fn new(
        inputs:   Vec<f32>,
        targets:  Vec<f32>,
        window:   usize,
        features: usize,
    ) -> Self {
        let size = targets.len();
        Self { inputs, targets, size, window, features }
    }

    pub fn input_shape(&self) -> [usize; 3] {
        [self.size, self.window, self.features]
    }

    /// Buffers agree with the declared shape
    pub fn is_consistent(&self) -> bool {
        self.size > 0
            && self.targets.len() == self.size
            && self.inputs.len() == self.size * self.window * self.features
    }
}

/// What a model produces for one batch, in training or inference.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    /// Mean squared error over the batch
    pub loss:        f64,
    /// Root mean squared error over the batch
    pub metric:      f64,
    pub predictions: Vec<f32>,
    pub targets:     Vec<f32>,
}
