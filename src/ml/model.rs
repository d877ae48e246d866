// ============================================================
// Layer 5 — LSTM Forecaster (Burn)
// ============================================================
// Architecture:
//
//   input  [batch, window, features]
//     │
//     ▼
//   LSTM layer 1 ─▶ dropout ─▶ LSTM layer 2 ─▶ ... ─▶ LSTM layer N
//     │
//     ▼
//   last time step  [batch, hidden]
//     │
//     ▼
//   Linear head     [batch, output]
//
// Dropout sits between stacked layers only. Burn applies it
// only on an autodiff backend, so `valid()` (the inner backend)
// is automatically deterministic.
//
// BurnForecaster adapts the module to the engine's Model trait:
// it owns the module and the device, turns framework-free
// Batches into tensors, and handles (de)serialisation through
// Burn's NamedMpkBytesRecorder. Its decoder reports malformed
// payloads as errors, so a bad checkpoint surfaces as Corrupt.

use burn::{
    module::{AutodiffModule, ModuleVisitor, ParamId},
    nn::{
        loss::{MseLoss, Reduction},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    optim::GradientsParams,
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::domain::{
    batch::{Batch, BatchOutput},
    error::{CheckpointError, TrainError},
    traits::{Mode, Model, ModelState},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct LstmForecasterConfig {
    pub input_size:  usize,
    pub hidden_size: usize,
    #[config(default = 1)]
    pub num_layers:  usize,
    #[config(default = 1)]
    pub output_size: usize,
    #[config(default = 0.0)]
    pub dropout:     f64,
}

impl LstmForecasterConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> LstmForecaster<B> {
        let layers = (0..self.num_layers.max(1))
            .map(|i| {
                let d_input = if i == 0 { self.input_size } else { self.hidden_size };
                LstmConfig::new(d_input, self.hidden_size, true).init(device)
            })
            .collect();
        let dropout = DropoutConfig::new(self.dropout).init();
        let head    = LinearConfig::new(self.hidden_size, self.output_size).init(device);
        LstmForecaster { layers, dropout, head }
    }
}

#[derive(Module, Debug)]
pub struct LstmForecaster<B: Backend> {
    pub layers:  Vec<Lstm<B>>,
    pub dropout: Dropout,
    pub head:    Linear<B>,
}

impl<B: Backend> LstmForecaster<B> {
    /// input: [batch, window, features] → [batch, output]
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let last_layer = self.layers.len().saturating_sub(1);

        let mut x = input;
        for (i, layer) in self.layers.iter().enumerate() {
            let (output, _state) = layer.forward(x, None);
            x = if i < last_layer { self.dropout.forward(output) } else { output };
        }

        // Only the final time step feeds the head.
        let [batch, steps, hidden] = x.dims();
        let last = x
            .slice([0..batch, steps - 1..steps, 0..hidden])
            .reshape([batch, hidden]);

        self.head.forward(last)
    }
}

// ─── Parameter visitors ───────────────────────────────────────────────────────

/// Collects every float parameter in declaration order.
struct ParamCollector {
    shapes: Vec<Vec<usize>>,
    values: Vec<Vec<f32>>,
}

impl<B: Backend> ModuleVisitor<B> for ParamCollector {
    fn visit_float<const D: usize>(&mut self, _id: ParamId, tensor: &Tensor<B, D>) {
        self.shapes.push(tensor.dims().to_vec());
        self.values.push(tensor.to_data().to_vec::<f32>().unwrap_or_default());
    }
}

fn collect_params<B: Backend, M: Module<B>>(module: &M) -> ParamCollector {
    let mut collector = ParamCollector { shapes: Vec::new(), values: Vec::new() };
    module.visit(&mut collector);
    collector
}

// ─── Model adapter ────────────────────────────────────────────────────────────

pub struct BurnForecaster<B: AutodiffBackend> {
    module: LstmForecaster<B>,
    device: B::Device,
    mode:   Mode,
}

impl<B: AutodiffBackend> BurnForecaster<B> {
    pub fn new(config: &LstmForecasterConfig, device: B::Device) -> Self {
        let module = config.init::<B>(&device);
        tracing::info!(
            "LSTM ready: {} layer(s), hidden={}, {} parameters",
            config.num_layers,
            config.hidden_size,
            module.num_params(),
        );
        for (i, shape) in collect_params::<B, _>(&module).shapes.iter().enumerate() {
            tracing::debug!("  param {:>2}: {:?}", i, shape);
        }
        Self { module, device, mode: Mode::Train }
    }

    pub fn num_params(&self) -> usize {
        self.module.num_params()
    }

    pub fn module(&self) -> &LstmForecaster<B> {
        &self.module
    }

    /// Burn optimisers consume the module and hand back the updated one.
    pub fn update_module<F>(&mut self, update: F)
    where
        F: FnOnce(LstmForecaster<B>) -> LstmForecaster<B>,
    {
        self.module = update(self.module.clone());
    }

    fn tensors<K: Backend<Device = B::Device>>(
        &self,
        batch: &Batch,
    ) -> Result<(Tensor<K, 3>, Tensor<K, 2>), TrainError> {
        if !batch.is_consistent() || batch.size == 0 {
            return Err(TrainError::Data(format!(
                "malformed batch: {} inputs, {} targets for shape {:?}",
                batch.inputs.len(),
                batch.targets.len(),
                batch.input_shape(),
            )));
        }
        let inputs  = Tensor::from_data(TensorData::new(batch.inputs.clone(), batch.input_shape()), &self.device);
        let targets = Tensor::from_data(TensorData::new(batch.targets.clone(), [batch.size, 1]), &self.device);
        Ok((inputs, targets))
    }
}

fn finite_loss(loss: f64) -> Result<f64, TrainError> {
    if loss.is_finite() {
        Ok(loss)
    } else {
        Err(TrainError::Backend(format!("non-finite loss: {loss}")))
    }
}

fn to_vec<K: Backend>(tensor: Tensor<K, 2>) -> Result<Vec<f32>, TrainError> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| TrainError::Backend(format!("tensor readback failed: {e:?}")))
}

impl<B: AutodiffBackend> Model for BurnForecaster<B> {
    type Gradients = GradientsParams;

    fn train_step(&mut self, batch: &Batch) -> Result<(BatchOutput, GradientsParams), TrainError> {
        let (inputs, targets) = self.tensors::<B>(batch)?;

        let output = self.module.forward(inputs);
        let loss   = MseLoss::new().forward(output.clone(), targets, Reduction::Mean);
        let value  = finite_loss(loss.clone().into_scalar().elem::<f64>())?;

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.module);

        let output = BatchOutput {
            loss:        value,
            metric:      value.sqrt(),
            predictions: to_vec(output.inner())?,
            targets:     batch.targets.clone(),
        };
        Ok((output, grads))
    }

    fn infer(&self, batch: &Batch) -> Result<BatchOutput, TrainError> {
        let (inputs, targets) = self.tensors::<B::InnerBackend>(batch)?;

        let output = match self.mode {
            Mode::Eval  => self.module.valid().forward(inputs),
            Mode::Train => self.module.forward(Tensor::from_inner(inputs)).inner(),
        };

        let loss = MseLoss::new()
            .forward(output.clone(), targets.clone(), Reduction::Mean)
            .into_scalar()
            .elem::<f64>();
        let loss = finite_loss(loss)?;

        Ok(BatchOutput {
            loss,
            metric:      loss.sqrt(),
            predictions: to_vec(output)?,
            targets:     to_vec(targets)?,
        })
    }

    fn parameters(&self) -> Vec<Vec<f32>> {
        collect_params::<B, _>(&self.module).values
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn state(&self) -> Result<ModelState, TrainError> {
        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
        let payload  = Recorder::<B>::record(&recorder, self.module.clone().into_record(), ())
            .map_err(|e| TrainError::Backend(format!("failed to encode parameters: {e:?}")))?;

        Ok(ModelState {
            shapes: collect_params::<B, _>(&self.module).shapes,
            payload,
        })
    }

    fn load_state(&mut self, key: &str, state: &ModelState) -> Result<(), CheckpointError> {
        let corrupt = |reason: String| CheckpointError::Corrupt { key: key.to_string(), reason };

        let expected = collect_params::<B, _>(&self.module).shapes;
        if expected != state.shapes {
            return Err(corrupt(format!(
                "parameter shapes {:?} do not match model shapes {:?}",
                state.shapes, expected,
            )));
        }

        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
        let record   = Recorder::<B>::load(&recorder, state.payload.clone(), &self.device)
            .map_err(|e| corrupt(format!("cannot decode parameters: {e:?}")))?;

        self.module = self.module.clone().load_record(record);
        tracing::debug!("Loaded parameters from checkpoint '{}'", key);
        Ok(())
    }
}
