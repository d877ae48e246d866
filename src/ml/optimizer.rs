// ============================================================
// Layer 5 — Optimiser Strategies
// ============================================================
// Two update rules, selected by name plus a learning rate:
//
//   sgd  — momentum 0.9, no dampening
//          v = 0.9*v + g
//          θ = θ - lr * v
//
//   adam — β1 = 0.9, β2 = 0.999
//          m = β1*m + (1-β1)*g        (mean)
//          v = β2*v + (1-β2)*g²       (variance)
//          θ = θ - lr * m / (√v + ε)  (update)
//
// Both wrap a Burn optimiser behind the engine's Optimizer
// trait. Burn hands gradients over by value, so there is no
// accumulated gradient buffer to zero between steps.
//
// Reference: Kingma & Ba (2015) Adam

use std::{fmt, str::FromStr};

use burn::{
    optim::{momentum::MomentumConfig, AdamConfig, GradientsParams, SgdConfig},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::domain::{error::TrainError, traits::Optimizer};
use crate::ml::model::{BurnForecaster, LstmForecaster};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Sgd,
    #[default]
    Adam,
}

impl OptimizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizerKind::Sgd  => "sgd",
            OptimizerKind::Adam => "adam",
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptimizerKind {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sgd"  => Ok(OptimizerKind::Sgd),
            "adam" => Ok(OptimizerKind::Adam),
            other  => Err(TrainError::config(format!(
                "unknown optimizer '{other}' (expected 'sgd' or 'adam')"
            ))),
        }
    }
}

/// A Burn optimiser plus the learning rate it steps with.
pub struct BurnOptimizer<O> {
    inner:         O,
    learning_rate: f64,
    kind:          OptimizerKind,
}

pub fn sgd<B: AutodiffBackend>(
    learning_rate: f64,
) -> BurnOptimizer<impl burn::optim::Optimizer<LstmForecaster<B>, B>> {
    let momentum = MomentumConfig::new().with_momentum(0.9).with_dampening(0.0);
    BurnOptimizer {
        inner: SgdConfig::new().with_momentum(Some(momentum)).init::<B, LstmForecaster<B>>(),
        learning_rate,
        kind: OptimizerKind::Sgd,
    }
}

pub fn adam<B: AutodiffBackend>(
    learning_rate: f64,
) -> BurnOptimizer<impl burn::optim::Optimizer<LstmForecaster<B>, B>> {
    BurnOptimizer {
        inner: AdamConfig::new()
            .with_beta_1(0.9)
            .with_beta_2(0.999)
            .with_epsilon(1e-8)
            .init::<B, LstmForecaster<B>>(),
        learning_rate,
        kind: OptimizerKind::Adam,
    }
}

impl<B, O> Optimizer<BurnForecaster<B>> for BurnOptimizer<O>
where
    B: AutodiffBackend,
    O: burn::optim::Optimizer<LstmForecaster<B>, B>,
{
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn apply_update(
        &mut self,
        model:     &mut BurnForecaster<B>,
        gradients: GradientsParams,
    ) -> Result<(), TrainError> {
        let lr = self.learning_rate;
        model.update_module(|module| self.inner.step(lr, module, gradients));
        Ok(())
    }
}
