//! Stacked LSTM next-note network.
//!
//! Input is a `[batch, sequence_length, 88]` block of one-hot notes; output is
//! a distribution over the 88 keys for the note that follows.

use burn::nn::{Dropout, DropoutConfig, Initializer, Linear, LinearConfig, Lstm, LstmConfig};
use burn::prelude::*;
use burn::tensor::activation::{log_softmax, relu, softmax};
use ivory_core::{NUM_KEYS, SEQUENCE_LENGTH};

use crate::error::Error;

/// Architecture of [`SequenceNetwork`]. Defaults describe the production model.
#[derive(Config, Debug)]
pub struct SequenceNetworkConfig {
    #[config(default = 4)]
    pub sequence_length: usize,
    #[config(default = 88)]
    pub input_size: usize,
    #[config(default = 256)]
    pub lstm1_units: usize,
    #[config(default = 128)]
    pub lstm2_units: usize,
    #[config(default = 128)]
    pub dense1_units: usize,
    #[config(default = 64)]
    pub dense2_units: usize,
    /// Applied to the input of each LSTM layer.
    #[config(default = 0.2)]
    pub lstm_dropout: f64,
    #[config(default = 0.3)]
    pub dense1_dropout: f64,
    #[config(default = 0.2)]
    pub dense2_dropout: f64,
}

impl SequenceNetworkConfig {
    /// The output layer always has one unit per key.
    pub fn output_size(&self) -> usize {
        self.input_size
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.sequence_length != SEQUENCE_LENGTH || self.input_size != NUM_KEYS {
            return Err(Error::InvalidConfig(format!(
                "network input must be [{}, {}], got [{}, {}]",
                SEQUENCE_LENGTH, NUM_KEYS, self.sequence_length, self.input_size
            )));
        }
        let units = [
            self.lstm1_units,
            self.lstm2_units,
            self.dense1_units,
            self.dense2_units,
        ];
        if units.contains(&0) {
            return Err(Error::InvalidConfig("layer sizes must be non-zero".into()));
        }
        for p in [self.lstm_dropout, self.dense1_dropout, self.dense2_dropout] {
            if !(0.0..1.0).contains(&p) {
                return Err(Error::InvalidConfig(format!(
                    "dropout {p} out of range [0, 1)"
                )));
            }
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> SequenceNetwork<B> {
        let glorot = Initializer::XavierNormal { gain: 1.0 };
        let he = Initializer::KaimingNormal {
            gain: std::f64::consts::SQRT_2,
            fan_out_only: false,
        };

        SequenceNetwork {
            lstm1: LstmConfig::new(self.input_size, self.lstm1_units, true)
                .with_initializer(glorot.clone())
                .init(device),
            lstm2: LstmConfig::new(self.lstm1_units, self.lstm2_units, true)
                .with_initializer(glorot.clone())
                .init(device),
            dense1: LinearConfig::new(self.lstm2_units, self.dense1_units)
                .with_initializer(he.clone())
                .init(device),
            dense2: LinearConfig::new(self.dense1_units, self.dense2_units)
                .with_initializer(he)
                .init(device),
            output: LinearConfig::new(self.dense2_units, self.output_size())
                .with_initializer(glorot)
                .init(device),
            lstm_dropout: DropoutConfig::new(self.lstm_dropout).init(),
            dense1_dropout: DropoutConfig::new(self.dense1_dropout).init(),
            dense2_dropout: DropoutConfig::new(self.dense2_dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct SequenceNetwork<B: Backend> {
    lstm1: Lstm<B>,
    lstm2: Lstm<B>,
    dense1: Linear<B>,
    dense2: Linear<B>,
    output: Linear<B>,
    lstm_dropout: Dropout,
    dense1_dropout: Dropout,
    dense2_dropout: Dropout,
}

/// One row of a model summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSummary {
    pub name: &'static str,
    pub kind: &'static str,
    pub units: usize,
    pub params: usize,
}

impl<B: Backend> SequenceNetwork<B> {
    /// Unnormalized scores, `[batch, 88]`.
    pub fn forward_logits(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let x = self.lstm_dropout.forward(input);
        let (sequence, _) = self.lstm1.forward(x, None);

        let x = self.lstm_dropout.forward(sequence);
        let (_, last) = self.lstm2.forward(x, None);

        let x = relu(self.dense1.forward(last.hidden));
        let x = self.dense1_dropout.forward(x);
        let x = relu(self.dense2.forward(x));
        let x = self.dense2_dropout.forward(x);
        self.output.forward(x)
    }

    /// Next-note probabilities, `[batch, 88]`, rows summing to 1.
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        softmax(self.forward_logits(input), 1)
    }

    pub fn layers(&self) -> Vec<LayerSummary> {
        vec![
            LayerSummary {
                name: "lstm_1",
                kind: "LSTM",
                units: self.lstm1.d_hidden,
                params: self.lstm1.num_params(),
            },
            LayerSummary {
                name: "lstm_2",
                kind: "LSTM",
                units: self.lstm2.d_hidden,
                params: self.lstm2.num_params(),
            },
            dense("dense_1", &self.dense1),
            dense("dense_2", &self.dense2),
            dense("output", &self.output),
        ]
    }
}

fn dense<B: Backend>(name: &'static str, layer: &Linear<B>) -> LayerSummary {
    let [_, units] = layer.weight.dims();
    LayerSummary {
        name,
        kind: "Dense",
        units,
        params: layer.num_params(),
    }
}

/// Mean categorical cross-entropy against one-hot labels.
///
/// All-zero label rows contribute zero loss.
pub fn cross_entropy<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 2>) -> Tensor<B, 1> {
    (labels * log_softmax(logits, 1)).sum_dim(1).mean().neg()
}

pub(crate) fn sequence_tensor<B: Backend>(
    data: &[f32],
    batch: usize,
    device: &B::Device,
) -> Tensor<B, 3> {
    Tensor::<B, 1>::from_floats(data, device).reshape([batch, SEQUENCE_LENGTH, NUM_KEYS])
}

pub(crate) fn label_tensor<B: Backend>(
    data: &[f32],
    batch: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    Tensor::<B, 1>::from_floats(data, device).reshape([batch, NUM_KEYS])
}

pub(crate) fn to_floats<B: Backend, const D: usize>(
    tensor: Tensor<B, D>,
) -> crate::error::Result<Vec<f32>> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| Error::Tensor(format!("{e:?}")))
}

pub(crate) fn to_scalar<B: Backend>(tensor: Tensor<B, 1>) -> f64 {
    tensor.into_scalar().elem::<f64>()
}
