//! CPU/GPU dispatch for the sequence network.
//!
//! The network is placed on either CPU (NdArray) or GPU (Wgpu) when it is
//! created. `DeviceNetwork` wraps both backend instantiations so the rest of
//! the crate can train, predict, and serialize without naming a backend.

use burn::backend::wgpu::{Wgpu, WgpuDevice};
use burn::backend::NdArray;
use burn::module::AutodiffModule;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder};
use ivory_core::{Corpus, TrainingConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::backend_pool::{BackendPool, CpuBackend, CpuDevice, GpuBackend};
use crate::error::Result;
use crate::network::{
    sequence_tensor, to_floats, LayerSummary, SequenceNetwork, SequenceNetworkConfig,
};
use crate::trainer::{fit, CancelToken, ProgressFn, TrainingHistory};

/// Where the network should execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePlacement {
    /// CPU via NdArray backend (always available).
    #[default]
    Cpu,
    /// GPU via Wgpu backend; falls back to CPU when no adapter is found.
    Gpu,
}

/// A sequence network that can live on either CPU or GPU.
#[derive(Clone)]
pub(crate) enum DeviceNetwork {
    Cpu {
        network: SequenceNetwork<CpuBackend>,
        device: CpuDevice,
    },
    Gpu {
        network: SequenceNetwork<GpuBackend>,
        device: WgpuDevice,
    },
}

impl DeviceNetwork {
    /// Fresh randomly initialized network on the pool's device.
    pub fn init(config: &SequenceNetworkConfig, pool: &BackendPool) -> Self {
        match pool.gpu_device() {
            Some(device) => DeviceNetwork::Gpu {
                network: config.init(device),
                device: device.clone(),
            },
            None => {
                let device = pool.cpu_device();
                DeviceNetwork::Cpu {
                    network: config.init(&device),
                    device,
                }
            }
        }
    }

    /// Network with weights restored from [`DeviceNetwork::to_bytes`] output.
    pub fn from_bytes(
        config: &SequenceNetworkConfig,
        pool: &BackendPool,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
        Ok(match Self::init(config, pool) {
            DeviceNetwork::Cpu { network, device } => DeviceNetwork::Cpu {
                network: network.load_record(recorder.load(bytes, &device)?),
                device,
            },
            DeviceNetwork::Gpu { network, device } => DeviceNetwork::Gpu {
                network: network.load_record(recorder.load(bytes, &device)?),
                device,
            },
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
        Ok(match self {
            DeviceNetwork::Cpu { network, .. } => recorder.record(network.clone().into_record(), ())?,
            DeviceNetwork::Gpu { network, .. } => recorder.record(network.clone().into_record(), ())?,
        })
    }

    /// Inference without dropout. `sequences` is a flat `[batch, 4, 88]` block;
    /// the result is a flat `[batch, 88]` block of probabilities.
    pub fn predict(&self, sequences: &[f32], batch: usize) -> Result<Vec<f32>> {
        match self {
            DeviceNetwork::Cpu { network, device } => {
                let network = network.valid();
                to_floats(network.forward(sequence_tensor::<NdArray>(sequences, batch, device)))
            }
            DeviceNetwork::Gpu { network, device } => {
                let network = network.valid();
                to_floats(network.forward(sequence_tensor::<Wgpu>(sequences, batch, device)))
            }
        }
    }

    /// Trains a copy of this network; `self` is left untouched.
    pub fn fit<R: Rng + ?Sized>(
        &self,
        corpus: &Corpus,
        config: &TrainingConfig,
        on_progress: &mut ProgressFn<'_>,
        cancel: &CancelToken,
        rng: &mut R,
    ) -> Result<(Self, TrainingHistory)> {
        match self {
            DeviceNetwork::Cpu { network, device } => {
                let (network, history) =
                    fit(network.clone(), device, corpus, config, on_progress, cancel, rng)?;
                Ok((
                    DeviceNetwork::Cpu {
                        network,
                        device: *device,
                    },
                    history,
                ))
            }
            DeviceNetwork::Gpu { network, device } => {
                let (network, history) =
                    fit(network.clone(), device, corpus, config, on_progress, cancel, rng)?;
                Ok((
                    DeviceNetwork::Gpu {
                        network,
                        device: device.clone(),
                    },
                    history,
                ))
            }
        }
    }

    pub fn layers(&self) -> Vec<LayerSummary> {
        match self {
            DeviceNetwork::Cpu { network, .. } => network.layers(),
            DeviceNetwork::Gpu { network, .. } => network.layers(),
        }
    }

    pub fn placement(&self) -> DevicePlacement {
        match self {
            DeviceNetwork::Cpu { .. } => DevicePlacement::Cpu,
            DeviceNetwork::Gpu { .. } => DevicePlacement::Gpu,
        }
    }
}
