//! CPU and optional GPU devices for the sequence network.

use burn::backend::wgpu::{init_device, RuntimeOptions, WgpuDevice, WgpuSetup};
use burn::backend::{Autodiff, NdArray};
use wgpu::{Backends, DeviceDescriptor, Features, Limits, PowerPreference};

use crate::dispatch::DevicePlacement;
use crate::error::{Error, Result};

pub(crate) type CpuBackend = Autodiff<NdArray>;
pub(crate) type GpuBackend = Autodiff<burn::backend::wgpu::Wgpu>;
pub(crate) type CpuDevice = burn::backend::ndarray::NdArrayDevice;

/// Devices a model may be placed on. The GPU is only probed when requested.
pub(crate) struct BackendPool {
    cpu_device: CpuDevice,
    gpu_device: Option<WgpuDevice>,
}

impl BackendPool {
    pub fn new(placement: DevicePlacement) -> Self {
        let gpu_device = match placement {
            DevicePlacement::Cpu => None,
            DevicePlacement::Gpu => match Self::init_gpu() {
                Ok(device) => Some(device),
                Err(e) => {
                    tracing::warn!("GPU requested but unavailable ({}); training on CPU", e);
                    None
                }
            },
        };

        Self {
            cpu_device: CpuDevice::default(),
            gpu_device,
        }
    }

    fn init_gpu() -> Result<WgpuDevice> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: gpu_backends(),
            ..Default::default()
        });
        let (adapter, device, queue) = pollster::block_on(open_gpu(&instance))?;
        let backend = adapter.get_info().backend;
        tracing::debug!("Opened {:?} adapter {:?}", backend, adapter.get_info().name);

        Ok(init_device(
            WgpuSetup {
                instance,
                adapter,
                device,
                queue,
                backend,
            },
            RuntimeOptions::default(),
        ))
    }

    /// Where models will actually run.
    pub fn placement(&self) -> DevicePlacement {
        if self.gpu_device.is_some() {
            DevicePlacement::Gpu
        } else {
            DevicePlacement::Cpu
        }
    }

    pub fn gpu_device(&self) -> Option<&WgpuDevice> {
        self.gpu_device.as_ref()
    }

    pub fn cpu_device(&self) -> CpuDevice {
        self.cpu_device
    }
}

async fn open_gpu(instance: &wgpu::Instance) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        })
        .await
        .map_err(|e| Error::BackendInit(format!("no GPU adapter: {e}")))?;

    let descriptor = DeviceDescriptor {
        label: Some("ivory-burn"),
        required_features: Features::empty(),
        required_limits: Limits::default(),
        ..Default::default()
    };
    let (device, queue) = adapter
        .request_device(&descriptor)
        .await
        .map_err(|e| Error::BackendInit(e.to_string()))?;
    Ok((adapter, device, queue))
}

/// Native API per platform; anything else may use whatever wgpu finds.
fn gpu_backends() -> Backends {
    if cfg!(target_os = "macos") {
        Backends::METAL
    } else if cfg!(target_os = "windows") {
        Backends::DX12 | Backends::VULKAN
    } else if cfg!(target_os = "linux") {
        Backends::VULKAN
    } else {
        Backends::all()
    }
}
