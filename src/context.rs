/*!
The process-wide GPU context.

Acquiring an adapter and device and compiling the horizons pipeline is slow, so
it happens once, on the first call to [`shared`], and the result is cached
until [`teardown`]. A failed acquisition is not cached; the next call tries
again.

Callers hold an `Arc<GpuContext>`, so tearing the cache down never pulls the
device out from under a render that is already running. The device is released
when the last `Arc` is dropped.

Every context, shared or not, is created from one `wgpu::Instance` that lives
until process exit. On the GL backend an instance owns the EGL display, and
dropping any instance invalidates devices made from the others.
*/

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use once_cell::sync::Lazy;

use crate::error::{Error, Result};

const SHADER_SOURCE: &str = include_str!("horizons.wgsl");
const ENTRY_POINT: &str = "point_horizons";

static INSTANCE: Lazy<wgpu::Instance> = Lazy::new(|| wgpu::Instance::new(wgpu::Backends::all()));

static SHARED: Mutex<Option<Arc<GpuContext>>> = Mutex::new(None);

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub pipeline: wgpu::ComputePipeline,
    // Error scopes are a per-device stack, so dispatches must not interleave.
    dispatch: Mutex<()>,
}

impl GpuContext {
    /// Acquire a fresh device, independent of the shared context's but on the same instance.
    pub fn new() -> Result<Self> {
        pollster::block_on(Self::init())
    }

    async fn init() -> Result<Self> {
        let adapter = INSTANCE
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or_else(|| Error::DeviceUnavailable("no suitable adapter found".into()))?;

        let adapter_info = adapter.get_info();
        info!("using adapter {:?}", adapter_info);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("horizons-device"),
                    features: wgpu::Features::empty(),
                    // Large images need the adapter's storage buffer limits, not the defaults.
                    limits: adapter.limits(),
                },
                None,
            )
            .await?;

        let (bind_group_layout, pipeline) = compile(&device, SHADER_SOURCE).await?;

        Ok(Self {
            device,
            queue,
            adapter_info,
            bind_group_layout,
            pipeline,
            dispatch: Mutex::new(()),
        })
    }

    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Held for the duration of one dispatch, from buffer creation to error scope pop.
    pub fn lock_dispatch(&self) -> MutexGuard<'_, ()> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Build the horizons pipeline from `source`. Validation errors surface as [`Error::KernelCompile`].
async fn compile(
    device: &wgpu::Device,
    source: &str,
) -> Result<(wgpu::BindGroupLayout, wgpu::ComputePipeline)> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("horizons-shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("horizons-bind-group-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("horizons-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("horizons-pipeline"),
        layout: Some(&pipeline_layout),
        module: &shader_module,
        entry_point: ENTRY_POINT,
    });

    if let Some(error) = device.pop_error_scope().await {
        return Err(Error::KernelCompile(error.to_string()));
    }

    debug!("compiled {} pipeline", ENTRY_POINT);
    Ok((bind_group_layout, pipeline))
}

/// The shared context, initialising it if this is the first use since start-up or [`teardown`].
pub fn shared() -> Result<Arc<GpuContext>> {
    let mut slot = SHARED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(context) = slot.as_ref() {
        return Ok(Arc::clone(context));
    }

    let context = Arc::new(GpuContext::new()?);
    info!("initialised shared gpu context");
    *slot = Some(Arc::clone(&context));
    Ok(context)
}

pub fn is_initialised() -> bool {
    SHARED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Drop the cached context. Returns `false` if there was nothing to drop.
pub fn teardown() -> bool {
    let context = SHARED.lock().unwrap_or_else(PoisonError::into_inner).take();
    if context.is_some() {
        info!("tearing down shared gpu context");
    }
    context.is_some()
}
