//! `wgpu` compute backend.

use std::{mem::size_of, sync::Arc};

use bytemuck::{Pod, Zeroable};
use log::{debug, trace};

use crate::{
    backend::Backend,
    complex::Complex,
    compute::horizons_dispatch_size,
    context::{self, GpuContext},
    error::{Error, Result},
    typed_buffer,
};

/// Corresponds to `horizons.wgsl#Params`. Uniforms are padded to 16 bytes.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug)]
struct Params {
    max_iter: u32,
    count: u32,
    _padding: [u32; 2],
}

pub struct GpuBackend {
    context: Arc<GpuContext>,
}

impl GpuBackend {
    /// A backend on the process-wide context. See [`context::shared`].
    pub fn shared() -> Result<Self> {
        Ok(Self {
            context: context::shared()?,
        })
    }

    pub fn with_context(context: Arc<GpuContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    fn check_limits(&self, points: &[Complex]) -> Result<(u32, (u32, u32, u32))> {
        let limits = self.context.limits();

        let input_size = (points.len() * size_of::<Complex>()) as u64;
        if input_size > limits.max_storage_buffer_binding_size as u64
            || input_size > limits.max_buffer_size
        {
            return Err(Error::DeviceExecution(format!(
                "{} points ({} bytes) exceed the device's storage buffer limit of {} bytes",
                points.len(),
                input_size,
                limits.max_storage_buffer_binding_size
            )));
        }

        let count = u32::try_from(points.len())
            .map_err(|_| Error::DeviceExecution(format!("too many points: {}", points.len())))?;

        let dispatch_size =
            horizons_dispatch_size(points.len(), limits.max_compute_workgroups_per_dimension)
                .ok_or_else(|| {
                    Error::DeviceExecution(format!(
                        "{} points need more than {} workgroups per dimension",
                        points.len(),
                        limits.max_compute_workgroups_per_dimension
                    ))
                })?;

        Ok((count, dispatch_size))
    }
}

impl Backend for GpuBackend {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn compute_horizons(&self, points: &[Complex], max_iter: u32) -> Result<Vec<u32>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let (count, (x, y, z)) = self.check_limits(points)?;
        debug!(
            "dispatching {} points as ({}, {}, {}) workgroups, max_iter {}",
            count, x, y, z, max_iter
        );

        let GpuContext {
            device,
            queue,
            bind_group_layout,
            pipeline,
            ..
        } = &*self.context;

        let _dispatch = self.context.lock_dispatch();
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let points_buffer = typed_buffer::Builder::from(points)
            .with_label("points-buffer")
            .with_usage(wgpu::BufferUsages::STORAGE)
            .create(device);

        let horizons_buffer = typed_buffer::Builder::<u32>::new(count as u64)
            .with_label("horizons-buffer")
            .with_usage(wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC)
            .create(device);

        let staging_buffer = typed_buffer::Builder::<u32>::new(count as u64)
            .with_label("horizons-staging-buffer")
            .with_usage(wgpu::BufferUsages::MAP_READ)
            .create(device);

        let params = [Params {
            max_iter,
            count,
            _padding: [0; 2],
        }];
        let params_buffer = typed_buffer::Builder::from(&params[..])
            .with_label("params-buffer")
            .with_usage(wgpu::BufferUsages::UNIFORM)
            .create(device);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("horizons-bind-group"),
            layout: bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: points_buffer.binding_resource(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: horizons_buffer.binding_resource(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.binding_resource(),
                },
            ],
        });

        let mut command_encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("horizons-command-encoder"),
        });

        command_encoder.push_debug_group("horizons-pass");
        {
            let mut compute_pass = command_encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("horizons-pass"),
            });

            compute_pass.set_pipeline(pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);
            compute_pass.insert_debug_marker("point_horizons");
            compute_pass.dispatch_workgroups(x, y, z);
        }
        command_encoder.pop_debug_group();

        typed_buffer::copy_buffer_to_buffer(&mut command_encoder, &horizons_buffer, &staging_buffer);

        queue.submit([command_encoder.finish()]);

        let validation_error = pollster::block_on(device.pop_error_scope());
        let out_of_memory_error = pollster::block_on(device.pop_error_scope());
        if let Some(error) = validation_error.or(out_of_memory_error) {
            return Err(Error::DeviceExecution(error.to_string()));
        }

        trace!("waiting for {} horizons", count);
        let horizons = staging_buffer.read(device)?;

        points_buffer.destroy();
        horizons_buffer.destroy();
        staging_buffer.destroy();
        params_buffer.destroy();

        Ok(horizons)
    }
}
