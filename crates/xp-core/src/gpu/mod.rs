//! wgpu runtime shared by the GPU-capable backends
//!
//! Holds the device, queue and the compiled elementwise pipeline. Elementwise
//! operations run in `shaders/elementwise.wgsl`; reductions read the buffer
//! back and accumulate in f64 on the host.
//!
//! # Precision
//!
//! WGSL has no portable f64, so device arrays are always f32.

use crate::error::{Error, Result};
use crate::primitives::BinaryOp;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

const WORKGROUP_SIZE: u32 = 256;
const F32_SIZE: u64 = std::mem::size_of::<f32>() as u64;

/// Uniform buffer parameters passed to the WGSL shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ShaderParams {
    len: u32,
    op: u32,
    a_step: u32,
    b_step: u32,
}

/// f32 storage buffer resident on the device
#[derive(Debug, Clone)]
pub struct GpuBuffer {
    buffer: Arc<wgpu::Buffer>,
    len: usize,
}

impl GpuBuffer {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Device, queue and pipeline for elementwise kernels
#[derive(Debug)]
pub struct GpuRuntime {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    adapter_name: String,
}

static SHARED: OnceLock<std::result::Result<Arc<GpuRuntime>, String>> = OnceLock::new();

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl GpuRuntime {
    /// Process-wide runtime, created on first use
    ///
    /// The first failure is remembered; later calls report the same reason
    /// without touching the driver again.
    pub fn shared() -> Result<Arc<GpuRuntime>> {
        SHARED
            .get_or_init(|| {
                Self::new_blocking()
                    .map(Arc::new)
                    .map_err(|e| e.to_string())
            })
            .clone()
            .map_err(|reason| Error::unavailable("gpu", reason))
    }

    /// Create a runtime asynchronously.
    ///
    /// Software adapters are rejected: they would report a GPU that is not
    /// there.
    pub async fn new_async() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or_else(|| Error::unavailable("gpu", "no GPU adapter found"))?;

        let info = adapter.get_info();
        if info.device_type == wgpu::DeviceType::Cpu {
            return Err(Error::unavailable(
                "gpu",
                format!("only a software adapter is present ({})", info.name),
            ));
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("xp-core"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| Error::Device(format!("failed to create device: {e}")))?;

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("elementwise_shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "shaders/elementwise.wgsl"
            ))),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("elementwise_bind_group_layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
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
            label: Some("elementwise_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("elementwise_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader_module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        log::debug!("gpu runtime ready on adapter '{}'", info.name);

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            adapter_name: info.name,
        })
    }

    /// Create a runtime, blocking the current thread.
    pub fn new_blocking() -> Result<Self> {
        pollster::block_on(Self::new_async())
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    /// Largest f32 array the device can hold and bind as storage
    pub fn max_elements(&self) -> usize {
        let limits = self.device.limits();
        let bytes = limits
            .max_buffer_size
            .min(u64::from(limits.max_storage_buffer_binding_size));
        usize::try_from(bytes / F32_SIZE).unwrap_or(usize::MAX)
    }

    fn create_storage(&self, label: &str, len: usize) -> Result<wgpu::Buffer> {
        if len > self.max_elements() {
            return Err(Error::Device(format!(
                "{len} f32 elements exceed the device buffer limit of {}",
                self.max_elements()
            )));
        }
        // Zero-sized bindings are invalid; keep one slot for empty arrays.
        let size = len.max(1) as u64 * F32_SIZE;
        Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }))
    }

    /// Copy host values into a new device buffer
    pub fn upload(&self, data: &[f32]) -> Result<GpuBuffer> {
        let buffer = self.create_storage("xp_array", data.len())?;
        if !data.is_empty() {
            self.queue
                .write_buffer(&buffer, 0, bytemuck::cast_slice(data));
        }
        Ok(GpuBuffer {
            buffer: Arc::new(buffer),
            len: data.len(),
        })
    }

    /// Read a device buffer back to the host
    pub fn download(&self, source: &GpuBuffer) -> Result<Vec<f32>> {
        if source.is_empty() {
            return Ok(Vec::new());
        }
        let byte_size = source.len as u64 * F32_SIZE;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging"),
            size: byte_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("download_encoder"),
            });
        encoder.copy_buffer_to_buffer(&source.buffer, 0, &staging, 0, byte_size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        let _ = self.device.poll(wgpu::Maintain::Wait);

        receiver
            .recv()
            .map_err(|e| Error::Device(format!("map recv failed: {e}")))?
            .map_err(|e| Error::Device(format!("buffer map failed: {e}")))?;

        let data = slice.get_mapped_range();
        let values: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();

        Ok(values)
    }

    /// `out[i] = a[i * a_step] op b[i * b_step]` for `i < len`
    ///
    /// A scalar operand (0-d array) uses step 0.
    pub fn binary(
        &self,
        op: BinaryOp,
        a: &GpuBuffer,
        a_scalar: bool,
        b: &GpuBuffer,
        b_scalar: bool,
        len: usize,
    ) -> Result<GpuBuffer> {
        let output = self.create_storage("xp_result", len)?;
        if len == 0 {
            return Ok(GpuBuffer {
                buffer: Arc::new(output),
                len,
            });
        }

        let (elements, workgroups) = self.dispatch_size(len)?;
        let params = ShaderParams {
            len: elements,
            op: match op {
                BinaryOp::Subtract => 0,
                BinaryOp::Divide => 1,
            },
            a_step: u32::from(!a_scalar),
            b_step: u32::from(!b_scalar),
        };
        let params_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("params"),
            size: std::mem::size_of::<ShaderParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue
            .write_buffer(&params_buffer, 0, bytemuck::bytes_of(&params));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("elementwise_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: a.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: b.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("elementwise_encoder"),
            });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("elementwise_pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline);
            cpass.set_bind_group(0, &bind_group, &[]);
            cpass.dispatch_workgroups(workgroups, 1, 1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        Ok(GpuBuffer {
            buffer: Arc::new(output),
            len,
        })
    }

    /// Element count and workgroup count for one elementwise dispatch
    fn dispatch_size(&self, len: usize) -> Result<(u32, u32)> {
        let max_groups = self.device.limits().max_compute_workgroups_per_dimension;
        let too_large = || {
            Error::Device(format!(
                "{len} elements exceed the dispatch limit of {max_groups} workgroups of {WORKGROUP_SIZE}"
            ))
        };
        let elements = u32::try_from(len).map_err(|_| too_large())?;
        let workgroups = elements.div_ceil(WORKGROUP_SIZE);
        if workgroups > max_groups {
            return Err(too_large());
        }
        Ok((elements, workgroups))
    }

    /// Mean and variance of a device buffer, accumulated in f64 on the host
    pub fn moments(&self, source: &GpuBuffer, correction: f64) -> Result<(f64, f64)> {
        let values = self.download(source)?;
        let n = values.len() as f64;
        if values.is_empty() {
            return Ok((f64::NAN, f64::NAN));
        }
        let mean = values.iter().map(|&x| x as f64).sum::<f64>() / n;
        let ss: f64 = values
            .iter()
            .map(|&x| {
                let d = x as f64 - mean;
                d * d
            })
            .sum();
        Ok((mean, ss / (n - correction)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Skip the test if no GPU is available.
    fn try_gpu() -> Option<Arc<GpuRuntime>> {
        match GpuRuntime::shared() {
            Ok(rt) => Some(rt),
            Err(e) => {
                println!("Skipping: {e}");
                None
            }
        }
    }

    #[test]
    fn test_upload_download_round_trip() {
        let Some(gpu) = try_gpu() else { return };
        let data = [1.0f32, -2.5, 3.25, 0.0, 7.0];
        let buffer = gpu.upload(&data).unwrap();
        assert_eq!(buffer.len(), 5);
        assert_eq!(gpu.download(&buffer).unwrap(), data.to_vec());
    }

    #[test]
    fn test_binary_with_scalar_operand() {
        let Some(gpu) = try_gpu() else { return };
        let a = gpu.upload(&[2.0, 4.0, 6.0]).unwrap();
        let s = gpu.upload(&[2.0]).unwrap();
        let q = gpu.binary(BinaryOp::Divide, &a, false, &s, true, 3).unwrap();
        assert_eq!(gpu.download(&q).unwrap(), vec![1.0, 2.0, 3.0]);
        let d = gpu.binary(BinaryOp::Subtract, &s, true, &a, false, 3).unwrap();
        assert_eq!(gpu.download(&d).unwrap(), vec![0.0, -2.0, -4.0]);
    }

    #[test]
    fn test_empty_buffers() {
        let Some(gpu) = try_gpu() else { return };
        let empty = gpu.upload(&[]).unwrap();
        assert!(empty.is_empty());
        assert!(gpu.download(&empty).unwrap().is_empty());
        let (mean, var) = gpu.moments(&empty, 0.0).unwrap();
        assert!(mean.is_nan() && var.is_nan());
    }

    #[test]
    fn test_oversized_upload_is_an_error() {
        let Some(gpu) = try_gpu() else { return };
        let len = gpu.max_elements() + 1;
        match gpu.create_storage("oversized", len) {
            Err(Error::Device(message)) => assert!(message.contains("buffer limit")),
            other => panic!("expected a device error, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_size_rejects_oversized_lengths() {
        let Some(gpu) = try_gpu() else { return };
        assert_eq!(gpu.dispatch_size(1).unwrap(), (1, 1));
        assert_eq!(gpu.dispatch_size(257).unwrap(), (257, 2));
        let max_groups = gpu.device.limits().max_compute_workgroups_per_dimension as usize;
        let over = max_groups * WORKGROUP_SIZE as usize + 1;
        assert!(matches!(gpu.dispatch_size(over), Err(Error::Device(_))));
        // Lengths that wrap when cast to u32 must not slip under the limit
        if let Ok(wrapping) = usize::try_from((1u64 << 32) + 1) {
            assert!(matches!(gpu.dispatch_size(wrapping), Err(Error::Device(_))));
        }
    }
}
