//! GPU collision detection.
//!
//! [`GpuContext`] owns the long-lived logical device and queue created on
//! the physics thread. [`GpuCollisionDetector`] runs one pairwise test per
//! call: it builds a throwaway session (five storage buffers, a staging
//! readback buffer, a fresh compute pipeline), dispatches one workgroup grid
//! over the faces of the larger mesh, blocks on completion, and decodes the
//! sentinel-encoded output. Nothing survives the call.

use std::sync::Arc;
use std::time::Duration;

use glam::Mat4;
use thiserror::Error;

use super::{Contact, ContactSource, MeshSnapshot, PairHits, ResourceLedger};

/// Threads per workgroup along x, fixed to match the shader.
const WORKGROUP_SIZE: u32 = 256;

/// Hardware limit on workgroups per dispatch axis.
const MAX_GROUPS_PER_AXIS: u32 = 65_535;

/// "No contact for this face": f32 maximum replicated across all four
/// components of a position slot and its paired normal slot.
const SENTINEL: f32 = f32::MAX;

#[derive(Debug, Error)]
pub enum GpuInitError {
    #[error("no compatible compute adapter: {0}")]
    Adapter(String),
    #[error("device request failed: {0}")]
    Device(String),
}

#[derive(Debug, Error)]
pub enum CollisionError {
    #[error("collision test needs two non-empty meshes")]
    EmptyMesh,
    #[error("fence wait failed: {0}")]
    FenceWait(String),
    #[error("output readback mapping failed: {0}")]
    Readback(String),
    #[error("output buffer returned {actual} bytes, expected {expected}")]
    OutputSize { expected: usize, actual: usize },
}

/// Push-constant block: both meshes' object-to-world matrices, 128 bytes.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PushConstants {
    world_a: [f32; 16],
    world_b: [f32; 16],
}

impl PushConstants {
    fn new(world_a: Mat4, world_b: Mat4) -> Self {
        Self {
            world_a: world_a.to_cols_array(),
            world_b: world_b.to_cols_array(),
        }
    }
}

/// Long-lived compute device context, distinct from any rendering context so
/// collision dispatches never contend with the render queue.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquires an adapter and logical device with push-constant support.
    pub fn new() -> Result<Self, GpuInitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| GpuInitError::Adapter(e.to_string()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Collision Device"),
            required_features: wgpu::Features::PUSH_CONSTANTS,
            required_limits: wgpu::Limits {
                max_push_constant_size: 128,
                ..Default::default()
            },
            ..Default::default()
        }))
        .map_err(|e| GpuInitError::Device(e.to_string()))?;

        log::info!("collision device context created: {}", adapter.get_info().name);

        Ok(Self { device, queue })
    }
}

/// Workgroup counts along (x, y) so that the grid covers `face_count`
/// invocations, expanding into y once x hits the per-axis limit.
fn work_group_counts(face_count: u32) -> (u32, u32) {
    let needed = face_count.div_ceil(WORKGROUP_SIZE).max(1);
    let x = needed.min(MAX_GROUPS_PER_AXIS);
    let y = needed.div_ceil(MAX_GROUPS_PER_AXIS);
    (x, y)
}

/// Per-call GPU resources. Dropping the session releases every buffer and
/// the pipeline, on success and on every early-return path alike.
struct CollisionSession<'a> {
    // The input buffers are only referenced through the bind group; the
    // session holds them so the ledger sees one release per allocation.
    _vertex_a: wgpu::Buffer,
    _index_a: wgpu::Buffer,
    _vertex_b: wgpu::Buffer,
    _index_b: wgpu::Buffer,
    output: wgpu::Buffer,
    staging: wgpu::Buffer,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    ledger: Option<&'a ResourceLedger>,
}

impl Drop for CollisionSession<'_> {
    fn drop(&mut self) {
        if let Some(ledger) = self.ledger {
            // Five device buffers plus the pipeline.
            for _ in 0..6 {
                ledger.record_destroy();
            }
        }
    }
}

/// Pairwise mesh collision detector running on the compute device.
pub struct GpuCollisionDetector {
    context: Arc<GpuContext>,
    fence_timeout: Duration,
    ledger: Option<Arc<ResourceLedger>>,
}

impl GpuCollisionDetector {
    pub fn new(context: Arc<GpuContext>, fence_timeout: Duration) -> Self {
        Self {
            context,
            fence_timeout,
            ledger: None,
        }
    }

    /// Attaches a ledger that observes per-call resource lifetimes.
    pub fn with_ledger(mut self, ledger: Arc<ResourceLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Runs one all-pairs triangle test. Blocks the calling thread until the
    /// device finishes or the fence timeout expires.
    pub fn run(&self, a: MeshSnapshot<'_>, b: MeshSnapshot<'_>) -> Result<PairHits, CollisionError> {
        if a.face_count() == 0 || b.face_count() == 0 {
            return Err(CollisionError::EmptyMesh);
        }

        // The mesh with more faces takes slot A; the dispatch is sized to
        // its face count. Receiver parity is flipped back on decode if the
        // caller's ordering was swapped.
        let swapped = a.face_count() < b.face_count();
        let (first, second) = if swapped { (b, a) } else { (a, b) };
        let face_count_a = first.face_count();

        let session = self.create_session(&first, &second, face_count_a)?;
        let output_bytes = 2 * face_count_a * std::mem::size_of::<[f32; 4]>();

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Collision Dispatch Encoder"),
                });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Collision Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&session.pipeline);
            pass.set_bind_group(0, &session.bind_group, &[]);
            let push = PushConstants::new(first.world, second.world);
            pass.set_push_constants(0, bytemuck::bytes_of(&push));
            let (groups_x, groups_y) = work_group_counts(face_count_a as u32);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }

        encoder.copy_buffer_to_buffer(&session.output, 0, &session.staging, 0, output_bytes as u64);

        self.context.queue.submit(Some(encoder.finish()));

        // Synchronous round trip: the physics thread stalls here until the
        // device signals completion or the timeout expires.
        let slice = session.staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).ok();
        });

        self.context
            .device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(self.fence_timeout),
            })
            .map_err(|e| CollisionError::FenceWait(e.to_string()))?;

        match receiver.try_recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(CollisionError::Readback(e.to_string())),
            Err(_) => {
                return Err(CollisionError::Readback(
                    "map callback never fired".to_string(),
                ))
            }
        }

        let hits = {
            let view = slice.get_mapped_range();
            if view.len() < output_bytes {
                return Err(CollisionError::OutputSize {
                    expected: output_bytes,
                    actual: view.len(),
                });
            }
            decode_output(bytemuck::cast_slice(&view[..output_bytes]), face_count_a, swapped)
        };
        session.staging.unmap();

        Ok(hits)
    }

    fn create_session<'s>(
        &'s self,
        first: &MeshSnapshot<'_>,
        second: &MeshSnapshot<'_>,
        face_count_a: usize,
    ) -> Result<CollisionSession<'s>, CollisionError> {
        let device = &self.context.device;
        let queue = &self.context.queue;

        let storage_buffer = |label: &str, bytes: &[u8]| {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: bytes.len() as u64,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            // Device-local memory is populated through wgpu's internal
            // staging path.
            queue.write_buffer(&buffer, 0, bytes);
            buffer
        };

        let vertices_a = first.positions.iter().map(|p| p.extend(1.0).to_array());
        let vertices_a: Vec<[f32; 4]> = vertices_a.collect();
        let vertices_b: Vec<[f32; 4]> = second.positions.iter().map(|p| p.extend(1.0).to_array()).collect();

        let vertex_a = storage_buffer("Collision Vertex A", bytemuck::cast_slice(&vertices_a));
        let index_a = storage_buffer("Collision Index A", bytemuck::cast_slice(first.indices));
        let vertex_b = storage_buffer("Collision Vertex B", bytemuck::cast_slice(&vertices_b));
        let index_b = storage_buffer("Collision Index B", bytemuck::cast_slice(second.indices));

        let output_bytes = (2 * face_count_a * std::mem::size_of::<[f32; 4]>()) as u64;
        let output = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Collision Output"),
            size: output_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Collision Output Staging"),
            size: output_bytes,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Collision Bind Group Layout"),
            entries: &[
                storage_layout_entry(0, true),
                storage_layout_entry(1, true),
                storage_layout_entry(2, true),
                storage_layout_entry(3, true),
                storage_layout_entry(4, false),
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Collision Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shaders/mesh_collision.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Collision Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::COMPUTE,
                range: 0..std::mem::size_of::<PushConstants>() as u32,
            }],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Collision Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Collision Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: vertex_a.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: index_a.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: vertex_b.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: index_b.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: output.as_entire_binding(),
                },
            ],
        });

        let ledger = self.ledger.as_deref();
        if let Some(ledger) = ledger {
            // Five device buffers plus the pipeline; the staging buffer is
            // host-visible and rides along with the session drop.
            for _ in 0..6 {
                ledger.record_create();
            }
        }

        Ok(CollisionSession {
            _vertex_a: vertex_a,
            _index_a: index_a,
            _vertex_b: vertex_b,
            _index_b: index_b,
            output,
            staging,
            pipeline,
            bind_group,
            ledger,
        })
    }
}

fn storage_layout_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
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

/// Decodes the output buffer: first `face_count_a` vec4 slots are positions,
/// the next `face_count_a` their paired normals. A slot pair filled with the
/// sentinel carries no contact.
fn decode_output(slots: &[f32], face_count_a: usize, swapped: bool) -> PairHits {
    let mut hits = PairHits::default();

    for face in 0..face_count_a {
        let position = &slots[face * 4..face * 4 + 4];
        let normal = &slots[(face_count_a + face) * 4..(face_count_a + face) * 4 + 4];

        let empty = position.iter().all(|&v| v == SENTINEL) && normal.iter().all(|&v| v == SENTINEL);
        if empty {
            continue;
        }

        // Position w carries the slot-parity of the mesh whose face was hit;
        // map it back to the caller's ordering.
        let slot_b = position[3] != 0.0;
        let source = if slot_b != swapped {
            ContactSource::MeshB
        } else {
            ContactSource::MeshA
        };

        hits.contacts.push(Contact {
            position: glam::Vec4::new(
                position[0],
                position[1],
                position[2],
                match source {
                    ContactSource::MeshA => 0.0,
                    ContactSource::MeshB => 1.0,
                },
            ),
            normal: glam::Vec4::new(normal[0], normal[1], normal[2], 0.0),
            source,
        });
    }

    hits.collided = !hits.contacts.is_empty();
    hits
}

impl super::CollisionBackend for GpuCollisionDetector {
    fn test_pair(&mut self, a: MeshSnapshot<'_>, b: MeshSnapshot<'_>) -> PairHits {
        match self.run(a, b) {
            Ok(hits) => hits,
            Err(e) => {
                // Best-effort policy: a failed device round trip reports no
                // collision for this tick instead of failing the frame.
                log::warn!("collision test failed, reporting no contact: {e}");
                PairHits::default()
            }
        }
    }
}
