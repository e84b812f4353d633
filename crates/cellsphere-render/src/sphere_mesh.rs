//! GPU-resident cell sphere: owns the static vertex/index buffers and the
//! attribute wiring, borrows the caller's per-instance buffer, and issues a
//! single instanced draw.
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized --setup_buffers--> BuffersReady <--setup_instance_buffer--> InstanceBound
//!       |                               |                                        |
//!       +-----------cleanup-------------+-------------------cleanup--------------+--> Destroyed
//! ```
//!
//! `Destroyed` accepts a fresh `generate` + `setup_buffers` cycle. Out-of-order
//! calls are logged and ignored; they never panic.

use cellsphere_mesh::vertex_format::{
    INSTANCE_BINDING_SLOT, INSTANCE_LAYOUT, SPHERE_VERTEX_LAYOUT, VERTEX_BINDING_SLOT,
};
use cellsphere_mesh::{SphereGeometry, SphereParams};
use wgpu::util::DeviceExt;

use crate::draw::DrawTarget;
use crate::error::{SphereMeshError, UsageError};

/// Where a [`SphereMesh`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshState {
    /// No GPU resources have been created yet.
    Uninitialized,
    /// Vertex/index buffers are uploaded; no instance buffer is bound.
    BuffersReady,
    /// Ready to draw: an instance buffer is associated with slot 1.
    InstanceBound,
    /// Resources were released by [`SphereMesh::cleanup`].
    Destroyed,
}

/// Result of [`SphereMesh::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// One instanced draw was recorded.
    Drawn {
        index_count: u32,
        instance_count: u32,
    },
    /// Zero instances were requested; nothing was recorded.
    NothingToDraw,
    /// The call was out of order and was ignored.
    Skipped(UsageError),
}

/// Attribute wiring for the sphere: which layout each binding slot carries.
///
/// This is the wgpu counterpart of a vertex array object. Slot 0 is declared
/// when the buffers are created; slot 1 once an instance buffer is bound.
#[derive(Debug, Clone)]
pub struct VertexArray {
    slots: [Option<wgpu::VertexBufferLayout<'static>>; 2],
}

impl Default for VertexArray {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexArray {
    /// Wiring with only the per-vertex slot declared.
    pub fn new() -> Self {
        let mut slots = [None, None];
        slots[VERTEX_BINDING_SLOT as usize] = Some(SPHERE_VERTEX_LAYOUT);
        Self { slots }
    }

    /// Declare the per-instance slot. Idempotent.
    pub fn declare_instance_slot(&mut self) {
        self.slots[INSTANCE_BINDING_SLOT as usize] = Some(INSTANCE_LAYOUT);
    }

    /// The layout bound to `slot`, if declared.
    pub fn slot(&self, slot: u32) -> Option<&wgpu::VertexBufferLayout<'static>> {
        self.slots.get(slot as usize).and_then(Option::as_ref)
    }

    /// Whether both slots are declared.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Declared layouts in slot order, for render pipeline creation.
    pub fn buffer_layouts(&self) -> Vec<wgpu::VertexBufferLayout<'static>> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// Shader locations fed by the declared slots, in slot order.
    pub fn attribute_locations(&self) -> Vec<u32> {
        self.slots
            .iter()
            .flatten()
            .flat_map(|layout| layout.attributes.iter().map(|a| a.shader_location))
            .collect()
    }
}

/// The resources created together by `setup_buffers` and released together
/// by `cleanup`. Each handle is released at most once.
///
/// Buffers are released by dropping the handle; wgpu frees them once work
/// already recorded against them has retired.
#[derive(Default)]
struct SphereBuffers {
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    vertex_array: Option<VertexArray>,
}

impl SphereBuffers {
    fn is_live(&self) -> bool {
        self.vertex_buffer.is_some() || self.index_buffer.is_some() || self.vertex_array.is_some()
    }

    /// Release whatever is still held. Returns how many handles were freed.
    fn release(&mut self) -> usize {
        let mut released = 0;
        if self.index_buffer.take().is_some() {
            released += 1;
        }
        if self.vertex_buffer.take().is_some() {
            released += 1;
        }
        if self.vertex_array.take().is_some() {
            released += 1;
        }
        released
    }
}

impl Drop for SphereBuffers {
    fn drop(&mut self) {
        self.release();
    }
}

/// A sphere mesh prepared for instanced drawing.
///
/// The instance buffer passed to [`setup_instance_buffer`](Self::setup_instance_buffer)
/// stays owned by the caller. The mesh keeps a handle to it for binding but
/// never writes, resizes, or destroys it; the owner must keep it valid (and
/// filled) for as long as it is bound.
pub struct SphereMesh {
    state: MeshState,
    geometry: Option<SphereGeometry>,
    buffers: SphereBuffers,
    instance_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
    index_count: u32,
}

impl Default for SphereMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl SphereMesh {
    /// An empty mesh with no geometry and no GPU resources.
    pub fn new() -> Self {
        Self {
            state: MeshState::Uninitialized,
            geometry: None,
            buffers: SphereBuffers::default(),
            instance_buffer: None,
            vertex_count: 0,
            index_count: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MeshState {
        self.state
    }

    /// Number of indices drawn per instance (0 until buffers exist).
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Number of uploaded vertices (0 until buffers exist).
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// The cached geometry, if any.
    pub fn geometry(&self) -> Option<&SphereGeometry> {
        self.geometry.as_ref()
    }

    /// The attribute wiring, present while buffers are live.
    pub fn vertex_array(&self) -> Option<&VertexArray> {
        self.buffers.vertex_array.as_ref()
    }

    #[cfg(test)]
    fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffers.vertex_buffer.as_ref()
    }

    /// Whether an instance buffer is associated with slot 1.
    pub fn has_instance_buffer(&self) -> bool {
        self.instance_buffer.is_some()
    }

    /// Tessellate and cache geometry for the next [`setup_buffers`](Self::setup_buffers).
    ///
    /// Rejected while GPU buffers exist: regeneration needs a full
    /// `cleanup` + `setup_buffers` cycle (see [`regenerate`](Self::regenerate)).
    pub fn generate(&mut self, params: SphereParams) -> Result<(), SphereMeshError> {
        if self.buffers.is_live() {
            return Err(report(UsageError::BuffersLive).into());
        }
        self.geometry = Some(params.generate()?);
        Ok(())
    }

    /// Upload the cached geometry and declare the per-vertex attributes.
    ///
    /// Vertex data goes to slot 0 with a stride of one `Vertex`; positions
    /// feed location 0 and normals location 1. Both buffers are static.
    pub fn setup_buffers(&mut self, device: &wgpu::Device) -> Result<(), UsageError> {
        if self.buffers.is_live() {
            return Err(report(UsageError::AlreadyInitialized));
        }
        let Some(geometry) = self.geometry.as_ref() else {
            return Err(report(UsageError::NoGeometry));
        };

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cell-sphere-vertices"),
            contents: geometry.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cell-sphere-indices"),
            contents: geometry.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.buffers = SphereBuffers {
            vertex_buffer: Some(vertex_buffer),
            index_buffer: Some(index_buffer),
            vertex_array: Some(VertexArray::new()),
        };
        self.vertex_count = geometry.vertex_count();
        self.index_count = geometry.index_count();
        self.state = MeshState::BuffersReady;

        log::debug!(
            "Uploaded sphere buffers: {} vertices, {} indices",
            self.vertex_count,
            self.index_count
        );
        Ok(())
    }

    /// Associate the caller's instance buffer with slot 1.
    ///
    /// One `vec4<f32>` per instance feeds location 2. The buffer is neither
    /// copied nor validated; sizing it for the instance counts passed to
    /// [`render`](Self::render) is the caller's job. A later call replaces
    /// the association.
    pub fn setup_instance_buffer(
        &mut self,
        instance_buffer: &wgpu::Buffer,
    ) -> Result<(), UsageError> {
        let Some(vertex_array) = self.buffers.vertex_array.as_mut() else {
            return Err(report(UsageError::NotInitialized));
        };
        vertex_array.declare_instance_slot();

        if self.instance_buffer.is_some() {
            log::trace!("Replacing sphere instance buffer association");
        }
        self.instance_buffer = Some(instance_buffer.clone());
        self.state = MeshState::InstanceBound;
        Ok(())
    }

    /// Record one instanced, indexed draw of the whole sphere.
    ///
    /// Misuse is reported and skipped rather than propagated. Zero instances
    /// is valid and records nothing.
    pub fn render<T: DrawTarget + ?Sized>(
        &self,
        target: &mut T,
        instance_count: u32,
    ) -> RenderOutcome {
        let (Some(vertex_buffer), Some(index_buffer), Some(_)) = (
            self.buffers.vertex_buffer.as_ref(),
            self.buffers.index_buffer.as_ref(),
            self.buffers.vertex_array.as_ref(),
        ) else {
            return RenderOutcome::Skipped(report(UsageError::NotInitialized));
        };
        if self.index_count == 0 {
            return RenderOutcome::Skipped(report(UsageError::NotInitialized));
        }
        if instance_count == 0 {
            return RenderOutcome::NothingToDraw;
        }
        let Some(instance_buffer) = self.instance_buffer.as_ref() else {
            return RenderOutcome::Skipped(report(UsageError::InstanceBufferUnbound));
        };

        target.set_vertex_buffer(VERTEX_BINDING_SLOT, vertex_buffer);
        target.set_vertex_buffer(INSTANCE_BINDING_SLOT, instance_buffer);
        target.set_index_buffer(index_buffer, wgpu::IndexFormat::Uint32);
        target.draw_indexed(0..self.index_count, 0, 0..instance_count);

        RenderOutcome::Drawn {
            index_count: self.index_count,
            instance_count,
        }
    }

    /// Release all GPU resources and cached geometry.
    ///
    /// Safe in any state and safe to repeat. The instance buffer association
    /// is dropped but the buffer itself is left to its owner.
    pub fn cleanup(&mut self) {
        let released = self.buffers.release();
        self.instance_buffer = None;
        self.geometry = None;
        self.vertex_count = 0;
        self.index_count = 0;
        self.state = MeshState::Destroyed;

        if released > 0 {
            log::debug!("Released {released} sphere mesh resources");
        } else {
            log::trace!("Sphere mesh cleanup with nothing to release");
        }
    }

    /// Re-tessellate at a new resolution: `cleanup`, `generate`, `setup_buffers`.
    ///
    /// The instance buffer must be bound again afterwards. Invalid `params`
    /// are rejected before anything is released.
    pub fn regenerate(
        &mut self,
        device: &wgpu::Device,
        params: SphereParams,
    ) -> Result<(), SphereMeshError> {
        params.validate()?;
        self.cleanup();
        self.generate(params)?;
        self.setup_buffers(device)?;
        Ok(())
    }
}

impl Drop for SphereMesh {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn report(err: UsageError) -> UsageError {
    log::warn!("SphereMesh misuse: {err}");
    err
}
