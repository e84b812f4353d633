//! Canonical `wgpu::VertexBufferLayout`s for instanced sphere rendering.
//!
//! Every pipeline that draws the cell sphere references these constants so
//! the shader-location contract cannot drift.
//!
//! ## Attribute Wiring
//!
//! | Location | Slot | Step     | Offset | Format    | Field            |
//! |----------|------|----------|--------|-----------|------------------|
//! | 0        | 0    | Vertex   | 0      | Float32x3 | position         |
//! | 1        | 0    | Vertex   | 12     | Float32x3 | normal           |
//! | 2        | 1    | Instance | 0      | Float32x4 | instance payload |

use std::mem;

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::instance::InstancePayload;
use crate::sphere::Vertex;

/// Binding slot holding the static per-vertex buffer.
pub const VERTEX_BINDING_SLOT: u32 = 0;
/// Binding slot holding the caller's per-instance buffer.
pub const INSTANCE_BINDING_SLOT: u32 = 1;

/// Shader location of the vertex position.
pub const POSITION_LOCATION: u32 = 0;
/// Shader location of the vertex normal.
pub const NORMAL_LOCATION: u32 = 1;
/// Shader location of the per-instance payload.
pub const INSTANCE_LOCATION: u32 = 2;

/// Per-vertex attributes sourced from [`VERTEX_BINDING_SLOT`].
pub const SPHERE_VERTEX_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: mem::offset_of!(Vertex, position) as u64,
        shader_location: POSITION_LOCATION,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: mem::offset_of!(Vertex, normal) as u64,
        shader_location: NORMAL_LOCATION,
    },
];

/// Per-instance attribute sourced from [`INSTANCE_BINDING_SLOT`].
pub const INSTANCE_ATTRIBUTES: [VertexAttribute; 1] = [VertexAttribute {
    format: VertexFormat::Float32x4,
    offset: 0,
    shader_location: INSTANCE_LOCATION,
}];

/// Layout of binding slot 0: one [`Vertex`] per vertex.
pub const SPHERE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<Vertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &SPHERE_VERTEX_ATTRIBUTES,
};

/// Layout of binding slot 1: one [`InstancePayload`] per instance.
pub const INSTANCE_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<InstancePayload>() as u64,
    step_mode: VertexStepMode::Instance,
    attributes: &INSTANCE_ATTRIBUTES,
};

/// Both slot layouts, indexed by binding slot.
pub fn sphere_buffer_layouts() -> [VertexBufferLayout<'static>; 2] {
    [SPHERE_VERTEX_LAYOUT, INSTANCE_LAYOUT]
}

// ---------------------------------------------------------------------------
// Compile-time validation
// ---------------------------------------------------------------------------

const _: () = assert!(
    mem::size_of::<Vertex>() == 24,
    "Vertex size changed; update SPHERE_VERTEX_LAYOUT"
);
const _: () = assert!(
    mem::size_of::<InstancePayload>() == 16,
    "InstancePayload size changed; update INSTANCE_LAYOUT"
);
const _: () = assert!(SPHERE_VERTEX_ATTRIBUTES[1].offset == 12);
const _: () = assert!(
    SPHERE_VERTEX_ATTRIBUTES[1].offset + 12 <= mem::size_of::<Vertex>() as u64,
    "Normal attribute exceeds vertex stride"
);
