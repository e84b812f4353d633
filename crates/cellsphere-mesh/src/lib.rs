//! Sphere tessellation and GPU record layouts for instanced cell rendering.
//!
//! Nothing in this crate touches a GPU device: it produces vertex/index data
//! and the canonical `wgpu::VertexBufferLayout`s that every cell pipeline
//! must share.

pub mod error;
pub mod instance;
pub mod sphere;
pub mod vertex_format;

pub use error::MeshError;
pub use instance::InstancePayload;
pub use sphere::{SphereGeometry, SphereParams, Vertex, generate_sphere};
pub use vertex_format::{
    INSTANCE_ATTRIBUTES, INSTANCE_BINDING_SLOT, INSTANCE_LAYOUT, INSTANCE_LOCATION,
    NORMAL_LOCATION, POSITION_LOCATION, SPHERE_VERTEX_ATTRIBUTES, SPHERE_VERTEX_LAYOUT,
    VERTEX_BINDING_SLOT, sphere_buffer_layouts,
};
