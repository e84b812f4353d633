//! wgpu side of the cell sphere: buffer ownership, instance binding, the
//! instanced draw call, and the small amount of pipeline/target plumbing
//! needed to run it headlessly.

pub mod draw;
pub mod error;
pub mod gpu;
pub mod pipeline;
pub mod sphere_mesh;
pub mod target;

pub use draw::DrawTarget;
pub use error::{SphereMeshError, UsageError};
pub use gpu::{RenderContext, RenderContextError, init_render_context_blocking};
pub use pipeline::{CELL_SHADER_SOURCE, CameraUniform, CellPipeline};
pub use sphere_mesh::{MeshState, RenderOutcome, SphereMesh, VertexArray};
pub use target::{OffscreenTarget, ReadbackError};
