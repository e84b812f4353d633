//! Misuse diagnostics for [`SphereMesh`](crate::SphereMesh).

use cellsphere_mesh::MeshError;

/// An operation was invoked in a state that does not allow it.
///
/// These never abort: the offending call is logged and becomes a no-op, so a
/// render loop that gets its ordering wrong drops a frame instead of the
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// GPU buffers have not been created (or were already released).
    #[error("sphere mesh buffers are not initialized")]
    NotInitialized,

    /// `setup_buffers` was called again without a `cleanup` in between.
    #[error("sphere mesh buffers already exist; call cleanup first")]
    AlreadyInitialized,

    /// `setup_buffers` was called before any geometry was generated.
    #[error("no sphere geometry has been generated")]
    NoGeometry,

    /// Geometry cannot change while GPU buffers built from it are alive.
    #[error("cannot regenerate geometry while GPU buffers are live; call cleanup first")]
    BuffersLive,

    /// `render` was called before an instance buffer was associated.
    #[error("no instance buffer bound to slot 1")]
    InstanceBufferUnbound,
}

/// Errors from operations that both validate geometry input and check state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SphereMeshError {
    /// Tessellation inputs were rejected.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// The operation was out of order.
    #[error(transparent)]
    Usage(#[from] UsageError),
}
