//! Per-instance payload read from binding slot 1.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// One cell instance: world position plus a uniform scale.
///
/// The shader sees this as a single `vec4<f32>` at location 2, so the
/// record must stay exactly 16 bytes with 4-byte alignment. What the four
/// floats mean is a contract between whoever fills the buffer and the
/// shader; the mesh only cares about the stride.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct InstancePayload {
    /// World-space center of the cell.
    pub position: [f32; 3],
    /// Uniform scale applied to the unit-radius sphere.
    pub scale: f32,
}

static_assertions::assert_eq_size!(InstancePayload, [f32; 4]);
static_assertions::const_assert_eq!(std::mem::align_of::<InstancePayload>(), 4);
static_assertions::const_assert_eq!(std::mem::offset_of!(InstancePayload, scale), 12);

impl InstancePayload {
    /// Create a payload for a cell centered at `position`.
    pub fn new(position: Vec3, scale: f32) -> Self {
        Self {
            position: position.to_array(),
            scale,
        }
    }

    /// The payload as the shader reads it.
    pub fn to_vec4(&self) -> Vec4 {
        Vec3::from_array(self.position).extend(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_packs_as_vec4() {
        let payload = InstancePayload::new(Vec3::new(1.0, 2.0, 3.0), 0.5);
        assert_eq!(payload.to_vec4(), Vec4::new(1.0, 2.0, 3.0, 0.5));

        let bytes: &[u8] = bytemuck::bytes_of(&payload);
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.5]);
    }

    #[test]
    fn test_payload_slice_stride() {
        let payloads = vec![InstancePayload::default(); 10];
        let bytes: &[u8] = bytemuck::cast_slice(&payloads);
        assert_eq!(bytes.len(), 10 * 16);
    }
}
