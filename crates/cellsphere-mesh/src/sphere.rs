//! UV-sphere tessellation.
//!
//! The sphere is laid out as `latitude_segments + 1` rings from the north
//! pole (`θ = 0`) to the south pole (`θ = π`), each holding
//! `longitude_segments + 1` columns. The last column repeats the first at
//! `φ = 2π` so the seam has its own indices; the index buffer relies on that
//! when it wraps around.
//!
//! Polar cells produce zero-area triangles. They are kept: buffer sizes are
//! derived from `(L+1)(N+1)` vertices and `6LN` indices, and downstream code
//! may size instance/index data from those formulas.

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::error::MeshError;

/// A sphere vertex as uploaded to binding slot 0.
///
/// Layout (24 bytes total):
///   - `[0..12]`  position `[f32; 3]`
///   - `[12..24]` normal `[f32; 3]`
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position, already scaled by the sphere radius.
    pub position: [f32; 3],
    /// Unit outward normal.
    pub normal: [f32; 3],
}

static_assertions::assert_eq_size!(Vertex, [f32; 6]);
static_assertions::const_assert_eq!(std::mem::align_of::<Vertex>(), 4);
static_assertions::const_assert_eq!(std::mem::offset_of!(Vertex, position), 0);
static_assertions::const_assert_eq!(std::mem::offset_of!(Vertex, normal), 12);

impl Vertex {
    /// Build a vertex from glam vectors.
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }

    /// Position as a [`Vec3`].
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Normal as a [`Vec3`].
    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// Tessellation inputs for [`generate_sphere`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    /// Number of latitude bands (rings minus one). Must be at least 1.
    pub latitude_segments: u32,
    /// Number of longitude bands (columns minus one). Must be at least 1.
    pub longitude_segments: u32,
    /// Sphere radius. Must be finite and positive.
    pub radius: f32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            latitude_segments: 16,
            longitude_segments: 32,
            radius: 1.0,
        }
    }
}

impl SphereParams {
    /// Bundle tessellation inputs. Call [`validate`](Self::validate) or
    /// [`generate`](Self::generate) to check them.
    pub fn new(latitude_segments: u32, longitude_segments: u32, radius: f32) -> Self {
        Self {
            latitude_segments,
            longitude_segments,
            radius,
        }
    }

    /// Vertex count `(L+1)(N+1)`, saturating on overflow.
    pub fn vertex_count(&self) -> u64 {
        (u64::from(self.latitude_segments) + 1)
            .saturating_mul(u64::from(self.longitude_segments) + 1)
    }

    /// Index count `6LN`, saturating on overflow.
    pub fn index_count(&self) -> u64 {
        u64::from(self.latitude_segments)
            .saturating_mul(u64::from(self.longitude_segments))
            .saturating_mul(6)
    }

    /// Reject inputs the tessellator cannot handle.
    ///
    /// Segment counts must be non-zero, the radius finite and positive, and
    /// the resulting mesh addressable with 32-bit indices and a 32-bit draw
    /// count.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.latitude_segments == 0 {
            return Err(MeshError::invalid(
                "latitude_segments",
                "must be at least 1",
            ));
        }
        if self.longitude_segments == 0 {
            return Err(MeshError::invalid(
                "longitude_segments",
                "must be at least 1",
            ));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(MeshError::invalid(
                "radius",
                format!("must be finite and positive, got {}", self.radius),
            ));
        }
        if self.vertex_count() > u64::from(u32::MAX) + 1 {
            return Err(MeshError::invalid(
                "latitude_segments",
                format!(
                    "{}x{} segments exceed the 32-bit index range",
                    self.latitude_segments, self.longitude_segments
                ),
            ));
        }
        if self.index_count() > u64::from(u32::MAX) {
            return Err(MeshError::invalid(
                "longitude_segments",
                format!(
                    "{}x{} segments exceed the 32-bit draw range",
                    self.latitude_segments, self.longitude_segments
                ),
            ));
        }
        Ok(())
    }

    /// Validate and tessellate.
    pub fn generate(&self) -> Result<SphereGeometry, MeshError> {
        self.validate()?;

        let lat = self.latitude_segments;
        let lon = self.longitude_segments;
        let stride = lon + 1;

        let mut vertices = Vec::with_capacity(self.vertex_count() as usize);
        for ring in 0..=lat {
            let theta = ring as f32 * PI / lat as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();

            for column in 0..=lon {
                let phi = column as f32 * 2.0 * PI / lon as f32;
                let (sin_phi, cos_phi) = phi.sin_cos();

                // Pin the poles so sin(π) round-off cannot split the collapsed ring.
                let direction = if ring == 0 {
                    Vec3::Y
                } else if ring == lat {
                    Vec3::NEG_Y
                } else {
                    Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi)
                };

                vertices.push(Vertex::new(direction * self.radius, direction.normalize()));
            }
        }

        let mut indices = Vec::with_capacity(self.index_count() as usize);
        for ring in 0..lat {
            for column in 0..lon {
                let current = ring * stride + column;
                let next = current + stride;

                indices.extend_from_slice(&[
                    current,
                    next,
                    current + 1,
                    current + 1,
                    next,
                    next + 1,
                ]);
            }
        }

        log::debug!(
            "Generated sphere with {} vertices and {} indices ({}x{} segments, r={})",
            vertices.len(),
            indices.len(),
            lat,
            lon,
            self.radius
        );

        Ok(SphereGeometry {
            vertices,
            indices,
            params: *self,
        })
    }
}

/// Generate a UV sphere.
///
/// Shorthand for `SphereParams::new(..).generate()`.
pub fn generate_sphere(
    latitude_segments: u32,
    longitude_segments: u32,
    radius: f32,
) -> Result<SphereGeometry, MeshError> {
    SphereParams::new(latitude_segments, longitude_segments, radius).generate()
}

/// Tessellated sphere: vertices in ring-major order plus triangle indices.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereGeometry {
    /// Vertices, linear index `ring * (longitude_segments + 1) + column`.
    pub vertices: Vec<Vertex>,
    /// Triangle list indices, 3 per triangle.
    pub indices: Vec<u32>,
    params: SphereParams,
}

impl SphereGeometry {
    /// The inputs this geometry was generated from.
    pub fn params(&self) -> SphereParams {
        self.params
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Number of indices.
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Number of triangles, including the degenerate polar ones.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for GPU upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn triangle(geometry: &SphereGeometry, t: usize) -> [Vec3; 3] {
        let i = &geometry.indices[t * 3..t * 3 + 3];
        [
            geometry.vertices[i[0] as usize].position(),
            geometry.vertices[i[1] as usize].position(),
            geometry.vertices[i[2] as usize].position(),
        ]
    }

    #[test]
    fn test_concrete_two_by_four() {
        let geometry = generate_sphere(2, 4, 1.0).unwrap();
        assert_eq!(geometry.vertex_count(), 15);
        assert_eq!(geometry.index_count(), 48);
        assert_eq!(geometry.triangle_count(), 16);
        assert_eq!(geometry.vertices[0].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_counts_match_formula() {
        for lat in 1..=9u32 {
            for lon in 1..=9u32 {
                let geometry = generate_sphere(lat, lon, 2.5).unwrap();
                let vertex_count = (lat + 1) * (lon + 1);
                assert_eq!(geometry.vertex_count(), vertex_count, "{lat}x{lon}");
                assert_eq!(geometry.index_count(), 6 * lat * lon, "{lat}x{lon}");
                assert_eq!(geometry.indices.len() % 3, 0);
                assert!(geometry.indices.iter().all(|&i| i < vertex_count));

                let params = geometry.params();
                assert_eq!(params.vertex_count(), u64::from(vertex_count));
                assert_eq!(params.index_count(), u64::from(6 * lat * lon));
            }
        }
    }

    #[test]
    fn test_normals_are_unit_and_match_position() {
        let radius = 3.75;
        let geometry = generate_sphere(12, 24, radius).unwrap();
        for vertex in &geometry.vertices {
            let normal = vertex.normal();
            assert!((normal.length() - 1.0).abs() < EPS);
            assert!(normal.abs_diff_eq(vertex.position().normalize(), EPS));
            assert!((vertex.position().length() - radius).abs() < EPS * radius);
        }
    }

    #[test]
    fn test_poles_collapse_to_exact_points() {
        let radius = 0.5;
        let (lat, lon) = (7u32, 11u32);
        let geometry = generate_sphere(lat, lon, radius).unwrap();
        let stride = (lon + 1) as usize;

        for vertex in &geometry.vertices[..stride] {
            assert_eq!(vertex.position, [0.0, radius, 0.0]);
        }
        let last_ring = lat as usize * stride;
        for vertex in &geometry.vertices[last_ring..] {
            assert_eq!(vertex.position, [0.0, -radius, 0.0]);
        }
    }

    #[test]
    fn test_seam_column_duplicates_first_column() {
        let (lat, lon) = (6u32, 8u32);
        let geometry = generate_sphere(lat, lon, 1.0).unwrap();
        let stride = (lon + 1) as usize;

        for ring in 0..=lat as usize {
            let first = geometry.vertices[ring * stride];
            let seam = geometry.vertices[ring * stride + lon as usize];
            assert!(first.position().abs_diff_eq(seam.position(), EPS));
            assert!(first.normal().abs_diff_eq(seam.normal(), EPS));
        }
    }

    #[test]
    fn test_ring_major_storage_order() {
        let (lat, lon) = (4u32, 6u32);
        let geometry = generate_sphere(lat, lon, 1.0).unwrap();
        let stride = (lon + 1) as usize;

        for ring in 1..lat as usize {
            let theta = ring as f32 * PI / lat as f32;
            for column in 0..=lon as usize {
                let y = geometry.vertices[ring * stride + column].position[1];
                assert!((y - theta.cos()).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_cell_triangle_pattern() {
        let lon = 5u32;
        let geometry = generate_sphere(3, lon, 1.0).unwrap();
        // Cell (1, 2) is the 8th cell emitted: current = 1 * 6 + 2, next = current + 6.
        let cell = (lon as usize + 2) * 6;
        assert_eq!(&geometry.indices[cell..cell + 6], &[8, 14, 9, 9, 14, 15]);
    }

    #[test]
    fn test_degenerate_polar_triangles_are_kept() {
        for (lat, lon) in [(1u32, 4u32), (2, 4), (5, 9)] {
            let geometry = generate_sphere(lat, lon, 1.0).unwrap();
            let degenerate = (0..geometry.triangle_count())
                .filter(|&t| {
                    let [a, b, c] = triangle(&geometry, t);
                    (b - a).cross(c - a).length() < EPS
                })
                .count();
            assert_eq!(degenerate, 2 * lon as usize, "{lat}x{lon}");
        }
    }

    #[test]
    fn test_non_polar_triangles_share_one_winding() {
        // Counter-clockwise in a left-handed (y-up, z-forward) frame, which
        // makes the right-handed cross product point inwards.
        let geometry = generate_sphere(8, 16, 1.0).unwrap();
        for t in 0..geometry.triangle_count() {
            let [a, b, c] = triangle(&geometry, t);
            let face_normal = (b - a).cross(c - a);
            if face_normal.length() < EPS {
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) < 0.0, "triangle {t}");
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_sphere(10, 20, 1.25).unwrap();
        let b = generate_sphere(10, 20, 1.25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_byte_views_match_counts() {
        let geometry = generate_sphere(3, 3, 1.0).unwrap();
        assert_eq!(geometry.vertex_bytes().len(), 16 * 24);
        assert_eq!(geometry.index_bytes().len(), 54 * 4);
    }

    #[test]
    fn test_zero_segments_rejected() {
        assert!(matches!(
            generate_sphere(0, 4, 1.0),
            Err(MeshError::InvalidArgument {
                name: "latitude_segments",
                ..
            })
        ));
        assert!(matches!(
            generate_sphere(4, 0, 1.0),
            Err(MeshError::InvalidArgument {
                name: "longitude_segments",
                ..
            })
        ));
    }

    #[test]
    fn test_bad_radius_rejected() {
        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                generate_sphere(4, 4, radius),
                Err(MeshError::InvalidArgument { name: "radius", .. })
            ));
        }
    }

    #[test]
    fn test_index_range_overflow_rejected() {
        let params = SphereParams::new(u32::MAX, u32::MAX, 1.0);
        assert!(params.validate().is_err());
        assert_eq!(params.index_count(), u64::MAX);

        let params = SphereParams::new(1, u32::MAX, 1.0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_default_params_are_valid() {
        let params = SphereParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.vertex_count(), 17 * 33);
    }
}
