//! CPU-side sphere and ring geometry.

use crate::buffer::VertexPositionNormalUv;
use glam::Vec3;
use orbis_geo::geodetic_to_cartesian;

/// Indexed triangle geometry.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Latitude/longitude sphere of unit radius.
///
/// Vertices come from [`geodetic_to_cartesian`], so texel `(u, v)` sits at
/// longitude `u·360 − 180` and latitude `90 − v·180` and overlay points line
/// up with the equirectangular textures. Triangles wind counter-clockwise
/// seen from outside.
pub fn uv_sphere(width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let lat = 90.0 - v * 180.0;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let lon = u * 360.0 - 180.0;
            let p = geodetic_to_cartesian(lat, lon, 1.0);
            vertices.push(VertexPositionNormalUv {
                position: p.to_array(),
                normal: p.to_array(),
                uv: [u, v],
            });
        }
    }

    let row = w + 1;
    let mut indices = Vec::with_capacity((w * h * 6) as usize);
    for iy in 0..h {
        for ix in 0..w {
            let top_left = iy * row + ix;
            let top_right = top_left + 1;
            let bottom_left = top_left + row;
            let bottom_right = bottom_left + 1;
            // Pole rows collapse one triangle of each quad.
            if iy != h - 1 {
                indices.extend_from_slice(&[bottom_left, bottom_right, top_left]);
            }
            if iy != 0 {
                indices.extend_from_slice(&[top_left, bottom_right, top_right]);
            }
        }
    }

    MeshData { vertices, indices }
}

/// Flat annulus in the XZ plane, normal +Y. `u` runs from inner to outer edge.
pub fn ring(inner_radius: f32, outer_radius: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity(((segments + 1) * 2) as usize);
    for i in 0..=segments {
        let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
        let dir = Vec3::new(angle.cos(), 0.0, angle.sin());
        let v = i as f32 / segments as f32;
        for (radius, u) in [(inner_radius, 0.0), (outer_radius, 1.0)] {
            vertices.push(VertexPositionNormalUv {
                position: (dir * radius).to_array(),
                normal: Vec3::Y.to_array(),
                uv: [u, v],
            });
        }
    }

    let mut indices = Vec::with_capacity((segments * 6) as usize);
    for i in 0..segments {
        let inner = i * 2;
        let outer = inner + 1;
        let next_inner = inner + 2;
        let next_outer = inner + 3;
        indices.extend_from_slice(&[inner, next_outer, outer, inner, next_inner, next_outer]);
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(mesh: &MeshData, idx: u32) -> Vec3 {
        Vec3::from_array(mesh.vertices[idx as usize].position)
    }

    #[test]
    fn test_sphere_vertices_on_unit_sphere() {
        let mesh = uv_sphere(32, 16);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 1.0).abs() < 1e-5, "vertex off sphere: {len}");
        }
    }

    #[test]
    fn test_sphere_indices_valid_and_counted() {
        let mesh = uv_sphere(32, 16);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        // Two triangles per quad, minus one per quad on each pole row.
        assert_eq!(mesh.triangle_count(), 32 * 16 * 2 - 2 * 32);
    }

    #[test]
    fn test_sphere_triangles_face_outward() {
        let mesh = uv_sphere(24, 12);
        for tri in mesh.indices.chunks(3) {
            let (a, b, c) = (
                position(&mesh, tri[0]),
                position(&mesh, tri[1]),
                position(&mesh, tri[2]),
            );
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn test_sphere_uv_matches_geodetic_frame() {
        let mesh = uv_sphere(360, 180);
        // u = 0.5, v = 0.5 is lat 0 lon 0, which sits on +X.
        let v = mesh
            .vertices
            .iter()
            .find(|v| (v.uv[0] - 0.5).abs() < 1e-6 && (v.uv[1] - 0.5).abs() < 1e-6)
            .map(|v| Vec3::from_array(v.position));
        let p = v.unwrap();
        assert!((p - Vec3::X).length() < 1e-5, "got {p}");
    }

    #[test]
    fn test_ring_radii() {
        let mesh = ring(1.4, 2.2, 64);
        for v in &mesh.vertices {
            let r = Vec3::from_array(v.position).length();
            let expected = if v.uv[0] == 0.0 { 1.4 } else { 2.2 };
            assert!((r - expected).abs() < 1e-5);
        }
        assert_eq!(mesh.triangle_count(), 128);
    }
}
