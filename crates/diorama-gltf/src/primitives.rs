//! Procedural meshes for ids that do not point at a file.

use std::f32::consts::PI;

use diorama_3d::{MeshData, Vertex};

pub const CUBE_COLOR: [f32; 4] = [0.55, 0.5, 0.45, 1.0];
pub const SPHERE_COLOR: [f32; 4] = [0.3, 0.5, 0.85, 1.0];

/// Unit cube centered at the origin, four vertices per face so every face
/// gets its own normal.
pub fn cube() -> MeshData {
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // normal, u, v
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, u, v) in FACES {
        let base = vertices.len() as u32;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let position = [
                n[0] * 0.5 + u[0] * su + v[0] * sv,
                n[1] * 0.5 + u[1] * su + v[1] * sv,
                n[2] * 0.5 + u[2] * su + v[2] * sv,
            ];
            vertices.push(Vertex {
                position,
                normal: n,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    MeshData {
        vertices,
        indices,
        base_color: CUBE_COLOR,
    }
}

/// UV sphere of radius 0.5.
pub fn sphere(segments: u32, rings: u32) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for segment in 0..=segments {
            let theta = 2.0 * PI * segment as f32 / segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let normal = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
            vertices.push(Vertex {
                position: normal.map(|c| c * 0.5),
                normal,
            });
        }
    }

    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    let row = segments + 1;
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * row + segment;
            let b = a + row;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    MeshData {
        vertices,
        indices,
        base_color: SPHERE_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_quads_on_its_surface() {
        let cube = cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        for v in &cube.vertices {
            let on_face = v.position.iter().any(|c| (c.abs() - 0.5).abs() < 1e-6);
            assert!(on_face, "{:?}", v.position);
        }
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        let sphere = sphere(16, 8);
        assert_eq!(sphere.vertices.len(), 17 * 9);
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertices.len()));
        for v in &sphere.vertices {
            let [x, y, z] = v.position;
            assert!(((x * x + y * y + z * z).sqrt() - 0.5).abs() < 1e-5);
        }
    }
}
