use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};
use umbra_kernel::{Geometry, LightKind};
use umbra_render::ShadowPlan;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default)]
pub(crate) struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn from_geometry(geometry: &Geometry) -> Self {
        match *geometry {
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere_mesh(radius, width_segments, height_segments),
            Geometry::Plane { width, height } => plane_mesh(width, height),
        }
    }
}

/// UV sphere. Segment counts below the usable minimum are raised to it.
pub(crate) fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let normal = [
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            ];
            vertices.push(Vertex {
                position: normal.map(|n| n * radius),
                normal,
                uv: [u, 1.0 - v],
            });
        }
    }

    let row = w + 1;
    let mut indices = Vec::with_capacity((w * (h - 1) * 6) as usize);
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // Pole rows collapse to a single triangle.
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData { vertices, indices }
}

/// Single quad in the XY plane facing +Z.
pub(crate) fn plane_mesh(width: f32, height: f32) -> MeshData {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let normal = [0.0, 0.0, 1.0];
    #[rustfmt::skip]
    let vertices = vec![
        Vertex { position: [-hw,  hh, 0.0], normal, uv: [0.0, 1.0] },
        Vertex { position: [ hw,  hh, 0.0], normal, uv: [1.0, 1.0] },
        Vertex { position: [-hw, -hh, 0.0], normal, uv: [0.0, 0.0] },
        Vertex { position: [ hw, -hh, 0.0], normal, uv: [1.0, 0.0] },
    ];
    MeshData {
        vertices,
        indices: vec![0, 2, 1, 2, 3, 1],
    }
}

fn helper_color(kind: LightKind) -> [f32; 4] {
    match kind {
        LightKind::Directional => [1.0, 0.85, 0.2, 1.0],
        LightKind::Spot => [0.3, 0.9, 0.4, 1.0],
        LightKind::Point => [0.4, 0.6, 1.0, 1.0],
        LightKind::Ambient => [1.0, 1.0, 1.0, 1.0],
    }
}

/// Line list for every visible helper of an active shadow.
pub(crate) fn helper_lines(plan: &ShadowPlan) -> Vec<LineVertex> {
    let mut lines = Vec::new();
    for shadow in plan.active().filter(|s| s.camera.helper_visible) {
        let color = helper_color(shadow.kind);
        for [a, b] in shadow.helper_segments() {
            lines.push(LineVertex {
                position: a.to_array(),
                color,
            });
            lines.push(LineVertex {
                position: b.to_array(),
                color,
            });
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use umbra_kernel::LightRig;

    #[test]
    fn sphere_counts() {
        let mesh = sphere_mesh(0.5, 32, 32);
        assert_eq!(mesh.vertices.len(), 33 * 33);
        assert_eq!(mesh.indices.len(), 32 * (2 * 32 - 2) * 3);
        let max = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let mesh = sphere_mesh(0.5, 16, 8);
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            let n = Vec3::from_array(v.normal);
            assert!((p.length() - 0.5).abs() < 1e-5);
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn sphere_triangles_face_outward() {
        let mesh = sphere_mesh(1.0, 12, 6);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| Vec3::from_array(mesh.vertices[i as usize].position));
            let centroid = (a + b + c) / 3.0;
            assert!((b - a).cross(c - a).dot(centroid) > 0.0);
        }
    }

    #[test]
    fn degenerate_segments_are_raised() {
        let mesh = sphere_mesh(1.0, 0, 0);
        assert_eq!(mesh.vertices.len(), 4 * 3);
        assert!(!mesh.indices.is_empty());
    }

    #[test]
    fn ground_quad_faces_up_after_rotation() {
        let mesh = plane_mesh(5.0, 5.0);
        let rotation = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| rotation * Vec3::from_array(mesh.vertices[i as usize].position));
            let n = (b - a).cross(c - a).normalize();
            assert!((n - Vec3::Y).length() < 1e-5);
        }
        let xs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, vec![-2.5, 2.5, -2.5, 2.5]);
    }

    #[test]
    fn helpers_follow_visibility_flag() {
        let mut rig = LightRig::default();
        assert!(helper_lines(&ShadowPlan::from_rig(&rig)).is_empty());

        rig.set_helpers_visible(true);
        let lines = helper_lines(&ShadowPlan::from_rig(&rig));
        // Directional + spot + 6 point faces, 12 edges each, 2 vertices per edge.
        assert_eq!(lines.len(), (1 + 1 + 6) * 12 * 2);
    }

    #[test]
    fn disabled_shadow_has_no_helper() {
        let mut rig = LightRig::default();
        rig.set_helpers_visible(true);
        rig.update(LightKind::Point, |l| l.shadow_mut().unwrap().near = -1.0);
        let lines = helper_lines(&ShadowPlan::from_rig(&rig));
        assert_eq!(lines.len(), 2 * 12 * 2);
    }
}
