//! The built-in scenes.

use glam::{Mat4, Vec3};

use crate::gl::{Topology, UniformValue};
use crate::transform::DEFAULT_ANGULAR_RATE;

use super::desc::{AttributeDesc, CameraDesc, SceneDesc, TopologyMode};

const FLAT2D_VS: &str = include_str!("shaders/flat2d.vert.wgsl");
const FLAT3D_VS: &str = include_str!("shaders/flat3d.vert.wgsl");
const SOLID_FS: &str = include_str!("shaders/solid.frag.wgsl");
const COLORED_VS: &str = include_str!("shaders/colored.vert.wgsl");
const COLORED_FS: &str = include_str!("shaders/colored.frag.wgsl");
const XFORM_VS: &str = include_str!("shaders/xform.vert.wgsl");
const MVP_VS: &str = include_str!("shaders/mvp.vert.wgsl");

/// Grey, nearly opaque.
pub const CLEAR_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 0.9];

/// Preset names accepted by [`by_name`].
pub const NAMES: [&str; 6] = [
    "static_triangle",
    "point_cloud",
    "topology_cycle",
    "indexed_quad",
    "transformed_triangle",
    "rotating_triangle",
];

/// Looks a preset up by its name in [`NAMES`].
pub fn by_name(name: &str) -> Option<SceneDesc> {
    match name {
        "static_triangle" => Some(static_triangle()),
        "point_cloud" => Some(point_cloud()),
        "topology_cycle" => Some(topology_cycle()),
        "indexed_quad" => Some(indexed_quad()),
        "transformed_triangle" => Some(transformed_triangle()),
        "rotating_triangle" => Some(rotating_triangle()),
        _ => None,
    }
}

fn base(name: &str, vs: &str, fs: &str, attributes: Vec<AttributeDesc>) -> SceneDesc {
    SceneDesc {
        name: name.to_string(),
        vertex_shader: vs.to_string(),
        fragment_shader: fs.to_string(),
        attributes,
        indices: None,
        topology: TopologyMode::Fixed(Topology::Triangles),
        uniforms: Vec::new(),
        camera: None,
        spin_rate: None,
        depth_test: false,
        clear_color: CLEAR_COLOR,
    }
}

/// One flat 2D triangle.
pub fn static_triangle() -> SceneDesc {
    base(
        "static_triangle",
        FLAT2D_VS,
        SOLID_FS,
        vec![AttributeDesc::new(
            "coordinates",
            2,
            vec![-0.9, 0.9, -0.1, -0.9, 0.8, 0.2],
        )],
    )
}

/// Three points.
pub fn point_cloud() -> SceneDesc {
    SceneDesc {
        topology: TopologyMode::Fixed(Topology::Points),
        ..base(
            "point_cloud",
            FLAT3D_VS,
            SOLID_FS,
            vec![AttributeDesc::new(
                "coordinates",
                3,
                vec![-0.5, 0.5, 0.0, 0.0, 0.5, 0.0, -0.25, 0.25, 0.0],
            )],
        )
    }
}

/// Six vertices redrawn with a different topology every interval tick.
pub fn topology_cycle() -> SceneDesc {
    SceneDesc {
        topology: TopologyMode::Cycle,
        ..base(
            "topology_cycle",
            FLAT3D_VS,
            SOLID_FS,
            vec![AttributeDesc::new(
                "coordinates",
                3,
                vec![
                    -0.7, -0.1, 0.0, //
                    -0.3, 0.6, 0.0, //
                    -0.3, -0.3, 0.0, //
                    0.2, 0.6, 0.0, //
                    0.3, -0.3, 0.0, //
                    0.7, 0.6, 0.0,
                ],
            )],
        )
    }
}

/// A quad from two indexed triangles with per-vertex colour.
pub fn indexed_quad() -> SceneDesc {
    SceneDesc {
        indices: Some(vec![3, 2, 1, 3, 1, 0]),
        ..base(
            "indexed_quad",
            COLORED_VS,
            COLORED_FS,
            vec![
                AttributeDesc::new(
                    "coordinates",
                    3,
                    vec![
                        -0.5, 0.5, 0.0, //
                        -0.5, -0.5, 0.0, //
                        0.5, -0.5, 0.0, //
                        0.5, 0.5, 0.0,
                    ],
                ),
                AttributeDesc::new(
                    "color",
                    3,
                    vec![
                        0.0, 0.0, 1.0, //
                        1.0, 0.0, 0.0, //
                        0.0, 1.0, 0.0, //
                        1.0, 0.0, 1.0,
                    ],
                ),
            ],
        )
    }
}

/// A triangle moved by a fixed translate * rotate * scale matrix.
pub fn transformed_triangle() -> SceneDesc {
    let xform = Mat4::from_translation(Vec3::new(0.3, 0.2, 0.0))
        * Mat4::from_rotation_z(std::f32::consts::FRAC_PI_6)
        * Mat4::from_scale(Vec3::new(1.0, 1.5, 1.0));

    SceneDesc {
        uniforms: vec![("u_xform".to_string(), UniformValue::from(xform))],
        ..base(
            "transformed_triangle",
            XFORM_VS,
            SOLID_FS,
            vec![AttributeDesc::new(
                "coordinates",
                3,
                vec![0.0, 0.5, 0.0, -0.5, -0.5, 0.0, 0.5, -0.5, 0.0],
            )],
        )
    }
}

/// An indexed, coloured triangle under perspective, spinning about Z.
pub fn rotating_triangle() -> SceneDesc {
    SceneDesc {
        indices: Some(vec![0, 1, 2]),
        camera: Some(CameraDesc::default()),
        spin_rate: Some(DEFAULT_ANGULAR_RATE),
        depth_test: true,
        ..base(
            "rotating_triangle",
            MVP_VS,
            COLORED_FS,
            vec![
                AttributeDesc::new(
                    "position",
                    3,
                    vec![-1.0, -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0],
                ),
                AttributeDesc::new(
                    "color",
                    3,
                    vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
                ),
            ],
        )
    }
}
