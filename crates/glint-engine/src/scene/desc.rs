use crate::gl::{Topology, UniformValue};

/// One vertex attribute stream, uploaded into its own buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDesc {
    /// Vertex stage input name.
    pub name: String,
    /// Floats per vertex, 1..=4.
    pub components: u32,
    pub data: Vec<f32>,
}

impl AttributeDesc {
    pub fn new(name: impl Into<String>, components: u32, data: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            components,
            data,
        }
    }
}

/// Which topology each frame draws with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TopologyMode {
    Fixed(Topology),
    /// Walks [`Topology::ALL`], one step per interval tick.
    Cycle,
}

/// Perspective camera feeding projection/view/model uniforms.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDesc {
    pub fov_degrees: f32,
    pub z_near: f32,
    pub z_max: f32,
    pub view_scale: f32,
    pub view_distance: f32,
    pub projection_uniform: String,
    pub view_uniform: String,
    pub model_uniform: String,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            fov_degrees: 40.0,
            z_near: 1.0,
            z_max: 100.0,
            view_scale: 1.0,
            view_distance: crate::transform::DEFAULT_VIEW_DISTANCE,
            projection_uniform: "u_projection".to_string(),
            view_uniform: "u_view".to_string(),
            model_uniform: "u_model".to_string(),
        }
    }
}

/// Everything needed to stand up one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDesc {
    pub name: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
    /// All streams must describe the same number of vertices.
    pub attributes: Vec<AttributeDesc>,
    /// Draw with `draw_elements` over these when present.
    pub indices: Option<Vec<u16>>,
    pub topology: TopologyMode,
    /// Uploaded once at setup.
    pub uniforms: Vec<(String, UniformValue)>,
    pub camera: Option<CameraDesc>,
    /// Radians per millisecond; `Some` makes the model matrix spin.
    /// Ignored without a camera.
    pub spin_rate: Option<f32>,
    pub depth_test: bool,
    pub clear_color: [f32; 4],
}
