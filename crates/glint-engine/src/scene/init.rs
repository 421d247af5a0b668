use glam::Mat4;

use crate::binding::{bind_attribute_from, get_uniform_location};
use crate::buffer::{create_index_buffer, create_vertex_buffer};
use crate::gl::{
    AttribLocation, Backend, BufferHandle, BufferTarget, Capability, ClearMask, Context, GlError,
    IndexType, ProgramHandle, ShaderHandle, ShaderStage, Topology, UniformLocation, UniformValue,
};
use crate::shader::{compile_shader, link_program, FailurePolicy};
use crate::transform::{build_projection, build_view_at, Spin};

use super::desc::{CameraDesc, SceneDesc, TopologyMode};
use super::SceneError;

/// A vertex stream owned by a scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SceneAttribute {
    pub buffer: BufferHandle,
    /// `INVALID` when the name did not resolve under a permissive policy.
    pub location: AttribLocation,
}

/// Uniform locations a scene resolved at setup, so frames never look
/// anything up by name.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneUniforms {
    pub projection: UniformLocation,
    pub view: UniformLocation,
    pub model: UniformLocation,
    /// Set once at setup, kept so `resize` and re-uploads can reuse them.
    pub statics: Vec<(UniformLocation, UniformValue)>,
}

impl SceneUniforms {
    fn unresolved() -> Self {
        Self {
            projection: UniformLocation::INVALID,
            view: UniformLocation::INVALID,
            model: UniformLocation::INVALID,
            statics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Camera {
    desc: CameraDesc,
    projection: Mat4,
    view: Mat4,
    model: Mat4,
}

/// GPU resources and per-frame state of one initialized scene.
#[derive(Debug)]
pub struct Scene {
    name: String,
    program: ProgramHandle,
    shaders: [ShaderHandle; 2],
    attributes: Vec<SceneAttribute>,
    index_buffer: Option<(BufferHandle, u32)>,
    vertex_count: u32,
    topology: TopologyMode,
    uniforms: SceneUniforms,
    camera: Option<Camera>,
    spin: Option<Spin>,
    depth_test: bool,
    clear_color: [f32; 4],
    diagnostics: Vec<String>,
}

/// Uploads geometry, builds the program, wires attributes and uniforms, and
/// sets clear colour, depth test and a full-surface viewport.
///
/// Under [`FailurePolicy::Permissive`] shader and name-resolution problems
/// are logged and collected in [`Scene::diagnostics`]; under `Strict` the
/// first one aborts setup. Resources created before an abort are not
/// released.
pub fn initialize<B: Backend>(
    ctx: &mut Context<B>,
    desc: &SceneDesc,
    policy: FailurePolicy,
) -> Result<Scene, SceneError> {
    let vertex_count = validate(desc)?;
    log::info!("initializing scene `{}` ({vertex_count} vertices)", desc.name);

    let mut diagnostics = Vec::new();

    let buffers = desc
        .attributes
        .iter()
        .map(|a| create_vertex_buffer(ctx, &a.data))
        .collect::<Result<Vec<_>, GlError>>()?;

    let index_buffer = match &desc.indices {
        Some(indices) => Some((create_index_buffer(ctx, indices)?, indices.len() as u32)),
        None => None,
    };

    let vs = compile_shader(ctx, &desc.vertex_shader, ShaderStage::Vertex)?;
    let fs = compile_shader(ctx, &desc.fragment_shader, ShaderStage::Fragment)?;
    for (build, stage) in [(&vs, ShaderStage::Vertex), (&fs, ShaderStage::Fragment)] {
        if let Some(log) = &build.log {
            if policy == FailurePolicy::Strict {
                return Err(SceneError::Compile {
                    stage,
                    log: log.clone(),
                });
            }
            diagnostics.push(format!("{stage} shader: {log}"));
        }
    }

    let linked = link_program(ctx, &[vs.handle, fs.handle])?;
    if let Some(log) = &linked.log {
        if policy == FailurePolicy::Strict {
            return Err(SceneError::Link { log: log.clone() });
        }
        diagnostics.push(format!("link: {log}"));
    }
    let program = linked.handle;

    let mut attributes = Vec::with_capacity(buffers.len());
    for (attr, &buffer) in desc.attributes.iter().zip(&buffers) {
        let bound = bind_attribute_from(ctx, program, buffer, &attr.name, attr.components);
        if let Err(e) = &bound {
            diagnostics.push(e.to_string());
        }
        let location = policy.resolve(bound, AttribLocation::INVALID)?;
        attributes.push(SceneAttribute { buffer, location });
    }

    let mut resolve_uniform = |ctx: &Context<B>, name: &str| {
        let found = get_uniform_location(ctx, program, name);
        if let Err(e) = &found {
            diagnostics.push(e.to_string());
        }
        policy.resolve(found, UniformLocation::INVALID)
    };

    let mut uniforms = SceneUniforms::unresolved();
    for (name, value) in &desc.uniforms {
        let location = resolve_uniform(&*ctx, name)?;
        uniforms.statics.push((location, *value));
    }

    let (width, height) = ctx.size();
    let camera = match &desc.camera {
        Some(cam) => {
            uniforms.projection = resolve_uniform(&*ctx, &cam.projection_uniform)?;
            uniforms.view = resolve_uniform(&*ctx, &cam.view_uniform)?;
            uniforms.model = resolve_uniform(&*ctx, &cam.model_uniform)?;
            Some(Camera {
                projection: projection_for(cam, width, height),
                view: build_view_at(cam.view_scale, cam.view_distance),
                model: Mat4::IDENTITY,
                desc: cam.clone(),
            })
        }
        None => None,
    };

    let spin = match (&camera, desc.spin_rate) {
        (Some(_), Some(rate)) => Some(Spin::new(rate)),
        _ => None,
    };

    let scene = Scene {
        name: desc.name.clone(),
        program,
        shaders: [vs.handle, fs.handle],
        attributes,
        index_buffer,
        vertex_count,
        topology: desc.topology,
        uniforms,
        camera,
        spin,
        depth_test: desc.depth_test,
        clear_color: desc.clear_color,
        diagnostics,
    };

    for (location, value) in &scene.uniforms.statics {
        ctx.uniform(*location, *value)?;
    }
    scene.upload_camera(ctx)?;

    if scene.depth_test {
        ctx.enable(Capability::DepthTest)?;
    } else {
        ctx.disable(Capability::DepthTest)?;
    }
    let [r, g, b, a] = scene.clear_color;
    ctx.clear_color(r, g, b, a)?;
    ctx.viewport(0, 0, width as i32, height as i32)?;

    if scene.diagnostics.is_empty() {
        log::info!("scene `{}` ready", scene.name);
    } else {
        log::warn!(
            "scene `{}` ready with {} diagnostic(s)",
            scene.name,
            scene.diagnostics.len()
        );
    }
    Ok(scene)
}

fn validate(desc: &SceneDesc) -> Result<u32, SceneError> {
    let first = desc.attributes.first().ok_or(SceneError::NoAttributes)?;

    let mut vertex_count = None;
    for attr in &desc.attributes {
        if !(1..=4).contains(&attr.components) {
            return Err(GlError::InvalidComponentCount(attr.components).into());
        }
        if attr.data.len() % attr.components as usize != 0 {
            return Err(SceneError::RaggedAttribute {
                name: attr.name.clone(),
                len: attr.data.len(),
                components: attr.components,
            });
        }
        let count = (attr.data.len() / attr.components as usize) as u32;
        match vertex_count {
            None => vertex_count = Some(count),
            Some(expected) if expected != count => {
                return Err(SceneError::VertexCountMismatch {
                    name: attr.name.clone(),
                    expected,
                    got: count,
                    first: first.name.clone(),
                });
            }
            Some(_) => {}
        }
    }
    let vertex_count = vertex_count.unwrap_or(0);

    if let Some(indices) = &desc.indices {
        if let Some(&index) = indices.iter().find(|&&i| u32::from(i) >= vertex_count) {
            return Err(SceneError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
    }

    Ok(vertex_count)
}

fn projection_for(cam: &CameraDesc, width: u32, height: u32) -> Mat4 {
    let aspect = width as f32 / height.max(1) as f32;
    build_projection(cam.fov_degrees, aspect, cam.z_near, cam.z_max)
}

impl Scene {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn attributes(&self) -> &[SceneAttribute] {
        &self.attributes
    }

    pub fn uniforms(&self) -> &SceneUniforms {
        &self.uniforms
    }

    pub fn index_buffer(&self) -> Option<BufferHandle> {
        self.index_buffer.map(|(buffer, _)| buffer)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Vertices or indices consumed per draw.
    pub fn draw_count(&self) -> u32 {
        match self.index_buffer {
            Some((_, count)) => count,
            None => self.vertex_count,
        }
    }

    pub fn topology_mode(&self) -> TopologyMode {
        self.topology
    }

    pub fn is_animated(&self) -> bool {
        self.spin.is_some()
    }

    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Buffers cleared at the top of each frame.
    pub fn clear_mask(&self) -> ClearMask {
        if self.depth_test {
            ClearMask::COLOR | ClearMask::DEPTH
        } else {
            ClearMask::COLOR
        }
    }

    /// Problems tolerated during a permissive setup.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn projection(&self) -> Option<Mat4> {
        self.camera.as_ref().map(|c| c.projection)
    }

    pub fn model(&self) -> Option<Mat4> {
        self.camera.as_ref().map(|c| c.model)
    }

    /// Total spin applied to the model, in radians.
    pub fn spin_angle(&self) -> f32 {
        self.spin.as_ref().map_or(0.0, Spin::angle)
    }

    /// Advances the spin to `timestamp_ms` and pushes the matrices.
    /// No-op for static scenes.
    pub fn animate<B: Backend>(
        &mut self,
        ctx: &mut Context<B>,
        timestamp_ms: f64,
    ) -> Result<(), GlError> {
        let (Some(spin), Some(camera)) = (self.spin.as_mut(), self.camera.as_mut()) else {
            return Ok(());
        };
        spin.apply(&mut camera.model, timestamp_ms);
        self.upload_camera(ctx)
    }

    fn upload_camera<B: Backend>(&self, ctx: &mut Context<B>) -> Result<(), GlError> {
        let Some(camera) = &self.camera else {
            return Ok(());
        };
        ctx.uniform_matrix4fv(self.uniforms.projection, &camera.projection.to_cols_array())?;
        ctx.uniform_matrix4fv(self.uniforms.view, &camera.view.to_cols_array())?;
        ctx.uniform_matrix4fv(self.uniforms.model, &camera.model.to_cols_array())
    }

    /// Issues this scene's draw call with `topology`.
    pub fn draw<B: Backend>(&self, ctx: &mut Context<B>, topology: Topology) -> Result<(), GlError> {
        ctx.use_program(Some(self.program))?;
        match self.index_buffer {
            Some((buffer, count)) => {
                ctx.bind_buffer(BufferTarget::ElementArray, Some(buffer))?;
                ctx.draw_elements(topology, count, IndexType::UnsignedShort, 0)
            }
            None => ctx.draw_arrays(topology, 0, self.vertex_count),
        }
    }

    /// Follows a surface resize: full-surface viewport and, for camera
    /// scenes, a projection with the new aspect ratio.
    pub fn resize<B: Backend>(
        &mut self,
        ctx: &mut Context<B>,
        width: u32,
        height: u32,
    ) -> Result<(), GlError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        ctx.resize(width, height);
        ctx.viewport(0, 0, width as i32, height as i32)?;

        if let Some(camera) = self.camera.as_mut() {
            camera.projection = projection_for(&camera.desc, width, height);
            ctx.use_program(Some(self.program))?;
            ctx.uniform_matrix4fv(self.uniforms.projection, &camera.projection.to_cols_array())?;
        }
        log::debug!("scene `{}` resized to {width}x{height}", self.name);
        Ok(())
    }

    /// Releases every GPU object the scene owns.
    pub fn destroy<B: Backend>(self, ctx: &mut Context<B>) -> Result<(), GlError> {
        for attr in &self.attributes {
            ctx.delete_buffer(attr.buffer)?;
        }
        if let Some((buffer, _)) = self.index_buffer {
            ctx.delete_buffer(buffer)?;
        }
        ctx.delete_program(self.program)?;
        for shader in self.shaders {
            ctx.delete_shader(shader);
        }
        log::debug!("scene `{}` destroyed", self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindError;
    use crate::gl::{Command, RecordingBackend, ViewportRect};
    use crate::scene::{AttributeDesc, presets};

    fn ctx() -> Context<RecordingBackend> {
        Context::new(RecordingBackend::new(), 640, 480).unwrap()
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn empty_scene_is_rejected() {
        let mut desc = presets::static_triangle();
        desc.attributes.clear();
        let err = initialize(&mut ctx(), &desc, FailurePolicy::Permissive).unwrap_err();
        assert_eq!(err, SceneError::NoAttributes);
    }

    #[test]
    fn ragged_data_is_rejected() {
        let mut desc = presets::static_triangle();
        desc.attributes[0].data.pop();
        let err = initialize(&mut ctx(), &desc, FailurePolicy::Permissive).unwrap_err();
        assert!(matches!(err, SceneError::RaggedAttribute { len: 5, components: 2, .. }));
    }

    #[test]
    fn streams_must_agree_on_vertex_count() {
        let mut desc = presets::indexed_quad();
        desc.attributes[1] = AttributeDesc::new("color", 3, vec![1.0; 9]);
        let err = initialize(&mut ctx(), &desc, FailurePolicy::Permissive).unwrap_err();
        assert!(matches!(
            err,
            SceneError::VertexCountMismatch { expected: 4, got: 3, .. }
        ));
    }

    #[test]
    fn indices_must_reference_vertices() {
        let mut desc = presets::indexed_quad();
        desc.indices = Some(vec![0, 1, 4]);
        let err = initialize(&mut ctx(), &desc, FailurePolicy::Permissive).unwrap_err();
        assert_eq!(
            err,
            SceneError::IndexOutOfRange {
                index: 4,
                vertex_count: 4
            }
        );
    }

    // ── setup ─────────────────────────────────────────────────────────────

    #[test]
    fn every_preset_initializes_cleanly() {
        for name in presets::NAMES {
            let mut ctx = ctx();
            let desc = presets::by_name(name).unwrap();
            let scene = initialize(&mut ctx, &desc, FailurePolicy::Strict)
                .unwrap_or_else(|e| panic!("{name}: {e}"));
            assert!(scene.diagnostics().is_empty(), "{name}");
            assert_eq!(ctx.current_program(), Some(scene.program()));
            assert_eq!(ctx.state().viewport, ViewportRect::full(640, 480));
        }
    }

    #[test]
    fn initialize_binds_each_stream_in_order() {
        let mut ctx = ctx();
        let scene = initialize(&mut ctx, &presets::indexed_quad(), FailurePolicy::Strict).unwrap();
        let [pos, color] = [scene.attributes()[0].buffer, scene.attributes()[1].buffer];

        let commands = ctx.backend().commands();
        let linked = commands
            .iter()
            .position(|c| matches!(c, Command::LinkProgram { .. }))
            .unwrap();
        let binds: Vec<&Command> = commands[linked + 1..]
            .iter()
            .filter(|c| !matches!(c, Command::UseProgram { .. }))
            .take_while(|c| {
                !matches!(c, Command::Uniform { .. } | Command::Enable(_) | Command::Disable(_))
            })
            .collect();

        assert!(matches!(
            binds.as_slice(),
            [
                Command::BindBuffer { target: BufferTarget::Array, buffer: Some(b0) },
                Command::VertexAttribPointer { location: 0, pointer: p0 },
                Command::EnableVertexAttribArray { location: 0 },
                Command::BindBuffer { target: BufferTarget::Array, buffer: None },
                Command::BindBuffer { target: BufferTarget::Array, buffer: Some(b1) },
                Command::VertexAttribPointer { location: 1, pointer: p1 },
                Command::EnableVertexAttribArray { location: 1 },
                Command::BindBuffer { target: BufferTarget::Array, buffer: None },
            ] if *b0 == pos && p0.buffer == pos && *b1 == color && p1.buffer == color
        ));
    }

    #[test]
    fn setup_sets_clear_colour_and_depth() {
        let mut ctx = ctx();
        let scene = initialize(&mut ctx, &presets::rotating_triangle(), FailurePolicy::Strict).unwrap();

        let commands = ctx.backend().commands();
        assert!(commands.contains(&Command::ClearColor(presets::CLEAR_COLOR)));
        assert!(commands.contains(&Command::Enable(Capability::DepthTest)));
        assert!(ctx.is_enabled(Capability::DepthTest));
        assert!(scene.is_animated());
        assert_eq!(scene.draw_count(), 3);
    }

    #[test]
    fn vertex_streams_upload_as_floats() {
        let mut ctx = ctx();
        let desc = presets::static_triangle();
        let scene = initialize(&mut ctx, &desc, FailurePolicy::Strict).unwrap();

        let buffer = scene.attributes()[0].buffer;
        let bytes = ctx.backend().buffer_contents(buffer).unwrap();
        assert_eq!(bytes, bytemuck::cast_slice::<f32, u8>(&desc.attributes[0].data));
        assert_eq!(ctx.bound_buffer(BufferTarget::Array), None);
    }

    #[test]
    fn camera_uniforms_resolve() {
        let mut ctx = ctx();
        let scene = initialize(&mut ctx, &presets::rotating_triangle(), FailurePolicy::Strict).unwrap();
        let uniforms = scene.uniforms();
        assert!(uniforms.projection.is_valid());
        assert!(uniforms.view.is_valid());
        assert!(uniforms.model.is_valid());
        assert_eq!(scene.projection(), Some(build_projection(40.0, 640.0 / 480.0, 1.0, 100.0)));
    }

    // ── failure policy ────────────────────────────────────────────────────

    #[test]
    fn misspelt_attribute_is_tolerated_when_permissive() {
        let mut desc = presets::static_triangle();
        desc.attributes[0].name = "coordinatez".to_string();

        let scene = initialize(&mut ctx(), &desc, FailurePolicy::Permissive).unwrap();
        assert!(!scene.attributes()[0].location.is_valid());
        assert_eq!(scene.diagnostics().len(), 1);
        assert!(scene.diagnostics()[0].contains("coordinatez"));
    }

    #[test]
    fn misspelt_attribute_aborts_when_strict() {
        let mut desc = presets::static_triangle();
        desc.attributes[0].name = "coordinatez".to_string();

        let err = initialize(&mut ctx(), &desc, FailurePolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            SceneError::Bind(BindError::UnknownAttribute { ref name, .. }) if name == "coordinatez"
        ));
    }

    #[test]
    fn misspelt_uniform_uploads_nothing() {
        let mut desc = presets::transformed_triangle();
        desc.uniforms[0].0 = "u_xfrom".to_string();

        let mut ctx = ctx();
        let scene = initialize(&mut ctx, &desc, FailurePolicy::Permissive).unwrap();
        assert_eq!(scene.uniforms().statics[0].0, UniformLocation::INVALID);
        assert!(
            !ctx.backend()
                .commands()
                .iter()
                .any(|c| matches!(c, Command::Uniform { .. }))
        );

        let err = initialize(&mut ctx, &desc, FailurePolicy::Strict).unwrap_err();
        assert!(matches!(err, SceneError::Bind(BindError::UnknownUniform { .. })));
    }

    #[test]
    fn broken_shader_policy() {
        let mut desc = presets::static_triangle();
        desc.fragment_shader = "@fragment fn fs_main() -> @location(0) vec4<f32> {".to_string();

        let scene = initialize(&mut ctx(), &desc, FailurePolicy::Permissive).unwrap();
        assert!(scene.diagnostics().iter().any(|d| d.starts_with("fragment shader")));

        let err = initialize(&mut ctx(), &desc, FailurePolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            SceneError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn resize_updates_viewport_and_projection() {
        let mut ctx = ctx();
        let mut scene = initialize(&mut ctx, &presets::rotating_triangle(), FailurePolicy::Strict).unwrap();

        scene.resize(&mut ctx, 1280, 480).unwrap();
        assert_eq!(ctx.size(), (1280, 480));
        assert_eq!(ctx.state().viewport, ViewportRect::full(1280, 480));
        assert_eq!(scene.projection(), Some(build_projection(40.0, 1280.0 / 480.0, 1.0, 100.0)));

        scene.resize(&mut ctx, 0, 0).unwrap();
        assert_eq!(ctx.size(), (1280, 480));
    }

    #[test]
    fn destroy_releases_everything() {
        let mut ctx = ctx();
        let scene = initialize(&mut ctx, &presets::indexed_quad(), FailurePolicy::Strict).unwrap();
        let mut buffers: Vec<_> = scene.attributes().iter().map(|a| a.buffer).collect();
        buffers.extend(scene.index_buffer());
        let program = scene.program();

        scene.destroy(&mut ctx).unwrap();

        for buffer in buffers {
            assert!(ctx.backend().buffer_contents(buffer).is_none());
            assert_eq!(ctx.buffer_len(buffer), None);
        }
        assert!(
            ctx.backend()
                .commands()
                .contains(&Command::DeleteProgram { program })
        );
        assert_eq!(ctx.current_program(), None);
    }
}
