use std::collections::HashMap;
use std::num::NonZeroU32;

use super::backend::Backend;
use super::command::{
    AttribPointer, BoundAttribute, Command, DrawCall, DrawKind, StageSource, UniformData,
};
use super::compiler::{self, LinkedInterface, StageInterface};
use super::error::GlError;
use super::handles::{
    AttribLocation, BufferHandle, ProgramHandle, ShaderHandle, UniformLocation,
};
use super::state::RenderState;
use super::types::{
    BufferTarget, BufferUsage, Capability, ClearMask, IndexType, ShaderStage, Topology,
    UniformValue, ViewportRect,
};

struct BufferEntry {
    /// Fixed by the first bind, as in WebGL.
    target: Option<BufferTarget>,
    len: usize,
}

struct ShaderEntry {
    stage: ShaderStage,
    source: String,
    compiled: Option<StageInterface>,
    info_log: String,
}

#[derive(Default)]
struct ProgramEntry {
    vertex: Option<ShaderHandle>,
    fragment: Option<ShaderHandle>,
    linked: Option<LinkedProgram>,
    info_log: String,
}

struct LinkedProgram {
    interface: LinkedInterface,
    /// Current value bytes per uniform, indexed like `interface.uniforms`.
    values: Vec<Vec<u8>>,
}

/// WebGL-1-shaped rendering context.
///
/// Owns object tables and the [`RenderState`]; validates each call, then
/// forwards it to the backend. Operations act on whatever is currently
/// bound, exactly like the API it mirrors.
pub struct Context<B: Backend> {
    backend: B,
    width: u32,
    height: u32,
    state: RenderState,
    next_id: u32,
    buffers: HashMap<BufferHandle, BufferEntry>,
    shaders: HashMap<ShaderHandle, ShaderEntry>,
    programs: HashMap<ProgramHandle, ProgramEntry>,
}

impl<B: Backend> Context<B> {
    /// Creates a context for a `width x height` surface.
    ///
    /// Fails when the surface has no pixels to render to.
    pub fn new(backend: B, width: u32, height: u32) -> Result<Self, GlError> {
        if width == 0 || height == 0 {
            return Err(GlError::ContextUnavailable(format!(
                "surface is {width}x{height}"
            )));
        }

        log::debug!("gl context created ({width}x{height})");

        Ok(Self {
            backend,
            width,
            height,
            state: RenderState::new(width, height),
            next_id: 0,
            buffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Drawing surface size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Records a new surface size. The viewport is left alone, as in GL.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn alloc_id(&mut self) -> NonZeroU32 {
        self.next_id = self.next_id.saturating_add(1);
        NonZeroU32::new(self.next_id).unwrap_or(NonZeroU32::MAX)
    }

    // ── state ─────────────────────────────────────────────────────────────

    pub fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) -> Result<(), GlError> {
        self.state.clear_color = [r, g, b, a];
        self.backend.execute(&Command::ClearColor([r, g, b, a]))
    }

    pub fn enable(&mut self, cap: Capability) -> Result<(), GlError> {
        match cap {
            Capability::DepthTest => self.state.depth_test = true,
        }
        self.backend.execute(&Command::Enable(cap))
    }

    pub fn disable(&mut self, cap: Capability) -> Result<(), GlError> {
        match cap {
            Capability::DepthTest => self.state.depth_test = false,
        }
        self.backend.execute(&Command::Disable(cap))
    }

    pub fn is_enabled(&self, cap: Capability) -> bool {
        match cap {
            Capability::DepthTest => self.state.depth_test,
        }
    }

    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<(), GlError> {
        let rect = ViewportRect::new(x, y, width.max(0), height.max(0));
        self.state.viewport = rect;
        self.backend.execute(&Command::Viewport(rect))
    }

    /// Clears the buffers in `mask` with the current clear color.
    pub fn clear(&mut self, mask: ClearMask) -> Result<(), GlError> {
        self.backend.execute(&Command::Clear {
            mask,
            color: self.state.clear_color,
        })
    }

    // ── buffers ───────────────────────────────────────────────────────────

    pub fn create_buffer(&mut self) -> BufferHandle {
        let handle = BufferHandle::from_raw(self.alloc_id());
        self.buffers.insert(handle, BufferEntry { target: None, len: 0 });
        handle
    }

    /// Binds `buffer` to `target`. Binding what is already bound does nothing.
    pub fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<BufferHandle>,
    ) -> Result<(), GlError> {
        if let Some(handle) = buffer {
            let entry = self
                .buffers
                .get_mut(&handle)
                .ok_or(GlError::UnknownBuffer(handle.id()))?;
            match entry.target {
                Some(created) if created != target => {
                    return Err(GlError::TargetMismatch {
                        buffer: handle.id(),
                        created,
                        requested: target,
                    });
                }
                Some(_) => {}
                None => entry.target = Some(target),
            }
        }

        let slot = match target {
            BufferTarget::Array => &mut self.state.array_buffer,
            BufferTarget::ElementArray => &mut self.state.element_buffer,
        };
        if *slot == buffer {
            return Ok(());
        }
        *slot = buffer;

        self.backend.execute(&Command::BindBuffer { target, buffer })
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferHandle> {
        match target {
            BufferTarget::Array => self.state.array_buffer,
            BufferTarget::ElementArray => self.state.element_buffer,
        }
    }

    /// Replaces the contents of the buffer bound to `target`.
    pub fn buffer_data(
        &mut self,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), GlError> {
        let buffer = self
            .bound_buffer(target)
            .ok_or(GlError::NoBufferBound(target))?;

        if let Some(entry) = self.buffers.get_mut(&buffer) {
            entry.len = data.len();
        }

        self.backend.execute(&Command::BufferData {
            buffer,
            target,
            data: data.to_vec(),
            usage,
        })
    }

    /// Size of a buffer's data store in bytes.
    pub fn buffer_len(&self, buffer: BufferHandle) -> Option<usize> {
        self.buffers.get(&buffer).map(|e| e.len)
    }

    pub fn read_buffer(&mut self, buffer: BufferHandle) -> Result<Vec<u8>, GlError> {
        if !self.buffers.contains_key(&buffer) {
            return Err(GlError::UnknownBuffer(buffer.id()));
        }
        self.backend.read_buffer(buffer)
    }

    /// Deletes a buffer and unbinds it from every binding point.
    ///
    /// Attribute pointers already captured keep referring to the dead handle;
    /// drawing with them fails in the backend, as it would on a GPU.
    pub fn delete_buffer(&mut self, buffer: BufferHandle) -> Result<(), GlError> {
        if self.buffers.remove(&buffer).is_none() {
            return Ok(());
        }
        if self.state.array_buffer == Some(buffer) {
            self.state.array_buffer = None;
        }
        if self.state.element_buffer == Some(buffer) {
            self.state.element_buffer = None;
        }
        self.backend.execute(&Command::DeleteBuffer { buffer })
    }

    // ── shaders ───────────────────────────────────────────────────────────

    pub fn create_shader(&mut self, stage: ShaderStage) -> ShaderHandle {
        let handle = ShaderHandle::from_raw(self.alloc_id());
        self.shaders.insert(
            handle,
            ShaderEntry {
                stage,
                source: String::new(),
                compiled: None,
                info_log: String::new(),
            },
        );
        handle
    }

    pub fn shader_source(&mut self, shader: ShaderHandle, source: &str) -> Result<(), GlError> {
        let entry = self
            .shaders
            .get_mut(&shader)
            .ok_or(GlError::UnknownShader(shader.id()))?;
        entry.source = source.to_string();
        Ok(())
    }

    /// Compiles the shader's current source.
    ///
    /// A compile failure is not an error of this call: it is recorded in the
    /// shader's status and info log.
    pub fn compile_shader(&mut self, shader: ShaderHandle) -> Result<(), GlError> {
        let entry = self
            .shaders
            .get_mut(&shader)
            .ok_or(GlError::UnknownShader(shader.id()))?;

        match compiler::compile(entry.stage, &entry.source) {
            Ok(interface) => {
                entry.compiled = Some(interface);
                entry.info_log.clear();
            }
            Err(log) => {
                entry.compiled = None;
                entry.info_log = log;
            }
        }
        Ok(())
    }

    pub fn shader_compile_status(&self, shader: ShaderHandle) -> bool {
        self.shaders
            .get(&shader)
            .is_some_and(|e| e.compiled.is_some())
    }

    pub fn shader_info_log(&self, shader: ShaderHandle) -> String {
        self.shaders
            .get(&shader)
            .map(|e| e.info_log.clone())
            .unwrap_or_default()
    }

    pub fn shader_stage(&self, shader: ShaderHandle) -> Option<ShaderStage> {
        self.shaders.get(&shader).map(|e| e.stage)
    }

    /// Deletes a shader object. Programs already linked against it are unaffected.
    pub fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
        for program in self.programs.values_mut() {
            if program.vertex == Some(shader) {
                program.vertex = None;
            }
            if program.fragment == Some(shader) {
                program.fragment = None;
            }
        }
    }

    // ── programs ──────────────────────────────────────────────────────────

    pub fn create_program(&mut self) -> ProgramHandle {
        let handle = ProgramHandle::from_raw(self.alloc_id());
        self.programs.insert(handle, ProgramEntry::default());
        handle
    }

    pub fn attach_shader(
        &mut self,
        program: ProgramHandle,
        shader: ShaderHandle,
    ) -> Result<(), GlError> {
        let stage = self
            .shaders
            .get(&shader)
            .ok_or(GlError::UnknownShader(shader.id()))?
            .stage;
        let entry = self
            .programs
            .get_mut(&program)
            .ok_or(GlError::UnknownProgram(program.id()))?;

        let slot = match stage {
            ShaderStage::Vertex => &mut entry.vertex,
            ShaderStage::Fragment => &mut entry.fragment,
        };
        match slot {
            Some(existing) if *existing == shader => Ok(()),
            Some(_) => Err(GlError::StageAlreadyAttached {
                program: program.id(),
                stage,
            }),
            None => {
                *slot = Some(shader);
                Ok(())
            }
        }
    }

    /// Links the attached shaders.
    ///
    /// Like compilation, a failed link is recorded in the program's status
    /// and info log rather than returned.
    pub fn link_program(&mut self, program: ProgramHandle) -> Result<(), GlError> {
        let entry = self
            .programs
            .get(&program)
            .ok_or(GlError::UnknownProgram(program.id()))?;

        let vertex = entry.vertex.and_then(|s| self.shaders.get(&s));
        let fragment = entry.fragment.and_then(|s| self.shaders.get(&s));

        let outcome = match (vertex, fragment) {
            (None, _) => Err("error: no vertex shader attached".to_string()),
            (_, None) => Err("error: no fragment shader attached".to_string()),
            (Some(vs), Some(fs)) => match (&vs.compiled, &fs.compiled) {
                (None, _) => Err("error: vertex shader is not compiled".to_string()),
                (_, None) => Err("error: fragment shader is not compiled".to_string()),
                (Some(vi), Some(fi)) => compiler::link(vi, fi).map(|interface| {
                    let command = Command::LinkProgram {
                        program,
                        vertex: StageSource {
                            source: vs.source.clone(),
                            entry_point: vi.entry_point.clone(),
                        },
                        fragment: StageSource {
                            source: fs.source.clone(),
                            entry_point: fi.entry_point.clone(),
                        },
                        uniforms: interface.uniforms.clone(),
                    };
                    (interface, command)
                }),
            },
        };

        let entry = self
            .programs
            .get_mut(&program)
            .ok_or(GlError::UnknownProgram(program.id()))?;

        match outcome {
            Ok((interface, command)) => {
                let values = interface
                    .uniforms
                    .iter()
                    .map(|u| vec![0u8; u.size as usize])
                    .collect();
                entry.linked = Some(LinkedProgram { interface, values });
                entry.info_log.clear();
                self.backend.execute(&command)
            }
            Err(log) => {
                entry.linked = None;
                entry.info_log = log;
                Ok(())
            }
        }
    }

    pub fn program_link_status(&self, program: ProgramHandle) -> bool {
        self.programs
            .get(&program)
            .is_some_and(|e| e.linked.is_some())
    }

    pub fn program_info_log(&self, program: ProgramHandle) -> String {
        self.programs
            .get(&program)
            .map(|e| e.info_log.clone())
            .unwrap_or_default()
    }

    /// Makes `program` current. Unlinked programs may be made current; drawing
    /// with them fails.
    pub fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<(), GlError> {
        if let Some(p) = program {
            if !self.programs.contains_key(&p) {
                return Err(GlError::UnknownProgram(p.id()));
            }
        }
        if self.state.program == program {
            return Ok(());
        }
        self.state.program = program;
        self.backend.execute(&Command::UseProgram { program })
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.state.program
    }

    pub fn delete_program(&mut self, program: ProgramHandle) -> Result<(), GlError> {
        if self.programs.remove(&program).is_none() {
            return Ok(());
        }
        if self.state.program == Some(program) {
            self.state.program = None;
        }
        self.backend.execute(&Command::DeleteProgram { program })
    }

    /// Resolves a vertex attribute by name; `INVALID` when unknown or unlinked.
    pub fn attrib_location(&self, program: ProgramHandle, name: &str) -> AttribLocation {
        self.linked(program)
            .and_then(|l| l.interface.attributes.iter().find(|a| a.name == name))
            .map_or(AttribLocation::INVALID, |a| AttribLocation::new(a.location))
    }

    /// Resolves a uniform by name; `INVALID` when unknown or unlinked.
    pub fn uniform_location(&self, program: ProgramHandle, name: &str) -> UniformLocation {
        self.linked(program)
            .and_then(|l| l.interface.uniforms.iter().find(|u| u.name == name))
            .map_or(UniformLocation::INVALID, |u| {
                UniformLocation::new(program, u.slot)
            })
    }

    fn linked(&self, program: ProgramHandle) -> Option<&LinkedProgram> {
        self.programs.get(&program)?.linked.as_ref()
    }

    // ── vertex attributes ─────────────────────────────────────────────────

    /// Points `location` at the buffer currently bound to ARRAY.
    ///
    /// No-op for `AttribLocation::INVALID`.
    pub fn vertex_attrib_pointer(
        &mut self,
        location: AttribLocation,
        components: u32,
        stride: u32,
        offset: u32,
    ) -> Result<(), GlError> {
        let Some(index) = location.index() else {
            log::trace!("vertex_attrib_pointer on invalid location ignored");
            return Ok(());
        };
        if !(1..=4).contains(&components) {
            return Err(GlError::InvalidComponentCount(components));
        }
        let buffer = self
            .state
            .array_buffer
            .ok_or(GlError::NoBufferBound(BufferTarget::Array))?;
        let slot = self
            .state
            .vertex_attribs
            .get_mut(index as usize)
            .ok_or(GlError::AttributeOutOfRange(index))?;

        let pointer = AttribPointer {
            buffer,
            components,
            stride,
            offset,
        };
        slot.pointer = Some(pointer);

        self.backend.execute(&Command::VertexAttribPointer {
            location: index,
            pointer,
        })
    }

    pub fn enable_vertex_attrib_array(&mut self, location: AttribLocation) -> Result<(), GlError> {
        self.set_attrib_enabled(location, true)
    }

    pub fn disable_vertex_attrib_array(&mut self, location: AttribLocation) -> Result<(), GlError> {
        self.set_attrib_enabled(location, false)
    }

    fn set_attrib_enabled(&mut self, location: AttribLocation, enabled: bool) -> Result<(), GlError> {
        let Some(index) = location.index() else {
            return Ok(());
        };
        let slot = self
            .state
            .vertex_attribs
            .get_mut(index as usize)
            .ok_or(GlError::AttributeOutOfRange(index))?;
        if slot.enabled == enabled {
            return Ok(());
        }
        slot.enabled = enabled;

        let command = if enabled {
            Command::EnableVertexAttribArray { location: index }
        } else {
            Command::DisableVertexAttribArray { location: index }
        };
        self.backend.execute(&command)
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    /// Sets a uniform of the current program.
    ///
    /// No-op for `UniformLocation::INVALID`.
    pub fn uniform(&mut self, location: UniformLocation, value: UniformValue) -> Result<(), GlError> {
        let (Some(program), Some(slot)) = (location.program(), location.slot()) else {
            log::trace!("uniform upload to invalid location ignored");
            return Ok(());
        };

        let current = self.state.program.ok_or(GlError::NoProgram)?;
        if current != program {
            return Err(GlError::UniformProgramMismatch {
                location_program: program.id(),
                current: current.id(),
            });
        }

        let linked = self
            .programs
            .get_mut(&program)
            .and_then(|e| e.linked.as_mut())
            .ok_or(GlError::ProgramNotLinked(program.id()))?;
        let Some(index) = linked.interface.uniforms.iter().position(|u| u.slot == slot) else {
            return Ok(());
        };

        let info = &linked.interface.uniforms[index];
        let bytes = value.as_bytes();
        if bytes.len() != info.size as usize {
            return Err(GlError::UniformSize {
                name: info.name.clone(),
                expected: info.size,
                got: bytes.len(),
            });
        }
        linked.values[index] = bytes.to_vec();

        self.backend.execute(&Command::Uniform { program, slot, value })
    }

    pub fn uniform1f(&mut self, location: UniformLocation, x: f32) -> Result<(), GlError> {
        self.uniform(location, UniformValue::Float(x))
    }

    pub fn uniform4f(
        &mut self,
        location: UniformLocation,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    ) -> Result<(), GlError> {
        self.uniform(location, UniformValue::Vec4([x, y, z, w]))
    }

    pub fn uniform_matrix4fv(
        &mut self,
        location: UniformLocation,
        value: &[f32; 16],
    ) -> Result<(), GlError> {
        self.uniform(location, UniformValue::Mat4(*value))
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Draws `count` vertices starting at `first`.
    pub fn draw_arrays(&mut self, mode: Topology, first: u32, count: u32) -> Result<(), GlError> {
        self.draw(mode, DrawKind::Arrays { first, count })
    }

    /// Draws `count` indices from the bound element buffer starting at byte `offset`.
    pub fn draw_elements(
        &mut self,
        mode: Topology,
        count: u32,
        index_type: IndexType,
        offset: u32,
    ) -> Result<(), GlError> {
        let buffer = self
            .state
            .element_buffer
            .ok_or(GlError::NoBufferBound(BufferTarget::ElementArray))?;
        let len = self.buffer_len(buffer).unwrap_or(0);

        let size = index_type.size();
        let end = offset as usize + count as usize * size;
        if offset as usize % size != 0 || end > len {
            return Err(GlError::IndexRange {
                offset: offset as usize,
                count: count as usize,
                size,
                len,
            });
        }

        self.draw(
            mode,
            DrawKind::Elements {
                buffer,
                count,
                index_type,
                offset,
            },
        )
    }

    fn draw(&mut self, topology: Topology, kind: DrawKind) -> Result<(), GlError> {
        let program = self.state.program.ok_or(GlError::NoProgram)?;
        let linked = self
            .linked(program)
            .ok_or(GlError::ProgramNotLinked(program.id()))?;

        let mut attributes = Vec::with_capacity(linked.interface.attributes.len());
        for attr in &linked.interface.attributes {
            let slot = self
                .state
                .vertex_attribs
                .get(attr.location as usize)
                .ok_or(GlError::AttributeOutOfRange(attr.location))?;
            match (slot.enabled, slot.pointer) {
                (true, Some(pointer)) => attributes.push(BoundAttribute {
                    location: attr.location,
                    pointer,
                }),
                _ => {
                    return Err(GlError::AttributeNotEnabled {
                        name: attr.name.clone(),
                        location: attr.location,
                    });
                }
            }
        }

        let uniforms = linked
            .interface
            .uniforms
            .iter()
            .zip(&linked.values)
            .map(|(info, bytes)| UniformData {
                slot: info.slot,
                bytes: bytes.clone(),
            })
            .collect();

        if let DrawKind::Arrays { first, count } = kind {
            if count > 0 {
                self.check_vertex_range(first, count, &attributes)?;
            }
        }

        let call = DrawCall {
            topology,
            kind,
            program,
            attributes,
            uniforms,
            depth_test: self.state.depth_test,
            viewport: self.state.viewport,
        };

        if call.count() == 0 {
            return Ok(());
        }

        self.backend.execute(&Command::Draw(call))
    }

    /// Every enabled attribute must hold `first + count` vertices. The end is
    /// also capped at `u32::MAX`, which wgpu's vertex ranges cannot exceed.
    fn check_vertex_range(
        &self,
        first: u32,
        count: u32,
        attributes: &[BoundAttribute],
    ) -> Result<(), GlError> {
        let available = attributes
            .iter()
            .map(|a| self.vertices_held(&a.pointer))
            .min()
            .unwrap_or(u64::from(u32::MAX));
        if u64::from(first) + u64::from(count) > available.min(u64::from(u32::MAX)) {
            return Err(GlError::VertexRange {
                first,
                count,
                available,
            });
        }
        Ok(())
    }

    /// Whole vertices `pointer` can read from its buffer.
    fn vertices_held(&self, pointer: &AttribPointer) -> u64 {
        let len = self.buffer_len(pointer.buffer).unwrap_or(0) as u64;
        let first_end = u64::from(pointer.offset) + u64::from(pointer.components) * 4;
        if len < first_end {
            return 0;
        }
        (len - first_end) / u64::from(pointer.effective_stride()) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::recording::RecordingBackend;

    const VS: &str = r#"
@group(0) @binding(0) var<uniform> u_scale: f32;

@vertex
fn vs_main(@location(0) coordinates: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(coordinates * u_scale, 0.0, 1.0);
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;

    fn ctx() -> Context<RecordingBackend> {
        Context::new(RecordingBackend::new(), 640, 480).unwrap()
    }

    fn linked_program(ctx: &mut Context<RecordingBackend>) -> ProgramHandle {
        let vs = ctx.create_shader(ShaderStage::Vertex);
        ctx.shader_source(vs, VS).unwrap();
        ctx.compile_shader(vs).unwrap();
        let fs = ctx.create_shader(ShaderStage::Fragment);
        ctx.shader_source(fs, FS).unwrap();
        ctx.compile_shader(fs).unwrap();

        let program = ctx.create_program();
        ctx.attach_shader(program, vs).unwrap();
        ctx.attach_shader(program, fs).unwrap();
        ctx.link_program(program).unwrap();
        assert!(ctx.program_link_status(program), "{}", ctx.program_info_log(program));
        program
    }

    // ── setup ─────────────────────────────────────────────────────────────

    #[test]
    fn zero_sized_surface_is_unavailable() {
        let err = Context::new(RecordingBackend::new(), 0, 480).err();
        assert!(matches!(err, Some(GlError::ContextUnavailable(_))));
    }

    #[test]
    fn viewport_defaults_to_full_surface() {
        let ctx = ctx();
        assert_eq!(ctx.state().viewport, ViewportRect::full(640, 480));
    }

    // ── buffers ───────────────────────────────────────────────────────────

    #[test]
    fn redundant_bind_emits_nothing() {
        let mut ctx = ctx();
        let buf = ctx.create_buffer();
        ctx.bind_buffer(BufferTarget::Array, Some(buf)).unwrap();
        ctx.bind_buffer(BufferTarget::Array, Some(buf)).unwrap();
        assert_eq!(ctx.backend().commands().len(), 1);
    }

    #[test]
    fn buffer_target_is_fixed_by_first_bind() {
        let mut ctx = ctx();
        let buf = ctx.create_buffer();
        ctx.bind_buffer(BufferTarget::Array, Some(buf)).unwrap();
        let err = ctx.bind_buffer(BufferTarget::ElementArray, Some(buf));
        assert!(matches!(err, Err(GlError::TargetMismatch { .. })));
    }

    #[test]
    fn buffer_data_without_binding_fails() {
        let mut ctx = ctx();
        let err = ctx.buffer_data(BufferTarget::Array, &[0; 4], BufferUsage::StaticDraw);
        assert_eq!(err, Err(GlError::NoBufferBound(BufferTarget::Array)));
    }

    #[test]
    fn buffer_contents_read_back() {
        let mut ctx = ctx();
        let buf = ctx.create_buffer();
        ctx.bind_buffer(BufferTarget::Array, Some(buf)).unwrap();
        ctx.buffer_data(BufferTarget::Array, &[1, 2, 3, 4], BufferUsage::StaticDraw)
            .unwrap();
        assert_eq!(ctx.buffer_len(buf), Some(4));
        assert_eq!(ctx.read_buffer(buf).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn deleting_a_bound_buffer_unbinds_it() {
        let mut ctx = ctx();
        let buf = ctx.create_buffer();
        ctx.bind_buffer(BufferTarget::Array, Some(buf)).unwrap();
        ctx.delete_buffer(buf).unwrap();
        assert_eq!(ctx.bound_buffer(BufferTarget::Array), None);
        assert!(matches!(ctx.read_buffer(buf), Err(GlError::UnknownBuffer(_))));
    }

    // ── shaders and programs ──────────────────────────────────────────────

    #[test]
    fn compile_failure_lands_in_info_log() {
        let mut ctx = ctx();
        let vs = ctx.create_shader(ShaderStage::Vertex);
        ctx.shader_source(vs, "this is not wgsl").unwrap();
        ctx.compile_shader(vs).unwrap();
        assert!(!ctx.shader_compile_status(vs));
        assert!(!ctx.shader_info_log(vs).is_empty());
    }

    #[test]
    fn link_without_fragment_stage_fails_with_log() {
        let mut ctx = ctx();
        let vs = ctx.create_shader(ShaderStage::Vertex);
        ctx.shader_source(vs, VS).unwrap();
        ctx.compile_shader(vs).unwrap();
        let program = ctx.create_program();
        ctx.attach_shader(program, vs).unwrap();
        ctx.link_program(program).unwrap();

        assert!(!ctx.program_link_status(program));
        assert!(ctx.program_info_log(program).contains("fragment"));
        assert!(
            !ctx.backend()
                .commands()
                .iter()
                .any(|c| matches!(c, Command::LinkProgram { .. }))
        );
    }

    #[test]
    fn second_shader_of_same_stage_is_rejected() {
        let mut ctx = ctx();
        let a = ctx.create_shader(ShaderStage::Vertex);
        let b = ctx.create_shader(ShaderStage::Vertex);
        let program = ctx.create_program();
        ctx.attach_shader(program, a).unwrap();
        assert!(matches!(
            ctx.attach_shader(program, b),
            Err(GlError::StageAlreadyAttached { .. })
        ));
    }

    #[test]
    fn locations_resolve_after_link() {
        let mut ctx = ctx();
        let program = linked_program(&mut ctx);
        assert_eq!(ctx.attrib_location(program, "coordinates"), AttribLocation::new(0));
        assert!(!ctx.attrib_location(program, "missing").is_valid());
        assert!(ctx.uniform_location(program, "u_scale").is_valid());
        assert!(!ctx.uniform_location(program, "u_missing").is_valid());
    }

    // ── attributes and uniforms ───────────────────────────────────────────

    #[test]
    fn invalid_locations_are_silent_noops() {
        let mut ctx = ctx();
        let program = linked_program(&mut ctx);
        ctx.use_program(Some(program)).unwrap();
        let before = ctx.backend().commands().len();

        ctx.vertex_attrib_pointer(AttribLocation::INVALID, 2, 0, 0).unwrap();
        ctx.enable_vertex_attrib_array(AttribLocation::INVALID).unwrap();
        ctx.uniform1f(UniformLocation::INVALID, 1.0).unwrap();

        assert_eq!(ctx.backend().commands().len(), before);
    }

    #[test]
    fn attrib_pointer_captures_array_binding() {
        let mut ctx = ctx();
        let first = ctx.create_buffer();
        let second = ctx.create_buffer();
        ctx.bind_buffer(BufferTarget::Array, Some(first)).unwrap();
        ctx.vertex_attrib_pointer(AttribLocation::new(0), 2, 0, 0).unwrap();
        ctx.bind_buffer(BufferTarget::Array, Some(second)).unwrap();

        let pointer = ctx.state().vertex_attribs[0].pointer.unwrap();
        assert_eq!(pointer.buffer, first);
    }

    #[test]
    fn uniform_size_is_checked() {
        let mut ctx = ctx();
        let program = linked_program(&mut ctx);
        ctx.use_program(Some(program)).unwrap();
        let loc = ctx.uniform_location(program, "u_scale");

        ctx.uniform1f(loc, 2.0).unwrap();
        assert!(matches!(
            ctx.uniform4f(loc, 1.0, 2.0, 3.0, 4.0),
            Err(GlError::UniformSize { expected: 4, got: 16, .. })
        ));
    }

    #[test]
    fn uniform_requires_owning_program_current() {
        let mut ctx = ctx();
        let program = linked_program(&mut ctx);
        let loc = ctx.uniform_location(program, "u_scale");
        assert_eq!(ctx.uniform1f(loc, 1.0), Err(GlError::NoProgram));
    }

    // ── drawing ───────────────────────────────────────────────────────────

    fn ready_to_draw(ctx: &mut Context<RecordingBackend>) -> ProgramHandle {
        let program = linked_program(ctx);
        ctx.use_program(Some(program)).unwrap();
        let buf = ctx.create_buffer();
        ctx.bind_buffer(BufferTarget::Array, Some(buf)).unwrap();
        let coords: [f32; 6] = [0.0, 0.5, -0.5, -0.5, 0.5, -0.5];
        ctx.buffer_data(
            BufferTarget::Array,
            bytemuck::cast_slice(&coords),
            BufferUsage::StaticDraw,
        )
        .unwrap();
        let loc = ctx.attrib_location(program, "coordinates");
        ctx.vertex_attrib_pointer(loc, 2, 0, 0).unwrap();
        program
    }

    #[test]
    fn draw_requires_enabled_attributes() {
        let mut ctx = ctx();
        ready_to_draw(&mut ctx);
        assert!(matches!(
            ctx.draw_arrays(Topology::Triangles, 0, 3),
            Err(GlError::AttributeNotEnabled { location: 0, .. })
        ));
    }

    #[test]
    fn draw_snapshots_uniform_values() {
        let mut ctx = ctx();
        let program = ready_to_draw(&mut ctx);
        ctx.enable_vertex_attrib_array(AttribLocation::new(0)).unwrap();
        let loc = ctx.uniform_location(program, "u_scale");
        ctx.uniform1f(loc, 0.5).unwrap();
        ctx.draw_arrays(Topology::Triangles, 0, 3).unwrap();

        let draw = ctx.backend().draws().next().unwrap();
        assert_eq!(draw.count(), 3);
        assert_eq!(draw.uniforms[0].bytes, 0.5f32.to_le_bytes().to_vec());
    }

    #[test]
    fn empty_draw_is_skipped() {
        let mut ctx = ctx();
        ready_to_draw(&mut ctx);
        ctx.enable_vertex_attrib_array(AttribLocation::new(0)).unwrap();
        ctx.draw_arrays(Topology::Points, 0, 0).unwrap();
        assert_eq!(ctx.backend().draws().count(), 0);
    }

    #[test]
    fn draw_arrays_checks_vertex_range() {
        let mut ctx = ctx();
        ready_to_draw(&mut ctx);
        ctx.enable_vertex_attrib_array(AttribLocation::new(0)).unwrap();

        assert!(matches!(
            ctx.draw_arrays(Topology::Triangles, 0, 300),
            Err(GlError::VertexRange { available: 3, .. })
        ));
        assert!(matches!(
            ctx.draw_arrays(Topology::Triangles, 1, 3),
            Err(GlError::VertexRange { first: 1, count: 3, .. })
        ));
        assert_eq!(ctx.backend().draws().count(), 0);

        ctx.draw_arrays(Topology::Triangles, 0, 3).unwrap();
        ctx.draw_arrays(Topology::Points, 2, 1).unwrap();
        assert_eq!(ctx.backend().draws().count(), 2);
    }

    #[test]
    fn draw_arrays_rejects_overflowing_first() {
        let mut ctx = ctx();
        ready_to_draw(&mut ctx);
        ctx.enable_vertex_attrib_array(AttribLocation::new(0)).unwrap();
        assert!(matches!(
            ctx.draw_arrays(Topology::Triangles, u32::MAX, 2),
            Err(GlError::VertexRange { .. })
        ));
    }

    #[test]
    fn vertex_range_follows_stride_and_offset() {
        let mut ctx = ctx();
        let program = ready_to_draw(&mut ctx);
        let loc = ctx.attrib_location(program, "coordinates");
        // 24 bytes with a 16-byte stride hold vec2s at bytes 0 and 16.
        ctx.vertex_attrib_pointer(loc, 2, 16, 0).unwrap();
        ctx.enable_vertex_attrib_array(loc).unwrap();

        ctx.draw_arrays(Topology::Lines, 0, 2).unwrap();
        assert!(matches!(
            ctx.draw_arrays(Topology::Points, 0, 3),
            Err(GlError::VertexRange { available: 2, .. })
        ));
    }

    #[test]
    fn draw_elements_checks_index_range() {
        let mut ctx = ctx();
        ready_to_draw(&mut ctx);
        ctx.enable_vertex_attrib_array(AttribLocation::new(0)).unwrap();
        let ibo = ctx.create_buffer();
        ctx.bind_buffer(BufferTarget::ElementArray, Some(ibo)).unwrap();
        let indices: [u16; 3] = [0, 1, 2];
        ctx.buffer_data(
            BufferTarget::ElementArray,
            bytemuck::cast_slice(&indices),
            BufferUsage::StaticDraw,
        )
        .unwrap();

        ctx.draw_elements(Topology::Triangles, 3, IndexType::UnsignedShort, 0)
            .unwrap();
        assert!(matches!(
            ctx.draw_elements(Topology::Triangles, 3, IndexType::UnsignedShort, 2),
            Err(GlError::IndexRange { .. })
        ));
    }
}
