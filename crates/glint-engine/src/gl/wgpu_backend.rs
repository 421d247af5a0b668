use std::borrow::Cow;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::device::RenderTarget;

use super::backend::Backend;
use super::command::{Command, DrawCall, DrawKind, StageSource};
use super::compiler::UniformInfo;
use super::error::GlError;
use super::handles::{BufferHandle, ProgramHandle};
use super::topology::{self, NativeTopology};
use super::types::{BufferTarget, ClearMask, IndexType};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct GpuBuffer {
    buffer: wgpu::Buffer,
    /// Unpadded size of the uploaded data.
    len: u64,
    /// CPU copy of index data, needed to lower line loops and fans.
    shadow: Option<Vec<u8>>,
}

struct GroupLayout {
    layout: wgpu::BindGroupLayout,
    /// `(binding, size)` pairs.
    entries: Vec<(u32, u32)>,
}

struct GpuProgram {
    vertex: wgpu::ShaderModule,
    vertex_entry: String,
    fragment: wgpu::ShaderModule,
    fragment_entry: String,
    pipeline_layout: wgpu::PipelineLayout,
    /// Indexed by group number; gaps hold empty layouts.
    groups: Vec<GroupLayout>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramHandle,
    topology: NativeTopology,
    strip_index_format: Option<wgpu::IndexFormat>,
    /// `(location, components, stride)` per vertex buffer slot.
    attributes: Vec<(u32, u32, u32)>,
    depth_test: bool,
}

enum PendingOp {
    Clear { color: Option<[f32; 4]>, depth: bool },
    Draw(DrawCall),
}

struct PreparedDraw {
    pipeline: PipelineKey,
    bind_groups: Vec<wgpu::BindGroup>,
    /// `(buffer, byte offset)` per slot.
    vertex_buffers: Vec<(wgpu::Buffer, u64)>,
    indices: Option<(wgpu::Buffer, wgpu::IndexFormat, Range<u32>)>,
    vertices: Range<u32>,
    viewport: [f32; 4],
}

struct PassPlan {
    color_load: wgpu::LoadOp<wgpu::Color>,
    depth_load: wgpu::LoadOp<f32>,
    draws: Vec<PreparedDraw>,
}

impl PassPlan {
    fn loading() -> Self {
        Self {
            color_load: wgpu::LoadOp::Load,
            depth_load: wgpu::LoadOp::Load,
            draws: Vec::new(),
        }
    }
}

/// Backend that renders through wgpu.
///
/// Resource commands take effect immediately. Clears and draws are queued
/// and turned into render passes by [`encode`](Self::encode), once per
/// presented frame.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,

    buffers: HashMap<BufferHandle, GpuBuffer>,
    programs: HashMap<ProgramHandle, GpuProgram>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    depth: Option<(wgpu::TextureView, u32, u32)>,
    pending: Vec<PendingOp>,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, surface_format: wgpu::TextureFormat) -> Self {
        Self {
            device,
            queue,
            surface_format,
            buffers: HashMap::new(),
            programs: HashMap::new(),
            pipelines: HashMap::new(),
            depth: None,
            pending: Vec::new(),
        }
    }

    /// Drops queued clears and draws left over from a frame that was never
    /// presented.
    pub fn discard_pending(&mut self) {
        if !self.pending.is_empty() {
            log::trace!("discarding {} unpresented ops", self.pending.len());
            self.pending.clear();
        }
    }

    /// Records every queued clear and draw into `target`.
    pub fn encode(&mut self, target: &mut RenderTarget<'_>) {
        let (width, height) = target.size;
        if width == 0 || height == 0 {
            self.pending.clear();
            return;
        }
        self.ensure_depth(width, height);

        let mut passes: Vec<PassPlan> = Vec::new();
        for op in std::mem::take(&mut self.pending) {
            match op {
                PendingOp::Clear { color, depth } => {
                    if !passes.last().is_some_and(|p| p.draws.is_empty()) {
                        passes.push(PassPlan::loading());
                    }
                    let Some(pass) = passes.last_mut() else { continue };
                    if let Some([r, g, b, a]) = color {
                        pass.color_load = wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        });
                    }
                    if depth {
                        pass.depth_load = wgpu::LoadOp::Clear(1.0);
                    }
                }
                PendingOp::Draw(call) => {
                    if passes.is_empty() {
                        passes.push(PassPlan::loading());
                    }
                    let prepared = self.prepare(&call, width, height);
                    if let (Some(prepared), Some(pass)) = (prepared, passes.last_mut()) {
                        pass.draws.push(prepared);
                    }
                }
            }
        }

        let Some((depth_view, _, _)) = self.depth.as_ref() else { return };

        for pass in &passes {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("glint gl pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: pass.color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: pass.depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &pass.draws {
                let Some(pipeline) = self.pipelines.get(&draw.pipeline) else { continue };
                rpass.set_pipeline(pipeline);

                let [x, y, w, h] = draw.viewport;
                rpass.set_viewport(x, y, w, h, 0.0, 1.0);

                for (group, bind_group) in draw.bind_groups.iter().enumerate() {
                    rpass.set_bind_group(group as u32, bind_group, &[]);
                }
                for (slot, (buffer, offset)) in draw.vertex_buffers.iter().enumerate() {
                    rpass.set_vertex_buffer(slot as u32, buffer.slice(*offset..));
                }

                match &draw.indices {
                    Some((buffer, format, range)) => {
                        rpass.set_index_buffer(buffer.slice(..), *format);
                        rpass.draw_indexed(range.clone(), 0, 0..1);
                    }
                    None => rpass.draw(draw.vertices.clone(), 0..1),
                }
            }
        }
    }

    fn ensure_depth(&mut self, width: u32, height: u32) {
        if matches!(self.depth, Some((_, w, h)) if w == width && h == height) {
            return;
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glint depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some((view, width, height));
    }

    fn prepare(&mut self, call: &DrawCall, width: u32, height: u32) -> Option<PreparedDraw> {
        let Some(viewport) = clamp_viewport(call, width, height) else {
            log::trace!("draw skipped: viewport outside surface");
            return None;
        };

        let mut vertex_buffers = Vec::with_capacity(call.attributes.len());
        let mut attributes = Vec::with_capacity(call.attributes.len());
        for attr in &call.attributes {
            let Some(gpu) = self.buffers.get(&attr.pointer.buffer) else {
                log::warn!("draw skipped: attribute {} reads a deleted buffer", attr.location);
                return None;
            };
            vertex_buffers.push((gpu.buffer.clone(), attr.pointer.offset as u64));
            attributes.push((
                attr.location,
                attr.pointer.components,
                attr.pointer.effective_stride(),
            ));
        }

        let (native, indices, vertices) = match call.kind {
            DrawKind::Arrays { first, count } => match topology::native(call.topology) {
                Some(native) => (native, None, first..first + count),
                None => {
                    let source: Vec<u32> = (first..first + count).collect();
                    let (native, lowered) = topology::lower(call.topology, &source);
                    (native, Some(self.upload_indices(&lowered)?), 0..0)
                }
            },
            DrawKind::Elements {
                buffer,
                count,
                index_type,
                offset,
            } => {
                let gpu = self.buffers.get(&buffer)?;
                match topology::native(call.topology) {
                    Some(native) => {
                        let first = offset / index_type.size() as u32;
                        let format = index_format(index_type);
                        (native, Some((gpu.buffer.clone(), format, first..first + count)), 0..0)
                    }
                    None => {
                        let source = read_indices(gpu.shadow.as_deref()?, index_type, offset, count);
                        let (native, lowered) = topology::lower(call.topology, &source);
                        (native, Some(self.upload_indices(&lowered)?), 0..0)
                    }
                }
            }
        };

        let strip_index_format = match &indices {
            Some((_, format, _)) if native.is_strip() => Some(*format),
            _ => None,
        };

        let key = PipelineKey {
            program: call.program,
            topology: native,
            strip_index_format,
            attributes,
            depth_test: call.depth_test,
        };
        self.ensure_pipeline(&key)?;

        let bind_groups = self.uniform_bind_groups(call)?;

        Some(PreparedDraw {
            pipeline: key,
            bind_groups,
            vertex_buffers,
            indices,
            vertices,
            viewport,
        })
    }

    fn upload_indices(&self, indices: &[u32]) -> Option<(wgpu::Buffer, wgpu::IndexFormat, Range<u32>)> {
        if indices.is_empty() {
            return None;
        }
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("glint lowered indices"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Some((buffer, wgpu::IndexFormat::Uint32, 0..indices.len() as u32))
    }

    /// One fresh uniform buffer per slot, so several draws in one frame can
    /// carry different values.
    fn uniform_bind_groups(&self, call: &DrawCall) -> Option<Vec<wgpu::BindGroup>> {
        let program = self.programs.get(&call.program)?;

        let groups = program
            .groups
            .iter()
            .enumerate()
            .map(|(group, layout)| {
                let buffers: Vec<(u32, wgpu::Buffer)> = layout
                    .entries
                    .iter()
                    .map(|&(binding, size)| {
                        let bytes = call
                            .uniforms
                            .iter()
                            .find(|u| u.slot.group == group as u32 && u.slot.binding == binding)
                            .map(|u| u.bytes.clone())
                            .unwrap_or_else(|| vec![0; size as usize]);
                        let buffer = self
                            .device
                            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("glint uniform"),
                                contents: &bytes,
                                usage: wgpu::BufferUsages::UNIFORM,
                            });
                        (binding, buffer)
                    })
                    .collect();

                let entries: Vec<wgpu::BindGroupEntry<'_>> = buffers
                    .iter()
                    .map(|(binding, buffer)| wgpu::BindGroupEntry {
                        binding: *binding,
                        resource: buffer.as_entire_binding(),
                    })
                    .collect();

                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("glint uniforms"),
                    layout: &layout.layout,
                    entries: &entries,
                })
            })
            .collect();

        Some(groups)
    }

    fn ensure_pipeline(&mut self, key: &PipelineKey) -> Option<()> {
        if self.pipelines.contains_key(key) {
            return Some(());
        }
        let program = self.programs.get(&key.program)?;

        let attrs: Vec<wgpu::VertexAttribute> = key
            .attributes
            .iter()
            .map(|&(location, components, _)| wgpu::VertexAttribute {
                format: vertex_format(components),
                offset: 0,
                shader_location: location,
            })
            .collect();
        let layouts: Vec<wgpu::VertexBufferLayout<'_>> = key
            .attributes
            .iter()
            .zip(&attrs)
            .map(|(&(_, _, stride), attr)| wgpu::VertexBufferLayout {
                array_stride: stride as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: std::slice::from_ref(attr),
            })
            .collect();

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("glint gl pipeline"),
                layout: Some(&program.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &program.vertex,
                    entry_point: Some(&program.vertex_entry),
                    compilation_options: Default::default(),
                    buffers: &layouts,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &program.fragment,
                    entry_point: Some(&program.fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: key.topology.to_wgpu(),
                    strip_index_format: key.strip_index_format,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                // The pass always carries a depth attachment, so untested
                // pipelines still declare it and simply never write.
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: key.depth_test,
                    depth_compare: if key.depth_test {
                        wgpu::CompareFunction::Less
                    } else {
                        wgpu::CompareFunction::Always
                    },
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        log::debug!(
            "pipeline created for program {} ({:?}, {} attributes)",
            key.program.id(),
            key.topology,
            key.attributes.len()
        );
        self.pipelines.insert(key.clone(), pipeline);
        Some(())
    }

    fn create_program(
        &mut self,
        program: ProgramHandle,
        vertex: &StageSource,
        fragment: &StageSource,
        uniforms: &[UniformInfo],
    ) {
        let module = |label: &str, stage: &StageSource| {
            self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(stage.source.clone())),
            })
        };
        let vertex_module = module("glint vertex stage", vertex);
        let fragment_module = module("glint fragment stage", fragment);

        let group_count = uniforms.iter().map(|u| u.slot.group + 1).max().unwrap_or(0);
        let groups: Vec<GroupLayout> = (0..group_count)
            .map(|group| {
                let entries: Vec<(u32, u32)> = uniforms
                    .iter()
                    .filter(|u| u.slot.group == group)
                    .map(|u| (u.slot.binding, u.size))
                    .collect();
                let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = entries
                    .iter()
                    .map(|&(binding, size)| wgpu::BindGroupLayoutEntry {
                        binding,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: NonZeroU64::new(size as u64),
                        },
                        count: None,
                    })
                    .collect();
                let layout = self
                    .device
                    .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some("glint uniform bgl"),
                        entries: &layout_entries,
                    });
                GroupLayout { layout, entries }
            })
            .collect();

        let layout_refs: Vec<&wgpu::BindGroupLayout> = groups.iter().map(|g| &g.layout).collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("glint program layout"),
                bind_group_layouts: &layout_refs,
                immediate_size: 0,
            });

        self.pipelines.retain(|k, _| k.program != program);
        self.programs.insert(
            program,
            GpuProgram {
                vertex: vertex_module,
                vertex_entry: vertex.entry_point.clone(),
                fragment: fragment_module,
                fragment_entry: fragment.entry_point.clone(),
                pipeline_layout,
                groups,
            },
        );
    }
}

impl Backend for WgpuBackend {
    fn execute(&mut self, command: &Command) -> Result<(), GlError> {
        match command {
            Command::BufferData {
                buffer,
                target,
                data,
                ..
            } => {
                let usage = match target {
                    BufferTarget::Array => wgpu::BufferUsages::VERTEX,
                    BufferTarget::ElementArray => wgpu::BufferUsages::INDEX,
                };
                let gpu = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("glint buffer"),
                        contents: data,
                        usage: usage | wgpu::BufferUsages::COPY_SRC,
                    });
                let shadow = (*target == BufferTarget::ElementArray).then(|| data.clone());
                self.buffers.insert(
                    *buffer,
                    GpuBuffer {
                        buffer: gpu,
                        len: data.len() as u64,
                        shadow,
                    },
                );
            }
            Command::DeleteBuffer { buffer } => {
                if let Some(gpu) = self.buffers.remove(buffer) {
                    gpu.buffer.destroy();
                }
            }
            Command::LinkProgram {
                program,
                vertex,
                fragment,
                uniforms,
            } => self.create_program(*program, vertex, fragment, uniforms),
            Command::DeleteProgram { program } => {
                self.programs.remove(program);
                self.pipelines.retain(|k, _| k.program != *program);
            }
            Command::Clear { mask, color } => {
                let (color, depth) = clear_targets(*mask, *color);
                self.pending.push(PendingOp::Clear { color, depth });
            }
            Command::Draw(call) => self.pending.push(PendingOp::Draw(call.clone())),
            // Bind state is tracked by the context and arrives snapshotted in draws.
            _ => {}
        }
        Ok(())
    }

    fn read_buffer(&mut self, buffer: BufferHandle) -> Result<Vec<u8>, GlError> {
        let gpu = self
            .buffers
            .get(&buffer)
            .ok_or(GlError::UnknownBuffer(buffer.id()))?;

        let padded = gpu.buffer.size();
        if padded == 0 {
            return Ok(Vec::new());
        }

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glint readback"),
            size: padded,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("glint readback encoder"),
            });
        encoder.copy_buffer_to_buffer(&gpu.buffer, 0, &staging, 0, padded);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GlError::Backend(format!("device poll failed: {e}")))?;

        match rx.recv() {
            Ok(Ok(())) => {
                let mapped = slice.get_mapped_range();
                let out = mapped[..gpu.len as usize].to_vec();
                drop(mapped);
                staging.unmap();
                Ok(out)
            }
            Ok(Err(e)) => Err(GlError::Backend(format!("buffer map failed: {e}"))),
            Err(_) => Err(GlError::Backend("buffer map callback dropped".to_string())),
        }
    }
}

fn vertex_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

fn index_format(index_type: IndexType) -> wgpu::IndexFormat {
    match index_type {
        IndexType::UnsignedShort => wgpu::IndexFormat::Uint16,
        IndexType::UnsignedInt => wgpu::IndexFormat::Uint32,
    }
}

/// Colour to clear to, if any, and whether depth is cleared.
fn clear_targets(mask: ClearMask, color: [f32; 4]) -> (Option<[f32; 4]>, bool) {
    (
        mask.contains(ClearMask::COLOR).then_some(color),
        mask.contains(ClearMask::DEPTH),
    )
}

fn read_indices(bytes: &[u8], index_type: IndexType, offset: u32, count: u32) -> Vec<u32> {
    let size = index_type.size();
    let start = offset as usize;
    let end = (start + count as usize * size).min(bytes.len());
    // A trailing partial index is dropped.
    let end = start + end.saturating_sub(start) / size * size;
    let Some(window) = bytes.get(start..end) else {
        return Vec::new();
    };
    match index_type {
        IndexType::UnsignedShort => bytemuck::pod_collect_to_vec::<u8, u16>(window)
            .into_iter()
            .map(u32::from)
            .collect(),
        IndexType::UnsignedInt => bytemuck::pod_collect_to_vec::<u8, u32>(window),
    }
}

/// Converts a GL viewport (origin bottom-left) to a wgpu one (origin
/// top-left), clipped to the target. wgpu rejects viewports that leave the
/// target, so partially off-screen viewports are cropped.
fn clamp_viewport(call: &DrawCall, width: u32, height: u32) -> Option<[f32; 4]> {
    let v = call.viewport;
    let (w, h) = (width as i32, height as i32);
    let top = h - (v.y + v.height);

    let x0 = v.x.max(0);
    let y0 = top.max(0);
    let x1 = (v.x + v.width).min(w);
    let y1 = (top + v.height).min(h);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some([x0 as f32, y0 as f32, (x1 - x0) as f32, (y1 - y0) as f32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::types::{Topology, ViewportRect};
    use std::num::NonZeroU32;

    fn call_with_viewport(viewport: ViewportRect) -> DrawCall {
        DrawCall {
            topology: Topology::Triangles,
            kind: DrawKind::Arrays { first: 0, count: 3 },
            program: ProgramHandle::from_raw(NonZeroU32::MIN),
            attributes: Vec::new(),
            uniforms: Vec::new(),
            depth_test: false,
            viewport,
        }
    }

    #[test]
    fn viewport_flips_origin() {
        let call = call_with_viewport(ViewportRect::new(10, 20, 100, 50));
        assert_eq!(clamp_viewport(&call, 400, 300), Some([10.0, 230.0, 100.0, 50.0]));
    }

    #[test]
    fn viewport_is_cropped_to_target() {
        let call = call_with_viewport(ViewportRect::new(-10, 0, 500, 300));
        assert_eq!(clamp_viewport(&call, 400, 300), Some([0.0, 0.0, 400.0, 300.0]));
    }

    #[test]
    fn offscreen_viewport_is_rejected() {
        let call = call_with_viewport(ViewportRect::new(500, 0, 10, 10));
        assert_eq!(clamp_viewport(&call, 400, 300), None);
    }

    #[test]
    fn reads_u16_indices_at_offset() {
        let bytes: Vec<u8> = [3u16, 2, 1, 0].iter().flat_map(|i| i.to_le_bytes()).collect();
        assert_eq!(read_indices(&bytes, IndexType::UnsignedShort, 2, 2), vec![2, 1]);
    }

    #[test]
    fn reads_u32_indices_and_drops_partial_tail() {
        let mut bytes: Vec<u8> = [7u32, 70_000].iter().flat_map(|i| i.to_le_bytes()).collect();
        bytes.extend_from_slice(&[1, 2]);
        assert_eq!(read_indices(&bytes, IndexType::UnsignedInt, 0, 3), vec![7, 70_000]);
    }

    #[test]
    fn index_window_past_the_buffer_is_empty() {
        let bytes = [0u8; 4];
        assert!(read_indices(&bytes, IndexType::UnsignedShort, 8, 2).is_empty());
    }

    #[test]
    fn clear_mask_selects_targets() {
        let red = [1.0, 0.0, 0.0, 1.0];
        assert_eq!(clear_targets(ClearMask::COLOR, red), (Some(red), false));
        assert_eq!(clear_targets(ClearMask::DEPTH, red), (None, true));
        assert_eq!(
            clear_targets(ClearMask::COLOR | ClearMask::DEPTH, red),
            (Some(red), true)
        );
    }
}
