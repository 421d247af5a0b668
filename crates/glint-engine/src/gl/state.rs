use super::command::AttribPointer;
use super::handles::{BufferHandle, ProgramHandle};
use super::types::ViewportRect;

/// Number of vertex attribute slots per context.
pub const MAX_VERTEX_ATTRIBS: usize = 16;

/// One vertex attribute slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct VertexAttrib {
    pub enabled: bool,
    pub pointer: Option<AttribPointer>,
}

/// Per-context render state.
///
/// Every `Context` call that changes what subsequent calls operate on
/// ("the currently bound buffer/program") mutates this structure.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub clear_color: [f32; 4],
    pub depth_test: bool,
    pub viewport: ViewportRect,
    pub array_buffer: Option<BufferHandle>,
    pub element_buffer: Option<BufferHandle>,
    pub program: Option<ProgramHandle>,
    pub vertex_attribs: [VertexAttrib; MAX_VERTEX_ATTRIBS],
}

impl RenderState {
    /// Initial state for a surface of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            depth_test: false,
            viewport: ViewportRect::full(width, height),
            array_buffer: None,
            element_buffer: None,
            program: None,
            vertex_attribs: [VertexAttrib::default(); MAX_VERTEX_ATTRIBS],
        }
    }
}
