//! Attribute and uniform wiring for linked programs.

use thiserror::Error;

use crate::gl::{
    AttribLocation, Backend, BufferHandle, BufferTarget, Context, GlError, ProgramHandle,
    UniformLocation,
};
use crate::shader::FailurePolicy;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("program {program} has no active attribute `{name}`")]
    UnknownAttribute { program: u32, name: String },

    #[error("program {program} has no active uniform `{name}`")]
    UnknownUniform { program: u32, name: String },

    #[error(transparent)]
    Gl(#[from] GlError),
}

impl BindError {
    /// True for name-resolution failures, as opposed to context errors.
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            BindError::UnknownAttribute { .. } | BindError::UnknownUniform { .. }
        )
    }
}

impl FailurePolicy {
    /// Applies the policy to a resolution result.
    ///
    /// Under `Permissive` an unresolved name is logged and replaced with
    /// `invalid`, whose later uses are no-ops. Context errors always pass
    /// through.
    pub fn resolve<T>(self, result: Result<T, BindError>, invalid: T) -> Result<T, BindError> {
        match result {
            Err(e) if e.is_unresolved() && self == FailurePolicy::Permissive => {
                log::warn!("{e}; continuing without it");
                Ok(invalid)
            }
            other => other,
        }
    }
}

/// Points attribute `name` at the ARRAY buffer bound right now, as
/// `component_count` tightly packed floats, and enables it.
///
/// Whatever is bound is what gets captured; prefer [`bind_attribute_from`].
pub fn bind_attribute<B: Backend>(
    ctx: &mut Context<B>,
    program: ProgramHandle,
    name: &str,
    component_count: u32,
) -> Result<AttribLocation, BindError> {
    let location = resolve_attribute(ctx, program, name)?;
    ctx.vertex_attrib_pointer(location, component_count, 0, 0)?;
    ctx.enable_vertex_attrib_array(location)?;
    Ok(location)
}

/// Like [`bind_attribute`], but binds `buffer` to ARRAY immediately before
/// the pointer is captured and unbinds it afterwards.
pub fn bind_attribute_from<B: Backend>(
    ctx: &mut Context<B>,
    program: ProgramHandle,
    buffer: BufferHandle,
    name: &str,
    component_count: u32,
) -> Result<AttribLocation, BindError> {
    let location = resolve_attribute(ctx, program, name)?;

    ctx.bind_buffer(BufferTarget::Array, Some(buffer))?;
    ctx.vertex_attrib_pointer(location, component_count, 0, 0)?;
    ctx.enable_vertex_attrib_array(location)?;
    ctx.bind_buffer(BufferTarget::Array, None)?;

    log::trace!("attribute `{name}` -> buffer {} ({component_count} floats)", buffer.id());
    Ok(location)
}

fn resolve_attribute<B: Backend>(
    ctx: &Context<B>,
    program: ProgramHandle,
    name: &str,
) -> Result<AttribLocation, BindError> {
    let location = ctx.attrib_location(program, name);
    if !location.is_valid() {
        return Err(BindError::UnknownAttribute {
            program: program.id(),
            name: name.to_string(),
        });
    }
    Ok(location)
}

/// Resolves a uniform once; callers keep the location for per-frame uploads.
pub fn get_uniform_location<B: Backend>(
    ctx: &Context<B>,
    program: ProgramHandle,
    name: &str,
) -> Result<UniformLocation, BindError> {
    let location = ctx.uniform_location(program, name);
    if !location.is_valid() {
        return Err(BindError::UnknownUniform {
            program: program.id(),
            name: name.to_string(),
        });
    }
    Ok(location)
}
