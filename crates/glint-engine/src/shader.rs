//! Shader compilation and program linking.
//!
//! Neither step fails the caller on bad shader text: the outcome is a
//! [`ShaderBuild`] holding the handle and, when something went wrong, the
//! compiler or linker log. The caller decides what a diagnostic means via
//! [`FailurePolicy`].

use crate::gl::{Backend, Context, GlError, ProgramHandle, ShaderHandle, ShaderStage};

/// How scene setup reacts to shader and binding diagnostics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log and carry on with whatever was produced; broken programs draw
    /// nothing, unresolved names become no-ops.
    #[default]
    Permissive,
    /// Abort setup on the first diagnostic.
    Strict,
}

/// A compiled shader or linked program, plus its log when the step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBuild<H> {
    pub handle: H,
    pub log: Option<String>,
}

impl<H: Copy> ShaderBuild<H> {
    pub fn is_ok(&self) -> bool {
        self.log.is_none()
    }

    /// The handle if the step succeeded, the log otherwise.
    pub fn into_result(self) -> Result<H, String> {
        match self.log {
            None => Ok(self.handle),
            Some(log) => Err(log),
        }
    }
}

/// Creates a `stage` shader from `source` and compiles it.
///
/// `Err` only for context-level failures; compile errors come back in
/// [`ShaderBuild::log`] and are logged at `warn`.
pub fn compile_shader<B: Backend>(
    ctx: &mut Context<B>,
    source: &str,
    stage: ShaderStage,
) -> Result<ShaderBuild<ShaderHandle>, GlError> {
    let shader = ctx.create_shader(stage);
    ctx.shader_source(shader, source)?;
    ctx.compile_shader(shader)?;

    if ctx.shader_compile_status(shader) {
        log::debug!("{stage} shader {} compiled", shader.id());
        return Ok(ShaderBuild {
            handle: shader,
            log: None,
        });
    }

    let info = ctx.shader_info_log(shader);
    log::warn!("{stage} shader {} failed to compile:\n{info}", shader.id());
    Ok(ShaderBuild {
        handle: shader,
        log: Some(info),
    })
}

/// Attaches `shaders` to a new program, links it and makes it current.
///
/// The program is made current even when linking fails, so draws with it
/// fail visibly instead of silently using a previous program.
pub fn link_program<B: Backend>(
    ctx: &mut Context<B>,
    shaders: &[ShaderHandle],
) -> Result<ShaderBuild<ProgramHandle>, GlError> {
    let program = ctx.create_program();
    for &shader in shaders {
        ctx.attach_shader(program, shader)?;
    }
    ctx.link_program(program)?;
    ctx.use_program(Some(program))?;

    if ctx.program_link_status(program) {
        log::debug!("program {} linked", program.id());
        return Ok(ShaderBuild {
            handle: program,
            log: None,
        });
    }

    let info = ctx.program_info_log(program);
    log::warn!("program {} failed to link:\n{info}", program.id());
    Ok(ShaderBuild {
        handle: program,
        log: Some(info),
    })
}
