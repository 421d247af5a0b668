//! Geometry upload.
//!
//! Every function here leaves its binding point empty on return, so nothing
//! downstream can accidentally write through a buffer it did not bind.

use crate::gl::{Backend, BufferHandle, BufferTarget, BufferUsage, Context, GlError};

/// Uploads `vertices` into a new static ARRAY buffer.
pub fn create_vertex_buffer<B: Backend>(
    ctx: &mut Context<B>,
    vertices: &[f32],
) -> Result<BufferHandle, GlError> {
    upload(ctx, BufferTarget::Array, bytemuck::cast_slice(vertices))
}

/// Uploads `indices` into a new static ELEMENT_ARRAY buffer.
pub fn create_index_buffer<B: Backend>(
    ctx: &mut Context<B>,
    indices: &[u16],
) -> Result<BufferHandle, GlError> {
    upload(ctx, BufferTarget::ElementArray, bytemuck::cast_slice(indices))
}

fn upload<B: Backend>(
    ctx: &mut Context<B>,
    target: BufferTarget,
    bytes: &[u8],
) -> Result<BufferHandle, GlError> {
    let buffer = ctx.create_buffer();
    ctx.bind_buffer(target, Some(buffer))?;
    ctx.buffer_data(target, bytes, BufferUsage::StaticDraw)?;
    ctx.bind_buffer(target, None)?;

    log::debug!("uploaded {} bytes to {target:?} buffer {}", bytes.len(), buffer.id());
    Ok(buffer)
}

/// Reads a vertex buffer back as floats.
pub fn read_vertex_buffer<B: Backend>(
    ctx: &mut Context<B>,
    buffer: BufferHandle,
) -> Result<Vec<f32>, GlError> {
    let bytes = ctx.read_buffer(buffer)?;
    let whole = bytes.len() / size_of::<f32>() * size_of::<f32>();
    Ok(bytemuck::pod_collect_to_vec(&bytes[..whole]))
}

/// Reads an index buffer back as `u16`s.
pub fn read_index_buffer<B: Backend>(
    ctx: &mut Context<B>,
    buffer: BufferHandle,
) -> Result<Vec<u16>, GlError> {
    let bytes = ctx.read_buffer(buffer)?;
    let whole = bytes.len() / size_of::<u16>() * size_of::<u16>();
    Ok(bytemuck::pod_collect_to_vec(&bytes[..whole]))
}

/// Releases a buffer. Binding points holding it are reset.
pub fn delete_buffer<B: Backend>(ctx: &mut Context<B>, buffer: BufferHandle) -> Result<(), GlError> {
    ctx.delete_buffer(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{Command, RecordingBackend};

    fn ctx() -> Context<RecordingBackend> {
        Context::new(RecordingBackend::new(), 100, 100).unwrap()
    }

    #[test]
    fn vertex_round_trip() {
        let mut ctx = ctx();
        let cases: [&[f32]; 3] = [
            &[-0.9, 0.9, -0.1, -0.9, 0.8, 0.2],
            &[0.0, 0.5, 0.0, -0.5, -0.5, 0.0, 0.5, -0.5, 0.0],
            &[f32::MIN_POSITIVE, -0.0, 1e9, 3.25],
        ];
        for vertices in cases {
            let buf = create_vertex_buffer(&mut ctx, vertices).unwrap();
            assert_eq!(read_vertex_buffer(&mut ctx, buf).unwrap(), vertices);
        }
    }

    #[test]
    fn index_round_trip() {
        let mut ctx = ctx();
        let buf = create_index_buffer(&mut ctx, &[3, 2, 1, 3, 1, 0]).unwrap();
        assert_eq!(read_index_buffer(&mut ctx, buf).unwrap(), vec![3, 2, 1, 3, 1, 0]);
    }

    #[test]
    fn partial_trailing_element_is_dropped() {
        let mut ctx = ctx();
        let mut bytes = bytemuck::cast_slice::<u16, u8>(&[5, 6]).to_vec();
        bytes.push(0xff);
        let buf = upload(&mut ctx, BufferTarget::ElementArray, &bytes).unwrap();
        assert_eq!(read_index_buffer(&mut ctx, buf).unwrap(), vec![5, 6]);
        assert!(read_vertex_buffer(&mut ctx, buf).unwrap().len() == 1);
    }

    #[test]
    fn leaves_nothing_bound() {
        let mut ctx = ctx();
        create_vertex_buffer(&mut ctx, &[1.0, 2.0]).unwrap();
        create_index_buffer(&mut ctx, &[0, 1]).unwrap();
        assert_eq!(ctx.bound_buffer(BufferTarget::Array), None);
        assert_eq!(ctx.bound_buffer(BufferTarget::ElementArray), None);
    }

    #[test]
    fn upload_is_bind_data_unbind() {
        let mut ctx = ctx();
        let buf = create_index_buffer(&mut ctx, &[0, 1, 2]).unwrap();
        let commands = ctx.backend().commands();

        assert!(matches!(
            commands,
            [
                Command::BindBuffer { target: BufferTarget::ElementArray, buffer: Some(b) },
                Command::BufferData { usage: BufferUsage::StaticDraw, .. },
                Command::BindBuffer { target: BufferTarget::ElementArray, buffer: None },
            ] if *b == buf
        ));
    }

    #[test]
    fn deleted_buffer_cannot_be_read() {
        let mut ctx = ctx();
        let buf = create_vertex_buffer(&mut ctx, &[1.0]).unwrap();
        delete_buffer(&mut ctx, buf).unwrap();
        assert!(read_vertex_buffer(&mut ctx, buf).is_err());
    }
}
