//! Lowering of GL topologies that have no native wgpu equivalent.

use super::types::Topology;

/// Topologies wgpu can draw directly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NativeTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl NativeTopology {
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            NativeTopology::PointList => wgpu::PrimitiveTopology::PointList,
            NativeTopology::LineList => wgpu::PrimitiveTopology::LineList,
            NativeTopology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            NativeTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            NativeTopology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }

    #[inline]
    pub fn is_strip(self) -> bool {
        matches!(self, NativeTopology::LineStrip | NativeTopology::TriangleStrip)
    }
}

/// Native topology for modes that draw as-is; `None` for modes that need
/// [`lower`].
pub fn native(topology: Topology) -> Option<NativeTopology> {
    match topology {
        Topology::Points => Some(NativeTopology::PointList),
        Topology::Lines => Some(NativeTopology::LineList),
        Topology::LineStrip => Some(NativeTopology::LineStrip),
        Topology::Triangles => Some(NativeTopology::TriangleList),
        Topology::TriangleStrip => Some(NativeTopology::TriangleStrip),
        Topology::LineLoop | Topology::TriangleFan => None,
    }
}

/// Rewrites an index sequence drawn as `topology` into an equivalent native
/// topology and index list.
///
/// - line loop: line strip with the first index appended
/// - triangle fan: triangle list `(i0, ik, ik+1)`
///
/// Sequences too short to form a single primitive lower to an empty list.
pub fn lower(topology: Topology, indices: &[u32]) -> (NativeTopology, Vec<u32>) {
    match topology {
        Topology::LineLoop => {
            if indices.len() < 2 {
                return (NativeTopology::LineStrip, Vec::new());
            }
            let mut out = Vec::with_capacity(indices.len() + 1);
            out.extend_from_slice(indices);
            out.push(indices[0]);
            (NativeTopology::LineStrip, out)
        }
        Topology::TriangleFan => {
            if indices.len() < 3 {
                return (NativeTopology::TriangleList, Vec::new());
            }
            let hub = indices[0];
            let out = indices[1..]
                .windows(2)
                .flat_map(|w| [hub, w[0], w[1]])
                .collect();
            (NativeTopology::TriangleList, out)
        }
        other => match native(other) {
            Some(n) => (n, indices.to_vec()),
            None => (NativeTopology::PointList, Vec::new()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_loop_closes_back_to_first() {
        let (t, idx) = lower(Topology::LineLoop, &[0, 1, 2, 3]);
        assert_eq!(t, NativeTopology::LineStrip);
        assert_eq!(idx, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn triangle_fan_becomes_list() {
        let (t, idx) = lower(Topology::TriangleFan, &[5, 6, 7, 8]);
        assert_eq!(t, NativeTopology::TriangleList);
        assert_eq!(idx, vec![5, 6, 7, 5, 7, 8]);
    }

    #[test]
    fn degenerate_sequences_are_empty() {
        assert!(lower(Topology::LineLoop, &[4]).1.is_empty());
        assert!(lower(Topology::TriangleFan, &[0, 1]).1.is_empty());
    }

    #[test]
    fn native_modes_pass_through() {
        let (t, idx) = lower(Topology::Triangles, &[3, 2, 1]);
        assert_eq!(t, NativeTopology::TriangleList);
        assert_eq!(idx, vec![3, 2, 1]);
        assert!(native(Topology::LineLoop).is_none());
        assert!(native(Topology::TriangleFan).is_none());
    }
}
