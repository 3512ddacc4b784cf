use gltf::accessor::sparse::IndexType;
use gltf::accessor::Dimensions;

use crate::core::attribute::{AttributeLayout, ComponentDataType};
use super::decode::Err;

/// Largest accessor that is materialized from zeros, for sparse accessors
/// without a buffer view.
const MAX_ZERO_FILLED_BYTES: usize = 1 << 31;

/// Accessor contents with strides removed and sparse substitutions applied.
pub(crate) struct AccessorData {
    pub layout: AttributeLayout,
    pub data: Vec<u8>,
}

pub(crate) fn read_accessor(accessor: &gltf::Accessor, buffers: &[Vec<u8>]) -> Result<AccessorData, Err> {
    let component_type = ComponentDataType::from(accessor.data_type());
    let num_components = accessor.dimensions().multiplicity();
    let layout = AttributeLayout::new(component_type, num_components, accessor.normalized());
    let elem_size = layout.stride();
    let count = accessor.count();
    let too_large = || Err::InvalidInput(format!("Accessor {} declares more elements than its data holds", accessor.index()));
    let total = count.checked_mul(elem_size).ok_or_else(too_large)?;

    let mut data = match accessor.view() {
        Some(view) => {
            let stride = view.stride().unwrap_or(elem_size);
            if count > 0 && stride < elem_size {
                return Err(Err::InvalidInput(format!(
                    "Accessor {} has a byte stride of {} for {}-byte elements", accessor.index(), stride, elem_size
                )));
            }
            let buffer = view_bytes(&view, buffers)?;
            if count > 0 {
                let end = (count - 1)
                    .checked_mul(stride)
                    .and_then(|n| n.checked_add(accessor.offset()))
                    .and_then(|n| n.checked_add(elem_size))
                    .ok_or_else(too_large)?;
                if end > buffer.len() {
                    return Err(Err::InvalidInput(format!(
                        "Accessor {} reads {} bytes past the end of its buffer view", accessor.index(), end - buffer.len()
                    )));
                }
            }
            let mut data = Vec::with_capacity(total);
            for i in 0..count {
                let start = accessor.offset() + i * stride;
                data.extend_from_slice(&buffer[start..start + elem_size]);
            }
            data
        }
        // Sparse accessors without a buffer view start out as zeros.
        None => {
            if total > MAX_ZERO_FILLED_BYTES {
                return Err(too_large());
            }
            let mut data = Vec::new();
            data.try_reserve_exact(total).map_err(|_| too_large())?;
            data.resize(total, 0);
            data
        }
    };

    if let Some(sparse) = accessor.sparse() {
        let indices = sparse.indices();
        let index_bytes = view_bytes(&indices.view(), buffers)?;
        let values = sparse.values();
        let value_bytes = view_bytes(&values.view(), buffers)?;
        for i in 0..sparse.count() {
            let target = match indices.index_type() {
                IndexType::U8 => read_u8(index_bytes, indices.offset() + i)? as usize,
                IndexType::U16 => read_u16(index_bytes, indices.offset() + i * 2)? as usize,
                IndexType::U32 => read_u32(index_bytes, indices.offset() + i * 4)? as usize,
            };
            let src = values.offset() + i * elem_size;
            let value = value_bytes.get(src..src + elem_size)
                .ok_or_else(|| Err::InvalidInput(format!("Sparse values of accessor {} are truncated", accessor.index())))?;
            let dst = data.get_mut(target * elem_size..(target + 1) * elem_size)
                .ok_or_else(|| Err::InvalidInput(format!("Sparse index {} is out of range", target)))?;
            dst.copy_from_slice(value);
        }
    }

    Ok(AccessorData { layout, data })
}

/// Reads an index accessor into `u32` values.
pub(crate) fn read_indices(accessor: &gltf::Accessor, buffers: &[Vec<u8>]) -> Result<Vec<u32>, Err> {
    if accessor.dimensions() != Dimensions::Scalar {
        return Err(Err::InvalidInput(format!("Index accessor {} is not scalar", accessor.index())));
    }
    let AccessorData { layout, data, .. } = read_accessor(accessor, buffers)?;
    let indices = match layout.component_type {
        ComponentDataType::U8 => data.iter().map(|&b| b as u32).collect(),
        ComponentDataType::U16 => data.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]]) as u32).collect(),
        ComponentDataType::U32 => data.chunks_exact(4).map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect(),
        other => return Err(Err::InvalidInput(format!("Index accessor {} has component type {:?}", accessor.index(), other))),
    };
    Ok(indices)
}

/// Reads a float accessor of exactly `N` components per element.
pub(crate) fn read_f32_rows<const N: usize>(accessor: &gltf::Accessor, buffers: &[Vec<u8>]) -> Result<Vec<[f32; N]>, Err> {
    let AccessorData { layout, data, .. } = read_accessor(accessor, buffers)?;
    if layout != AttributeLayout::f32(N) {
        return Err(Err::InvalidInput(format!(
            "Accessor {} is {:?}, expected {} float components", accessor.index(), layout, N
        )));
    }
    let rows = data.chunks_exact(4 * N)
        .map(|row| {
            let mut out = [0.0f32; N];
            for (c, bytes) in out.iter_mut().zip(row.chunks_exact(4)) {
                *c = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
            out
        })
        .collect();
    Ok(rows)
}

/// The bytes covered by a buffer view.
pub(crate) fn view_bytes<'a>(view: &gltf::buffer::View, buffers: &'a [Vec<u8>]) -> Result<&'a [u8], Err> {
    let buffer = buffers.get(view.buffer().index())
        .ok_or_else(|| Err::InvalidInput(format!("Buffer {} is not loaded", view.buffer().index())))?;
    view.offset()
        .checked_add(view.length())
        .and_then(|end| buffer.get(view.offset()..end))
        .ok_or_else(|| Err::InvalidInput(format!("Buffer view {} exceeds its buffer", view.index())))
}

fn read_u8(bytes: &[u8], at: usize) -> Result<u8, Err> {
    bytes.get(at).copied().ok_or_else(|| Err::InvalidInput("Sparse indices are truncated".to_string()))
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16, Err> {
    match bytes.get(at..at + 2) {
        Some(b) => Ok(u16::from_le_bytes([b[0], b[1]])),
        None => Err(Err::InvalidInput("Sparse indices are truncated".to_string())),
    }
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, Err> {
    match bytes.get(at..at + 4) {
        Some(b) => Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(Err::InvalidInput("Sparse indices are truncated".to_string())),
    }
}
