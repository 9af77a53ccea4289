use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::{
    memory::{AlignedBuffer, AllocError, ZeroValid},
    numerics::Element,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read npy input: {0}")]
    Io(#[from] std::io::Error),
    #[error("npy element type does not match the requested precision: {0}")]
    DType(#[from] npyz::DTypeError),
    #[error("npy shape {shape:?} does not describe an addressable element count")]
    InvalidShape { shape: Vec<u64> },
    #[error("npy file declares {declared} elements but holds {found}")]
    Truncated { declared: usize, found: usize },
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// Reads a `.npy` file of any shape into an aligned buffer, flattened in
/// storage order.
pub fn load_npy<T>(path: impl AsRef<Path>) -> Result<AlignedBuffer<T>, LoadError>
where
    T: Element + ZeroValid + npyz::Deserialize,
{
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let buffer = load_npy_bytes::<T>(&bytes)?;
    info!(path = %path.display(), len = buffer.len(), precision = T::NAME, "loaded npy input");
    Ok(buffer)
}

/// Same as [`load_npy`], from an in-memory `.npy` image.
pub fn load_npy_bytes<T>(bytes: &[u8]) -> Result<AlignedBuffer<T>, LoadError>
where
    T: Element + ZeroValid + npyz::Deserialize,
{
    let npy = npyz::NpyFile::new(bytes)?;
    let shape = npy.shape();
    let declared = shape
        .iter()
        .try_fold(1u64, |acc, &dim| acc.checked_mul(dim))
        .and_then(|count| usize::try_from(count).ok())
        .ok_or_else(|| LoadError::InvalidShape {
            shape: shape.to_vec(),
        })?;

    let mut buffer = AlignedBuffer::<T>::zeroed(declared)?;
    let mut found = 0;
    for (slot, value) in buffer.iter_mut().zip(npy.data::<T>()?) {
        *slot = value?;
        found += 1;
    }

    if found != declared {
        return Err(LoadError::Truncated { declared, found });
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ALIGNMENT;

    /// Builds a version 1.0 `.npy` image for a little-endian array.
    fn npy_image(descr: &str, shape: &str, payload: &[u8]) -> Vec<u8> {
        let mut header =
            format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape}, }}");
        // magic (6) + version (2) + header length (2) + header + '\n' must be a multiple of 64
        while (10 + header.len() + 1) % 64 != 0 {
            header.push(' ');
        }
        header.push('\n');

        let mut out = b"\x93NUMPY\x01\x00".to_vec();
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn f32_payload(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn loads_one_dimensional_f32() {
        let image = npy_image("<f4", "(5,)", &f32_payload(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        let buffer = load_npy_bytes::<f32>(&image).unwrap();
        assert_eq!(&*buffer, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((buffer.as_ptr() as usize).is_multiple_of(ALIGNMENT));
    }

    #[test]
    fn flattens_two_dimensional_f64() {
        let payload: Vec<u8> = [1.5f64, -2.0, 0.25, 8.0, 9.0, 10.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let image = npy_image("<f8", "(2, 3)", &payload);
        let buffer = load_npy_bytes::<f64>(&image).unwrap();
        assert_eq!(&*buffer, &[1.5, -2.0, 0.25, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn rejects_precision_mismatch() {
        let image = npy_image("<f4", "(2,)", &f32_payload(&[1.0, 2.0]));
        let err = load_npy_bytes::<f64>(&image).unwrap_err();
        assert!(matches!(err, LoadError::DType(_)), "{err}");
    }

    #[test]
    fn rejects_truncated_payload() {
        let image = npy_image("<f4", "(4,)", &f32_payload(&[1.0, 2.0]));
        assert!(load_npy_bytes::<f32>(&image).is_err());
    }

    #[test]
    fn rejects_overflowing_shape() {
        // 2^32 * 2^32 wraps to zero in u64
        let image = npy_image("<f4", "(4294967296, 4294967296)", &[]);
        let err = load_npy_bytes::<f32>(&image).unwrap_err();
        match err {
            LoadError::InvalidShape { shape } => {
                assert_eq!(shape, vec![1u64 << 32, 1u64 << 32]);
            }
            other => panic!("expected an invalid shape, got {other}"),
        }
    }

    #[test]
    fn zero_sized_dimension_is_an_empty_buffer() {
        let image = npy_image("<f8", "(3, 0)", &[]);
        let buffer = load_npy_bytes::<f64>(&image).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn rejects_garbage() {
        let err = load_npy_bytes::<f32>(b"definitely not numpy").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_npy::<f32>("/nonexistent/lanewise/input.npy").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
