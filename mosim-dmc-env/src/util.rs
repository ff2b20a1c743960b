//! Conversion between numpy arrays and [`ndarray`], and saving rendered frames.
use anyhow::{anyhow, Result};
use ndarray::{Array3, ArrayD};
use numpy::PyArrayDyn;
use pyo3::{
    types::{PyAny, PyDict},
    IntoPy, PyObject, PyResult, Python,
};
use std::path::Path;

/// Convert [`ArrayD<f32>`] to [`PyObject`].
pub fn arrayd_to_pyobj(py: Python, act: &ArrayD<f32>) -> PyObject {
    PyArrayDyn::<f32>::from_array(py, act).into_py(py)
}

/// Convert an array-like Python object into [`ArrayD<f32>`].
///
/// The object is passed to `numpy.asarray()` with `dtype=float32`, so Python
/// scalars and float64 arrays are accepted. Scalars become 0-dimensional arrays.
pub fn pyany_to_arrayd(py: Python, obj: &PyAny) -> PyResult<ArrayD<f32>> {
    let np = py.import("numpy")?;
    let kwargs = PyDict::new(py);
    kwargs.set_item("dtype", "float32")?;
    let arr: &PyArrayDyn<f32> = np
        .getattr("asarray")?
        .call((obj,), Some(kwargs))?
        .extract()?;
    Ok(arr.to_owned_array())
}

/// Saves an RGB frame of shape `(height, width, 3)` as an image file.
///
/// The format is determined by the extension of `path`.
pub fn save_frame(frame: &Array3<u8>, path: impl AsRef<Path>) -> Result<()> {
    let (height, width, channels) = frame.dim();
    if channels != 3 {
        return Err(anyhow!("expected 3 channels, got {}", channels));
    }
    let img = image::RgbImage::from_raw(width as u32, height as u32, frame.iter().cloned().collect())
        .ok_or_else(|| anyhow!("failed to create an image of {}x{}", width, height))?;
    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_save_frame() -> Result<()> {
        let mut frame = Array3::<u8>::zeros((4, 6, 3));
        frame[[1, 2, 0]] = 255;
        let dir = TempDir::new("save_frame")?;
        let path = dir.path().join("frame.png");
        save_frame(&frame, &path)?;

        let img = image::open(&path)?.to_rgb8();
        assert_eq!(img.dimensions(), (6, 4));
        assert_eq!(img.get_pixel(2, 1).0, [255, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_save_frame_rejects_non_rgb() {
        let frame = Array3::<u8>::zeros((4, 6, 4));
        assert!(save_frame(&frame, "unused.png").is_err());
    }
}
