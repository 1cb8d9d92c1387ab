use std::path::Path;

use image::{GrayImage, ImageBuffer, ImageFormat, Luma};
use ndarray::Array2;

use crate::error::{FolderError, Result};

/// Save a plane as 16-bit grayscale TIFF, raw sample values.
pub fn save_tiff(plane: &Array2<u16>, path: &Path) -> Result<()> {
    let (h, w) = plane.dim();
    let pixels: Vec<u16> = plane.iter().copied().collect();

    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels).ok_or(
        FolderError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        },
    )?;
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save a plane as 8-bit grayscale PNG, stretched so the brightest sample
/// maps to 255.
pub fn save_png(plane: &Array2<u16>, path: &Path) -> Result<()> {
    let (h, w) = plane.dim();
    let max = plane.iter().copied().max().unwrap_or(0).max(1) as f32;

    let mut img = GrayImage::new(w as u32, h as u32);
    for ((row, col), &v) in plane.indexed_iter() {
        let val = (v as f32 / max * 255.0).round() as u8;
        img.put_pixel(col as u32, row as u32, Luma([val]));
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a plane, choosing format from file extension.
pub fn save_plane(plane: &Array2<u16>, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tiff" | "tif") => save_tiff(plane, path),
        Some("png") => save_png(plane, path),
        _ => save_tiff(plane, path),
    }
}

/// Load a grayscale image as 16-bit samples.
pub fn load_plane(path: &Path) -> Result<Array2<u16>> {
    let img = image::open(path)?;
    let gray = img.to_luma16();
    let (w, h) = gray.dimensions();
    Ok(Array2::from_shape_vec(
        (h as usize, w as usize),
        gray.into_raw(),
    )?)
}
