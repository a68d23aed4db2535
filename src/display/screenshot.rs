// Screenshot capture
//
// Converts the logical screen through the active palette and saves it as a
// PNG file.

use super::framebuffer::Backbuffer;
use super::palette::PaletteTable;
use crate::error::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Save the backbuffer as seen through the active palette
///
/// The file is written to `directory` (created if missing) and named with
/// a local timestamp.
///
/// # Returns
///
/// Path of the written file
pub fn save_screenshot(
    directory: &Path,
    palette: &PaletteTable,
    backbuffer: &Backbuffer,
) -> Result<PathBuf> {
    fs::create_dir_all(directory)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    let file_path = directory.join(format!("screenshot_{}.png", timestamp));

    let rgb_data = backbuffer_to_rgb(palette, backbuffer.as_slice());
    save_png(
        &file_path,
        &rgb_data,
        backbuffer.width() as u32,
        backbuffer.height() as u32,
    )?;

    log::info!("Screenshot saved to {}", file_path.display());
    Ok(file_path)
}

/// Convert palette indices to RGB888 through the active palette entries
fn backbuffer_to_rgb(palette: &PaletteTable, indices: &[u8]) -> Vec<u8> {
    let mut rgb_data = Vec::with_capacity(indices.len() * 3);

    for &index in indices {
        let (r, g, b) = palette.active_rgb(index);
        rgb_data.extend_from_slice(&[r, g, b]);
    }

    rgb_data
}

fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<()> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;

    Ok(())
}
