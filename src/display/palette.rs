// Palette table - Maps 256 palette indices to display-native pixels
//
// The console draws with palette indices. The table keeps two copies of the
// 256 mapped colors: the pristine originals loaded from a named palette, and
// the active entries the compositor reads, which games may override per index.

use crate::error::{HalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of entries in a palette
pub const PALETTE_SIZE: usize = 256;

/// Display-native color word
pub type Pixel = u32;

/// Name of the palette selected when no other is configured
pub const DEFAULT_PALETTE: &str = "pico8";

/// The 16 base PICO-8 colors in 0xRRGGBB format
pub const PICO8_BASE: [u32; 16] = [
    0x000000, 0x1D2B53, 0x7E2553, 0x008751, 0xAB5236, 0x5F574F, 0xC2C3C7, 0xFFF1E8,
    0xFF004D, 0xFFA300, 0xFFEC27, 0x00E436, 0x29ADFF, 0x83769C, 0xFF77A8, 0xFFCCAA,
];

/// The 16 extended PICO-8 colors, addressed at indices 128-143
pub const PICO8_EXTENDED: [u32; 16] = [
    0x291814, 0x111D35, 0x422136, 0x125359, 0x742F29, 0x49333B, 0xA28879, 0xF3EF7D,
    0xBE1250, 0xFF6C24, 0xA8E72E, 0x00B543, 0x065AB5, 0x754665, 0xFF6E59, 0xFF9D81,
];

/// Packing of a display-native pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 16-bit 5-6-5 RGB in the low half of the word
    Rgb565,
    /// Bytes R, G, B, A in memory order
    #[default]
    Rgba8888,
}

impl PixelFormat {
    /// Convert an 8-bit channel triplet to this format
    #[inline]
    pub fn map_rgb(self, r: u8, g: u8, b: u8) -> Pixel {
        match self {
            PixelFormat::Rgb565 => {
                ((r as u32 >> 3) << 11) | ((g as u32 >> 2) << 5) | (b as u32 >> 3)
            }
            PixelFormat::Rgba8888 => u32::from_le_bytes([r, g, b, 0xFF]),
        }
    }

    /// Convert a packed 0xRRGGBB value to this format
    #[inline]
    pub fn map_packed(self, rgb: u32) -> Pixel {
        self.map_rgb(
            ((rgb >> 16) & 0xFF) as u8,
            ((rgb >> 8) & 0xFF) as u8,
            (rgb & 0xFF) as u8,
        )
    }

    /// Convert a pixel of this format back to an 8-bit channel triplet
    ///
    /// 5- and 6-bit channels are expanded by bit replication, so pure black
    /// and pure white survive a round trip.
    #[inline]
    pub fn unmap(self, pixel: Pixel) -> (u8, u8, u8) {
        match self {
            PixelFormat::Rgb565 => {
                let r5 = ((pixel >> 11) & 0x1F) as u8;
                let g6 = ((pixel >> 5) & 0x3F) as u8;
                let b5 = (pixel & 0x1F) as u8;
                ((r5 << 3) | (r5 >> 2), (g6 << 2) | (g6 >> 4), (b5 << 3) | (b5 >> 2))
            }
            PixelFormat::Rgba8888 => {
                let [r, g, b, _] = pixel.to_le_bytes();
                (r, g, b)
            }
        }
    }

    /// Convert a pixel of this format to RGBA bytes
    #[inline]
    pub fn to_rgba(self, pixel: Pixel) -> [u8; 4] {
        let (r, g, b) = self.unmap(pixel);
        [r, g, b, 0xFF]
    }

    /// Parse a format name as written in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "rgb565" => Some(PixelFormat::Rgb565),
            "rgba8888" => Some(PixelFormat::Rgba8888),
            _ => None,
        }
    }
}

/// Source of named 256-entry RGB palettes
pub trait PaletteRegistry {
    /// Look up a palette by name, returning 256 colors in 0xRRGGBB format
    fn lookup(&self, name: &str) -> Option<&[u32; PALETTE_SIZE]>;
}

/// In-memory palette registry with the built-in palettes preloaded
#[derive(Debug, Clone)]
pub struct PaletteLibrary {
    palettes: HashMap<String, Box<[u32; PALETTE_SIZE]>>,
}

impl PaletteLibrary {
    /// Create a library holding the built-in `pico8` and `grayscale` palettes
    pub fn new() -> Self {
        let mut library = Self {
            palettes: HashMap::new(),
        };
        library.insert("pico8", pico8_palette());
        library.insert("grayscale", grayscale_palette());
        library
    }

    /// Register or replace a palette
    ///
    /// At most 256 colors are taken; missing entries are black.
    pub fn register(&mut self, name: &str, colors: &[u32]) {
        let mut table = [0u32; PALETTE_SIZE];
        for (dst, &src) in table.iter_mut().zip(colors.iter()) {
            *dst = src & 0xFF_FFFF;
        }
        if colors.len() > PALETTE_SIZE {
            log::warn!(
                "Palette '{}' has {} colors, extra entries ignored",
                name,
                colors.len()
            );
        }
        self.insert(name, table);
    }

    /// Names of all registered palettes, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.palettes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn insert(&mut self, name: &str, table: [u32; PALETTE_SIZE]) {
        self.palettes.insert(name.to_string(), Box::new(table));
    }
}

impl Default for PaletteLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteRegistry for PaletteLibrary {
    fn lookup(&self, name: &str) -> Option<&[u32; PALETTE_SIZE]> {
        self.palettes.get(name).map(|table| &**table)
    }
}

/// Build the PICO-8 palette: base colors mirror across the table, the
/// extended colors sit at 128-143
pub fn pico8_palette() -> [u32; PALETTE_SIZE] {
    let mut table = [0u32; PALETTE_SIZE];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = PICO8_BASE[i & 0x0F];
    }
    table[128..144].copy_from_slice(&PICO8_EXTENDED);
    table
}

/// Build a linear 256-step gray ramp
pub fn grayscale_palette() -> [u32; PALETTE_SIZE] {
    let mut table = [0u32; PALETTE_SIZE];
    for (i, entry) in table.iter_mut().enumerate() {
        let v = i as u32;
        *entry = (v << 16) | (v << 8) | v;
    }
    table
}

/// Active and original palette entries
///
/// `active[i]` is always either `original[i]` or a value set through
/// [`PaletteTable::set_index`]. `original` only changes on
/// [`PaletteTable::select_palette`].
#[derive(Debug, Clone)]
pub struct PaletteTable {
    format: PixelFormat,
    original: [Pixel; PALETTE_SIZE],
    active: [Pixel; PALETTE_SIZE],
    name: Option<String>,
}

impl PaletteTable {
    /// Create an all-black table for the given pixel format
    pub fn new(format: PixelFormat) -> Self {
        let black = format.map_rgb(0, 0, 0);
        Self {
            format,
            original: [black; PALETTE_SIZE],
            active: [black; PALETTE_SIZE],
            name: None,
        }
    }

    /// Load a named palette, replacing both original and active entries
    ///
    /// # Errors
    /// Returns `HalError::PaletteNotFound` if the registry has no such
    /// palette; the table is left untouched.
    pub fn select_palette<R: PaletteRegistry + ?Sized>(
        &mut self,
        registry: &R,
        name: &str,
    ) -> Result<()> {
        let colors = registry
            .lookup(name)
            .ok_or_else(|| HalError::PaletteNotFound(name.to_string()))?;

        for (i, &rgb) in colors.iter().enumerate() {
            let pixel = self.format.map_packed(rgb);
            self.original[i] = pixel;
            self.active[i] = pixel;
        }
        self.name = Some(name.to_string());

        log::debug!("Selected palette '{}'", name);
        Ok(())
    }

    /// Copy every original entry over the active entries
    pub fn restore_all(&mut self) {
        self.active = self.original;
    }

    /// Copy one original entry over its active entry
    #[inline]
    pub fn restore_index(&mut self, index: u8) {
        self.active[index as usize] = self.original[index as usize];
    }

    /// Override one active entry; the original is left untouched
    #[inline]
    pub fn set_index(&mut self, index: u8, r: u8, g: u8, b: u8) {
        self.active[index as usize] = self.format.map_rgb(r, g, b);
    }

    /// Active entry for a palette index
    #[inline]
    pub fn active(&self, index: u8) -> Pixel {
        self.active[index as usize]
    }

    /// Original entry for a palette index
    #[inline]
    pub fn original(&self, index: u8) -> Pixel {
        self.original[index as usize]
    }

    /// All active entries, as read by the compositor
    #[inline]
    pub fn active_entries(&self) -> &[Pixel; PALETTE_SIZE] {
        &self.active
    }

    /// All original entries
    pub fn original_entries(&self) -> &[Pixel; PALETTE_SIZE] {
        &self.original
    }

    /// Pixel format the entries are stored in
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Name of the currently selected palette, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Active entry converted back to an RGB triplet
    pub fn active_rgb(&self, index: u8) -> (u8, u8, u8) {
        self.format.unmap(self.active(index))
    }
}

impl Default for PaletteTable {
    fn default() -> Self {
        Self::new(PixelFormat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pico8_table(format: PixelFormat) -> PaletteTable {
        let mut table = PaletteTable::new(format);
        table
            .select_palette(&PaletteLibrary::new(), "pico8")
            .unwrap();
        table
    }

    #[test]
    fn test_map_rgba8888() {
        let pixel = PixelFormat::Rgba8888.map_rgb(0x12, 0x34, 0x56);
        assert_eq!(pixel.to_le_bytes(), [0x12, 0x34, 0x56, 0xFF]);
        assert_eq!(PixelFormat::Rgba8888.unmap(pixel), (0x12, 0x34, 0x56));
    }

    #[test]
    fn test_map_rgb565() {
        assert_eq!(PixelFormat::Rgb565.map_rgb(0xFF, 0x00, 0x00), 0xF800);
        assert_eq!(PixelFormat::Rgb565.map_rgb(0x00, 0xFF, 0x00), 0x07E0);
        assert_eq!(PixelFormat::Rgb565.map_rgb(0x00, 0x00, 0xFF), 0x001F);
        assert_eq!(PixelFormat::Rgb565.unmap(0xFFFF), (0xFF, 0xFF, 0xFF));
        assert_eq!(PixelFormat::Rgb565.unmap(0x0000), (0x00, 0x00, 0x00));
    }

    #[test]
    fn test_pixel_format_names() {
        assert_eq!(PixelFormat::from_name("RGB565"), Some(PixelFormat::Rgb565));
        assert_eq!(
            PixelFormat::from_name("rgba8888"),
            Some(PixelFormat::Rgba8888)
        );
        assert_eq!(PixelFormat::from_name("yuv"), None);
    }

    #[test]
    fn test_pico8_layout() {
        let table = pico8_palette();
        assert_eq!(table[7], 0xFFF1E8);
        assert_eq!(table[16 + 8], PICO8_BASE[8]);
        assert_eq!(table[128], 0x291814);
        assert_eq!(table[143], 0xFF9D81);
        assert_eq!(table[144], PICO8_BASE[0]);
    }

    #[test]
    fn test_select_palette_sets_both_tables() {
        let table = pico8_table(PixelFormat::Rgba8888);
        for i in 0..=255u8 {
            assert_eq!(table.active(i), table.original(i));
        }
        assert_eq!(table.active_rgb(8), (0xFF, 0x00, 0x4D));
        assert_eq!(table.name(), Some("pico8"));
    }

    #[test]
    fn test_select_unknown_palette() {
        let mut table = pico8_table(PixelFormat::Rgba8888);
        table.set_index(3, 1, 2, 3);
        let before = table.clone();

        let err = table
            .select_palette(&PaletteLibrary::new(), "sepia")
            .unwrap_err();
        assert!(matches!(err, HalError::PaletteNotFound(ref n) if n == "sepia"));
        assert_eq!(table.active_entries(), before.active_entries());
        assert_eq!(table.name(), Some("pico8"));
    }

    #[test]
    fn test_set_index_only_touches_active_entry() {
        let mut table = pico8_table(PixelFormat::Rgba8888);
        let before = table.clone();

        table.set_index(5, 0xAA, 0xBB, 0xCC);

        assert_eq!(table.active_rgb(5), (0xAA, 0xBB, 0xCC));
        assert_eq!(table.original(5), before.original(5));
        for i in (0..=255u8).filter(|&i| i != 5) {
            assert_eq!(table.active(i), before.active(i));
        }
    }

    #[test]
    fn test_restore_index() {
        let mut table = pico8_table(PixelFormat::Rgb565);
        table.set_index(1, 0xFF, 0xFF, 0xFF);
        table.set_index(2, 0xFF, 0xFF, 0xFF);

        table.restore_index(1);

        assert_eq!(table.active(1), table.original(1));
        assert_ne!(table.active(2), table.original(2));
    }

    #[test]
    fn test_restore_all() {
        let mut table = pico8_table(PixelFormat::Rgba8888);
        for i in 0..=255u8 {
            table.set_index(i, i, 255 - i, 7);
        }

        table.restore_all();

        assert_eq!(table.active_entries(), table.original_entries());
    }

    #[test]
    fn test_register_custom_palette() {
        let mut library = PaletteLibrary::new();
        library.register("duo", &[0x112233, 0xFF445566]);

        let colors = library.lookup("duo").unwrap();
        assert_eq!(colors[0], 0x112233);
        assert_eq!(colors[1], 0x445566);
        assert_eq!(colors[2], 0);
        assert_eq!(library.names(), vec!["duo", "grayscale", "pico8"]);
    }
}
