//! Perceptual palette matching for [`image::imageops::dither`].
//!
//! The buffers themselves only do exact-match lookups; quantizing a photo
//! down to a small palette happens before rendering, through this map.

use crate::color::Color;
use image::imageops::ColorMap;
use image::Rgb;
use palette::color_difference::HyAb;
use palette::{IntoColor, Oklab, Srgb};

fn oklab_of(r: u8, g: u8, b: u8) -> Oklab {
    Srgb::new(r, g, b).into_format::<f32>().into_linear().into_color()
}

/// Maps arbitrary RGB values onto the nearest palette entry by hybrid
/// distance in Oklab.
pub struct PaletteMap {
    palette: Vec<Color>,
    oklab: Vec<Oklab>,
}

impl PaletteMap {
    pub fn new(palette: &[Color]) -> Self {
        Self {
            palette: palette.to_vec(),
            oklab: palette.iter().map(|c| oklab_of(c.r, c.g, c.b)).collect(),
        }
    }
}

impl ColorMap for PaletteMap {
    type Color = Rgb<u8>;

    fn index_of(&self, color: &Self::Color) -> usize {
        let target = oklab_of(color.0[0], color.0[1], color.0[2]);
        self.oklab
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.hybrid_distance(target).total_cmp(&b.hybrid_distance(target))
            })
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    fn lookup(&self, index: usize) -> Option<Self::Color> {
        self.palette
            .get(index)
            .map(|entry| Rgb([entry.r, entry.g, entry.b]))
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Self::Color) {
        if let Some(mapped) = self.lookup(self.index_of(color)) {
            *color = mapped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_palette() -> Vec<Color> {
        vec![
            Color::BLACK,
            Color::WHITE,
            Color::rgb(255, 0, 0),
            Color::rgb(0, 0, 255),
        ]
    }

    #[test]
    fn exact_colors_map_to_their_index() {
        let map = PaletteMap::new(&test_palette());
        assert_eq!(map.index_of(&Rgb([0, 0, 0])), 0);
        assert_eq!(map.index_of(&Rgb([255, 255, 255])), 1);
        assert_eq!(map.index_of(&Rgb([255, 0, 0])), 2);
    }

    #[test]
    fn near_colors_snap_to_the_closest_entry() {
        let map = PaletteMap::new(&test_palette());
        assert_eq!(map.index_of(&Rgb([250, 10, 5])), 2);
        assert_eq!(map.index_of(&Rgb([10, 5, 240])), 3);
        assert_eq!(map.index_of(&Rgb([245, 250, 250])), 1);
    }

    #[test]
    fn lookup_returns_palette_rgb() {
        let map = PaletteMap::new(&test_palette());
        assert_eq!(map.lookup(2), Some(Rgb([255, 0, 0])));
        assert_eq!(map.lookup(9), None);
        let mut color = Rgb([250, 10, 5]);
        map.map_color(&mut color);
        assert_eq!(color, Rgb([255, 0, 0]));
    }
}
