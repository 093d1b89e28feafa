use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

const ALIVE: [u8; 4] = [235, 235, 235, 255];
const DEAD: [u8; 4] = [16, 16, 16, 255];

/// How scalar cells become colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// `(sin(v) + 1) / 2` as gray.
    #[default]
    Gray,
    /// Three sine bands at 1x, 3x and 5x frequency.
    Color,
}

#[inline]
fn wave(v: f32) -> u8 {
    (((v.sin() + 1.0) * 0.5) * 255.0).round().clamp(0.0, 255.0) as u8
}

#[inline]
fn shade(v: f32, palette: Palette) -> [u8; 4] {
    match palette {
        Palette::Gray => {
            let g = wave(v);
            [g, g, g, 255]
        }
        Palette::Color => [wave(v), wave(v * 3.0), wave(v * 5.0), 255],
    }
}

/// Render a scalar field. Values are periodic under both palettes, so
/// unbounded fields still map to a visible color.
pub fn render_field(field: &Grid<f32>, palette: Palette) -> Vec<u8> {
    let w = field.w();
    let mut rgba = vec![0u8; field.len() * 4];

    rgba.par_chunks_mut(w * 4)
        .zip(field.data().par_chunks(w))
        .for_each(|(out, row)| {
            for (px, &v) in out.chunks_exact_mut(4).zip(row) {
                px.copy_from_slice(&shade(v, palette));
            }
        });

    rgba
}

/// Render a field already bounded to [0, 1] as linear gray.
pub fn render_unit(field: &Grid<f32>) -> Vec<u8> {
    let w = field.w();
    let mut rgba = vec![0u8; field.len() * 4];

    rgba.par_chunks_mut(w * 4)
        .zip(field.data().par_chunks(w))
        .for_each(|(out, row)| {
            for (px, &v) in out.chunks_exact_mut(4).zip(row) {
                let g = (v * 255.0).round().clamp(0.0, 255.0) as u8;
                px.copy_from_slice(&[g, g, g, 255]);
            }
        });

    rgba
}

pub fn render_cells(field: &Grid<bool>) -> Vec<u8> {
    let w = field.w();
    let mut rgba = vec![0u8; field.len() * 4];

    rgba.par_chunks_mut(w * 4)
        .zip(field.data().par_chunks(w))
        .for_each(|(out, row)| {
            for (px, &alive) in out.chunks_exact_mut(4).zip(row) {
                px.copy_from_slice(if alive { &ALIVE } else { &DEAD });
            }
        });

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn gray_follows_sine() {
        let g = Grid::from_vec(3, 1, vec![FRAC_PI_2, 0.0, -FRAC_PI_2]).unwrap();
        let rgba = render_field(&g, Palette::Gray);
        assert_eq!(&rgba[0..4], &[255, 255, 255, 255]);
        assert_eq!(&rgba[4..8], &[128, 128, 128, 255]);
        assert_eq!(&rgba[8..12], &[0, 0, 0, 255]);
    }

    #[test]
    fn color_bands_differ() {
        let g = Grid::from_vec(1, 1, vec![FRAC_PI_2]).unwrap();
        let rgba = render_field(&g, Palette::Color);
        // sin(pi/2) = 1, sin(3pi/2) = -1, sin(5pi/2) = 1
        assert_eq!(rgba, vec![255, 0, 255, 255]);
    }

    #[test]
    fn unit_is_linear_and_clamped() {
        let g = Grid::from_vec(2, 2, vec![0.0f32, 1.0, 2.0, -1.0]).unwrap();
        let rgba = render_unit(&g);
        assert_eq!(rgba[0], 0);
        assert_eq!(rgba[4], 255);
        assert_eq!(rgba[8], 255);
        assert_eq!(rgba[12], 0);
    }

    #[test]
    fn cells_are_two_tone() {
        let g = Grid::from_vec(2, 1, vec![true, false]).unwrap();
        let rgba = render_cells(&g);
        assert_eq!(&rgba[0..4], &ALIVE);
        assert_eq!(&rgba[4..8], &DEAD);
    }
}
