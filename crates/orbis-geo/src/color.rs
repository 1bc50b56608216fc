//! Packed `0xRRGGBB` colours to linear floating point.

use glam::{Vec3, Vec4};

fn srgb_channel_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear RGB for an sRGB-encoded `0xRRGGBB` value.
pub fn hex_to_linear(rgb: u32) -> Vec3 {
    let [_, r, g, b] = rgb.to_be_bytes();
    Vec3::new(
        srgb_channel_to_linear(r as f32 / 255.0),
        srgb_channel_to_linear(g as f32 / 255.0),
        srgb_channel_to_linear(b as f32 / 255.0),
    )
}

/// Linear RGBA with straight `alpha`.
pub fn hex_rgba(rgb: u32, alpha: f32) -> Vec4 {
    hex_to_linear(rgb).extend(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primaries_and_extremes() {
        assert_eq!(hex_to_linear(0x000000), Vec3::ZERO);
        assert!((hex_to_linear(0xffffff) - Vec3::ONE).length() < 1e-6);
        assert!((hex_to_linear(0xff0000) - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_midtone_is_darker_in_linear() {
        let mid = hex_to_linear(0x808080);
        assert!((mid.x - 0.2158).abs() < 1e-3, "got {}", mid.x);
    }

    #[test]
    fn test_alpha_passes_through() {
        assert_eq!(hex_rgba(0x00f0ff, 0.4).w, 0.4);
    }
}
