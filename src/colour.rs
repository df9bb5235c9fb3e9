//! Deterministic actor colours.
//!
//! Every actor name maps to a stable colour: the name is hashed, the hash bits pick a point in
//! OKLCH space (so that generated colours have roughly uniform perceived lightness and
//! saturation), and the point is converted to 8-bit sRGB.

use std::f64::consts::PI;

/// Marker bit set on every packed colour that was chosen explicitly, as opposed to "no colour"
/// (packed value `0`), which tells the host to use its default region colour.
pub const EXPLICIT_BIT: u32 = 0x0100_0000;

/// A 24-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Colour {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Colour {
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Converts the colour into the packed `0x01RRGGBB` form used in project files and when
    /// talking to the region store.
    #[must_use]
    pub fn pack(self) -> u32 {
        EXPLICIT_BIT
            | u32::from(self.red) << 16
            | u32::from(self.green) << 8
            | u32::from(self.blue)
    }

    /// Converts a packed colour back into a `Colour`. Returns `None` if the explicit bit is not
    /// set, i.e. if the packed value means "no colour".
    #[must_use]
    pub fn unpack(packed: u32) -> Option<Self> {
        if packed & EXPLICIT_BIT == 0 {
            return None;
        }

        Some(Self {
            red: ((packed & 0x00ff_0000) >> 16) as u8,
            green: ((packed & 0x0000_ff00) >> 8) as u8,
            blue: (packed & 0x0000_00ff) as u8,
        })
    }

    /// Parses `#RRGGBB`. Exactly six hex digits are accepted.
    #[must_use]
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('#')?;
        if digits.len() != 6 || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self {
            red: channel(0..2)?,
            green: channel(2..4)?,
            blue: channel(4..6)?,
        })
    }

    /// Formats the colour as `#RRGGBB` with uppercase digits.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// Packs an optional colour, mapping `None` to `0`.
#[must_use]
pub fn pack_optional(colour: Option<Colour>) -> u32 {
    colour.map_or(0, Colour::pack)
}

/// 32-bit FNV-1a over the UTF-8 bytes of `name`, followed by an avalanche step so that names
/// differing only in their last byte still end up far apart.
fn name_hash(name: &str) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for byte in name.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(16_777_619);
    }

    hash ^= hash >> 16;
    hash = hash.wrapping_mul(0x045d_9f3b);
    hash ^= hash >> 16;
    hash
}

/// Returns the generated colour for the given actor name. Pure and deterministic.
#[must_use]
pub fn colour_for(name: &str) -> Colour {
    let hash = name_hash(name);

    let hue = f64::from(hash & 0x3ff) / 1024.0 * 360.0;
    let chroma = 0.08 + f64::from((hash >> 10) & 0xff) / 255.0 * 0.09;
    let lightness = 0.45 + f64::from((hash >> 18) & 0xff) / 255.0 * 0.20;

    oklch_to_srgb(lightness, chroma, hue)
}

/// Converts an OKLCH colour (hue in degrees) to clamped, gamma-encoded 8-bit sRGB.
#[must_use]
pub fn oklch_to_srgb(lightness: f64, chroma: f64, hue: f64) -> Colour {
    let hue_radians = hue * (PI / 180.0);
    let a = chroma * hue_radians.cos();
    let b = chroma * hue_radians.sin();

    let l_ = lightness + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
    let m_ = lightness - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
    let s_ = lightness - 0.089_484_177_5 * a - 1.291_485_548_0 * b;

    let l = l_ * l_ * l_;
    let m = m_ * m_ * m_;
    let s = s_ * s_ * s_;

    let red = 4.076_741_662_1 * l - 3.307_711_591_3 * m + 0.230_969_929_2 * s;
    let green = -1.268_438_004_6 * l + 2.609_757_401_1 * m - 0.341_319_396_5 * s;
    let blue = -0.004_196_086_3 * l - 0.703_418_614_7 * m + 1.707_614_701_0 * s;

    Colour {
        red: to_8bit(red),
        green: to_8bit(green),
        blue: to_8bit(blue),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_8bit(linear: f64) -> u8 {
    (srgb_gamma(linear.clamp(0.0, 1.0)) * 255.0).round() as u8
}

fn srgb_gamma(linear: f64) -> f64 {
    if linear >= 0.003_130_8 {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * linear
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::prelude::*;

    use super::*;

    #[test]
    fn known_colours() {
        assert_eq!(colour_for("Bob"), Colour::new(67, 142, 87));
        assert_eq!(colour_for("Narrator"), Colour::new(92, 99, 29));
        assert_eq!(colour_for("Alice"), Colour::new(97, 106, 0));
    }

    #[test]
    fn deterministic() {
        for name in ["", "?", "Alice", "Ёжик", "a much longer actor name"] {
            assert_eq!(colour_for(name), colour_for(name));
        }
    }

    #[test]
    fn short_names_do_not_collide() {
        let names = [
            "A", "B", "C", "Alice", "Bob", "Carol", "Dave", "Eve", "Narrator", "Host", "Guest",
        ];
        let mut seen = HashMap::new();
        for name in names {
            if let Some(other) = seen.insert(colour_for(name), name) {
                panic!("{name} and {other} share a colour");
            }
        }
    }

    #[test]
    fn random_names_spread_out() {
        let mut rng = rand_pcg::Pcg64::seed_from_u64(7);
        let mut seen = HashMap::new();
        let mut collisions = 0;
        for i in 0..200 {
            let suffix: u32 = rng.random();
            let name = format!("actor{i}-{suffix}");
            if seen.insert(colour_for(&name), name).is_some() {
                collisions += 1;
            }
        }
        assert!(collisions <= 1, "{collisions} collisions among 200 names");
    }

    #[test]
    fn pack_unpack() {
        let colour = Colour::new(0x12, 0x34, 0x56);
        assert_eq!(colour.pack(), 0x0112_3456);
        assert_eq!(Colour::unpack(0x0112_3456), Some(colour));
        assert_eq!(Colour::unpack(0x0012_3456), None);
        assert_eq!(pack_optional(None), 0);
    }

    #[test]
    fn hex() {
        assert_eq!(Colour::from_hex("#FF8000"), Some(Colour::new(255, 128, 0)));
        assert_eq!(Colour::from_hex("#ff8000"), Some(Colour::new(255, 128, 0)));
        assert_eq!(Colour::from_hex("FF8000"), None);
        assert_eq!(Colour::from_hex("#FF800"), None);
        assert_eq!(Colour::from_hex("#FF80000"), None);
        assert_eq!(Colour::from_hex("#GG8000"), None);
        assert_eq!(Colour::new(255, 128, 0).to_hex(), "#FF8000");
    }
}
