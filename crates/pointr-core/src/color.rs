use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Golden angle in degrees. Consecutive multiples land as far apart on the
/// hue wheel as any fixed step can.
pub const GOLDEN_ANGLE: f64 = 137.508;

/// RGB color representation
///
/// Serializes as a `#rrggbb` hex string since that's what the map styling
/// layer and the legend both consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn rgb(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Convert HSL to RGB
    ///
    /// `hue` is in degrees `[0, 360)`, `saturation` and `lightness` are
    /// percentages. Out-of-range inputs are clamped rather than rejected.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = if hue.is_finite() { hue.rem_euclid(360.0) } else { 0.0 };
        let s = saturation.clamp(0.0, 100.0) / 100.0;
        let l = lightness.clamp(0.0, 100.0) / 100.0;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = if h < 60.0 {
            (c, x, 0.0)
        } else if h < 120.0 {
            (x, c, 0.0)
        } else if h < 180.0 {
            (0.0, c, x)
        } else if h < 240.0 {
            (0.0, x, c)
        } else if h < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        Self {
            r: to_channel(r + m),
            g: to_channel(g + m),
            b: to_channel(b + m),
        }
    }

    /// `#rrggbb`, lowercase
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| format!("color '{}' must start with '#'", s))?;
        if digits.len() != 6 {
            return Err(format!("color '{}' must have six hex digits", s));
        }
        u32::from_str_radix(digits, 16)
            .map(Color::rgb)
            .map_err(|e| format!("color '{}' is not valid hex: {}", s, e))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Golden-angle color generator with fixed saturation and lightness
///
/// Index `i` gets hue `(i * 137.508) mod 360`. Pure and deterministic: the
/// same index always yields the same color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HuePalette {
    pub saturation: f64,
    pub lightness: f64,
}

impl HuePalette {
    /// Used for business category colors
    pub const CATEGORY: HuePalette = HuePalette {
        saturation: 75.0,
        lightness: 60.0,
    };

    /// Used for per-data-source colors
    pub const SOURCE: HuePalette = HuePalette {
        saturation: 80.0,
        lightness: 58.0,
    };

    pub fn color_for_index(&self, index: u32) -> Color {
        let hue = (f64::from(index) * GOLDEN_ANGLE) % 360.0;
        Color::from_hsl(hue, self.saturation, self.lightness)
    }

    /// First `count` colors of the sequence
    pub fn colors(&self, count: u32) -> Vec<Color> {
        (0..count).map(|i| self.color_for_index(i)).collect()
    }
}
