/// RGBA color used for flat-shaded display groups.
use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color. Alpha defaults to fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// RGB channels normalised to the 0-1 range used in the manifest.
    pub fn to_decimal_rgb(&self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }

    /// Alpha channel normalised to 0-1, used as the actor opacity.
    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }
}

impl Default for Color {
    /// The flat grey used when a group has no override color and no data.
    fn default() -> Self {
        Self::new(204, 204, 204, 255)
    }
}
