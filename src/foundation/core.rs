use crate::foundation::error::{ReviewError, ReviewResult};

pub use kurbo::{BezPath, Circle, Line, Point, Rect, Vec2};

/// Clamp a playback time into `[0, duration]`. Non-finite input maps to `0`.
pub fn clamp_time(t: f64, duration: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    t.clamp(0.0, duration.max(0.0))
}

/// Pixel dimensions of the drawing surface the overlays are rendered onto.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl SurfaceSize {
    /// Surface of `width` x `height` pixels.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A detached or hidden surface reports a zero (or non-finite) size.
    pub fn is_available(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Center of the surface in pixel space.
    pub fn center(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    /// Reference length for normalized radii.
    pub fn min_side(self) -> f64 {
        self.width.min(self.height)
    }
}

/// A position expressed as a fraction of frame width/height, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormPoint {
    /// Horizontal fraction, left edge is `0`.
    pub x: f64,
    /// Vertical fraction, top edge is `0`.
    pub y: f64,
}

impl NormPoint {
    /// Validated constructor; rejects coordinates outside `[0, 1]`.
    pub fn new(x: f64, y: f64) -> ReviewResult<Self> {
        let p = Self { x, y };
        if !p.is_valid() {
            return Err(ReviewError::validation(format!(
                "normalized point ({x}, {y}) must lie in [0,1]x[0,1]"
            )));
        }
        Ok(p)
    }

    /// Clamp each coordinate into `[0, 1]`. NaN maps to `0`.
    pub fn clamped(x: f64, y: f64) -> Self {
        fn unit(v: f64) -> f64 {
            if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
        }
        Self {
            x: unit(x),
            y: unit(y),
        }
    }

    /// Both coordinates lie in `[0, 1]`.
    pub fn is_valid(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Straight (non-premultiplied) RGBA8 stroke color.
///
/// On the wire a color is either a hex string (`#RRGGBB` / `#RRGGBBAA`) or an
/// array of 3-4 bytes. It always serializes back as a hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha; `255` is opaque.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Default stroke color for new overlays.
    pub const YELLOW: Self = Self::opaque(255, 214, 0);

    /// Color with full alpha.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`; the leading `#` is optional.
    pub fn parse_hex(s: &str) -> ReviewResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> ReviewResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| ReviewError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(ReviewError::validation("hex color must be ASCII"));
        }
        match s.len() {
            6 => Ok(Self::opaque(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
                a: hex_byte(&s[6..8])?,
            }),
            _ => Err(ReviewError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    /// Lowercase hex; alpha is omitted when opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::YELLOW
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::opaque(*r, *g, *b)),
                [r, g, b, a] => Ok(Self {
                    r: *r,
                    g: *g,
                    b: *b,
                    a: *a,
                }),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
