//! Color values used by the palette builder.
//!
//! A [`Color`] is an immutable 8-bit sRGB color with an 8-bit alpha channel.
//! Every operation returns a new value whose channels are already quantized,
//! so `Color::parse(&c.to_hex())` and `Color::parse(&c.to_css())` give back
//! exactly `c` for any color this module produces.
//!
//! Lightness steps (`brighten`/`darken`) and perceptual mixing happen in CIE
//! Lab; lightness get/set happens in HSL. Conversions go through `palette`.

use std::fmt;
use std::str::FromStr;

use palette::{FromColor, Hsl, Lab, Srgb};

use crate::error::{Error, Result};

/// Lab lightness change for one unit of `brighten`/`darken`.
const LAB_LIGHTNESS_STEP: f32 = 18.0;

/// Named colors accepted by [`Color::parse`].
const NAMED_COLORS: &[(&str, (u8, u8, u8, u8))] = &[
    ("white", (255, 255, 255, 255)),
    ("black", (0, 0, 0, 255)),
    ("transparent", (0, 0, 0, 0)),
    ("slategray", (112, 128, 144, 255)),
    ("slategrey", (112, 128, 144, 255)),
    ("lightgray", (211, 211, 211, 255)),
    ("lightgrey", (211, 211, 211, 255)),
];

/// Color space used when mixing two colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Straight interpolation of the 8-bit sRGB channels.
    Rgb,
    /// Interpolation in CIE Lab (perceptual).
    #[default]
    Lab,
}

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// Calculate relative luminance per WCAG formula (0.0 = black, 1.0 = white).
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    fn channel(c: u8) -> f64 {
        let c_srgb = c as f64 / 255.0;
        if c_srgb <= 0.03928 {
            c_srgb / 12.92
        } else {
            ((c_srgb + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

/// Quantize a unit-range float to a byte. NaN maps to 0.
fn unit_to_byte(value: f32) -> u8 {
    if value.is_finite() {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        0
    }
}

fn alpha_to_byte(alpha: f64) -> u8 {
    if alpha.is_finite() {
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    }
}

fn lerp(from: f32, to: f32, ratio: f32) -> f32 {
    from + (to - from) * ratio
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Opaque color from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from 8-bit channels and a 0.0-1.0 alpha (clamped).
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: alpha_to_byte(alpha),
        }
    }

    /// Parse a CSS color string.
    ///
    /// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(...)`,
    /// `rgba(...)` (comma or space separated, optional `/ alpha`) and a few
    /// named colors. Surrounding whitespace and case are ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();

        let parsed = if let Some(hex) = lower.strip_prefix('#') {
            parse_hex(hex)
        } else if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            args.strip_suffix(')').and_then(parse_rgb_args)
        } else {
            NAMED_COLORS
                .iter()
                .find(|(name, _)| *name == lower)
                .map(|&(_, (r, g, b, a))| Color { r, g, b, a })
        };

        parsed.ok_or_else(|| Error::InvalidColor(trimmed.to_string()))
    }

    pub fn red(&self) -> u8 {
        self.r
    }

    pub fn green(&self) -> u8 {
        self.g
    }

    pub fn blue(&self) -> u8 {
        self.b
    }

    /// Alpha in 0.0-1.0.
    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Same color with a new alpha (clamped to 0.0-1.0).
    pub fn with_alpha(&self, alpha: f64) -> Self {
        Self {
            a: alpha_to_byte(alpha),
            ..*self
        }
    }

    /// WCAG relative luminance in [0, 1]. Alpha is ignored.
    pub fn luminance(&self) -> f64 {
        relative_luminance(self.r, self.g, self.b)
    }

    /// HSL lightness in [0, 1].
    pub fn lightness(&self) -> f64 {
        let hsl: Hsl = Hsl::from_color(self.to_srgb());
        hsl.lightness as f64
    }

    /// Same hue and saturation with a new HSL lightness (clamped to 0.0-1.0).
    pub fn set_lightness(&self, lightness: f64) -> Self {
        let mut hsl: Hsl = Hsl::from_color(self.to_srgb());
        let lightness = if lightness.is_finite() {
            lightness.clamp(0.0, 1.0) as f32
        } else {
            hsl.lightness
        };
        hsl.lightness = lightness;
        Self::from_srgb(Srgb::from_color(hsl), self.a)
    }

    /// Raise Lab lightness by `amount` steps of 18.
    pub fn brighten(&self, amount: f64) -> Self {
        if !amount.is_finite() {
            return *self;
        }
        let mut lab = self.to_lab();
        lab.l = (lab.l + LAB_LIGHTNESS_STEP * amount as f32).clamp(0.0, 100.0);
        Self::from_lab(lab, self.a)
    }

    /// Lower Lab lightness by `amount` steps of 18.
    pub fn darken(&self, amount: f64) -> Self {
        self.brighten(-amount)
    }

    /// Interpolate toward `other` by `ratio` (0.0 = self, 1.0 = other).
    ///
    /// Alpha is interpolated linearly in every space.
    pub fn mix(&self, other: &Color, ratio: f64, space: ColorSpace) -> Self {
        let ratio = if ratio.is_finite() {
            ratio.clamp(0.0, 1.0) as f32
        } else {
            0.0
        };
        let alpha = lerp(self.a as f32, other.a as f32, ratio).round() as u8;

        match space {
            ColorSpace::Rgb => Self {
                r: lerp(self.r as f32, other.r as f32, ratio).round() as u8,
                g: lerp(self.g as f32, other.g as f32, ratio).round() as u8,
                b: lerp(self.b as f32, other.b as f32, ratio).round() as u8,
                a: alpha,
            },
            ColorSpace::Lab => {
                let from = self.to_lab();
                let to = other.to_lab();
                let mixed: Lab = Lab::new(
                    lerp(from.l, to.l, ratio),
                    lerp(from.a, to.a, ratio),
                    lerp(from.b, to.b, ratio),
                );
                Self::from_lab(mixed, alpha)
            }
        }
    }

    /// CIE76 color difference (Euclidean distance in Lab). Alpha is ignored.
    pub fn delta_e(&self, other: &Color) -> f64 {
        let a = self.to_lab();
        let b = other.to_lab();
        let dl = (a.l - b.l) as f64;
        let da = (a.a - b.a) as f64;
        let db = (a.b - b.b) as f64;
        (dl * dl + da * da + db * db).sqrt()
    }

    /// `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// `rgb(r, g, b)` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.is_opaque() {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            // Three decimals are enough to recover the alpha byte exactly.
            let alpha = (self.alpha() * 1000.0).round() / 1000.0;
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }

    fn to_srgb(self) -> Srgb {
        Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    fn to_lab(self) -> Lab {
        Lab::from_color(self.to_srgb())
    }

    fn from_srgb(rgb: Srgb, alpha: u8) -> Self {
        Self {
            r: unit_to_byte(rgb.red),
            g: unit_to_byte(rgb.green),
            b: unit_to_byte(rgb.blue),
            a: alpha,
        }
    }

    fn from_lab(lab: Lab, alpha: u8) -> Self {
        Self::from_srgb(Srgb::from_color(lab), alpha)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    // Expand shorthand (e.g., "fff" -> "ffffff")
    let expanded = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };

    let byte = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let a = if expanded.len() == 8 { byte(6)? } else { 255 };

    Some(Color {
        r: byte(0)?,
        g: byte(2)?,
        b: byte(4)?,
        a,
    })
}

/// Parse the inside of `rgb(...)`/`rgba(...)`.
fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let value = match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? / 100.0 * 255.0,
            None => s.parse::<f64>().ok()?,
        };
        value.is_finite().then(|| value.clamp(0.0, 255.0).round() as u8)
    };

    let alpha = match parts.get(3) {
        Some(s) => {
            let value = match s.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => s.parse::<f64>().ok()?,
            };
            if !value.is_finite() {
                return None;
            }
            alpha_to_byte(value)
        }
        None => 255,
    };

    Some(Color {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> Color {
        Color::parse(s).unwrap()
    }

    #[test]
    fn test_parse_hex_valid() {
        assert_eq!(c("#ff0000"), Color::rgb(255, 0, 0));
        assert_eq!(c("#00FF00"), Color::rgb(0, 255, 0));
        assert_eq!(c("#fff"), Color::WHITE);
        assert_eq!(c("  #000  "), Color::BLACK);
        assert_eq!(c("#ffffff80").alpha(), 128.0 / 255.0);
        assert_eq!(c("#f008"), Color::rgba(255, 0, 0, 136.0 / 255.0));
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert!(Color::parse("not-a-color").is_err());
        assert!(Color::parse("#gggggg").is_err());
        assert!(Color::parse("#ff").is_err());
        assert!(Color::parse("#fffff").is_err());
        assert!(Color::parse("").is_err());
        assert!(Color::parse("ffffff").is_err());
    }

    #[test]
    fn test_parse_rgb_functions() {
        assert_eq!(c("rgb(1, 2, 3)"), Color::rgb(1, 2, 3));
        assert_eq!(c("rgba(175,184,193,0.2)"), Color::rgba(175, 184, 193, 0.2));
        assert_eq!(c("rgb(10 20 30 / 50%)"), Color::rgba(10, 20, 30, 0.5));
        assert_eq!(c("rgb(100%, 0%, 0%)"), Color::rgb(255, 0, 0));
        assert_eq!(c("rgb(300, -4, 0)"), Color::rgb(255, 0, 0));
        assert!(Color::parse("rgb(1, 2)").is_err());
        assert!(Color::parse("rgb(1, 2, x)").is_err());
        assert!(Color::parse("rgba(1, 2, 3, 0.5").is_err());
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(c("White"), Color::WHITE);
        assert_eq!(c("slategray"), Color::rgb(112, 128, 144));
        assert_eq!(c("transparent").alpha(), 0.0);
        assert!(Color::parse("chartreuse").is_err());
    }

    #[test]
    fn test_invalid_color_error_keeps_input() {
        match Color::parse(" nope ") {
            Err(Error::InvalidColor(input)) => assert_eq!(input, "nope"),
            other => panic!("expected InvalidColor, got {:?}", other),
        }
    }

    #[test]
    fn test_to_hex_and_css() {
        assert_eq!(Color::rgb(30, 30, 30).to_hex(), "#1e1e1e");
        assert_eq!(Color::WHITE.with_alpha(0.4).to_hex(), "#ffffff66");
        assert_eq!(Color::rgb(1, 2, 3).to_css(), "rgb(1, 2, 3)");
        assert_eq!(Color::BLACK.with_alpha(0.4).to_css(), "rgba(0, 0, 0, 0.4)");
        assert_eq!(Color::rgb(18, 52, 86).to_string(), "#123456");
    }

    #[test]
    fn test_css_round_trip_recovers_alpha_byte() {
        for a in 0..=255u8 {
            let color = Color::rgba(12, 34, 56, a as f64 / 255.0);
            assert_eq!(Color::parse(&color.to_css()).unwrap(), color);
            assert_eq!(Color::parse(&color.to_hex()).unwrap(), color);
        }
    }

    #[test]
    fn test_relative_luminance() {
        // Black should be 0
        assert!((relative_luminance(0, 0, 0) - 0.0).abs() < 0.001);
        // White should be 1
        assert!((relative_luminance(255, 255, 255) - 1.0).abs() < 0.001);
        assert!((c("#1e1e1e").luminance() - 0.0130).abs() < 0.001);
    }

    #[test]
    fn test_brighten_and_darken_move_luminance() {
        let base = c("#1e1e1e");
        assert!(base.brighten(1.0).luminance() > base.luminance());
        assert!(base.darken(0.5).luminance() < base.luminance());
        assert_eq!(Color::WHITE.brighten(3.0), Color::WHITE);
        assert_eq!(Color::BLACK.darken(3.0), Color::BLACK);
        assert_eq!(base.brighten(f64::NAN), base);
    }

    #[test]
    fn test_brighten_keeps_alpha() {
        let base = c("#33669980");
        assert_eq!(base.brighten(0.5).alpha(), base.alpha());
    }

    #[test]
    fn test_lightness_get_set() {
        assert!((c("#808080").lightness() - 0.502).abs() < 0.01);
        assert_eq!(c("#ff0000").set_lightness(1.0), Color::WHITE);
        assert_eq!(c("#ff0000").set_lightness(0.0), Color::BLACK);
        assert_eq!(c("#ff0000").set_lightness(7.0), Color::WHITE);
        let darker = c("#ff0000").set_lightness(0.25);
        assert!((127..=128).contains(&darker.red()));
        assert_eq!((darker.green(), darker.blue()), (0, 0));
    }

    #[test]
    fn test_mix_endpoints() {
        let a = c("#1e1e1e");
        let b = Color::WHITE;
        assert_eq!(a.mix(&b, 0.0, ColorSpace::Lab), a);
        assert_eq!(a.mix(&b, 1.0, ColorSpace::Lab), b);
        assert_eq!(a.mix(&b, 0.0, ColorSpace::Rgb), a);
        assert_eq!(
            Color::BLACK.mix(&Color::WHITE, 0.5, ColorSpace::Rgb),
            Color::rgb(128, 128, 128)
        );
    }

    #[test]
    fn test_mix_lab_moves_toward_overlay() {
        let base = c("#1e1e1e");
        let mixed = base.mix(&Color::WHITE, 0.3, ColorSpace::Lab);
        assert!(mixed.luminance() > base.luminance());
        assert!(mixed.luminance() < 1.0);
    }

    #[test]
    fn test_mix_interpolates_alpha() {
        let mixed = Color::BLACK
            .with_alpha(0.0)
            .mix(&Color::BLACK, 0.5, ColorSpace::Rgb);
        assert_eq!(mixed.alpha(), 128.0 / 255.0);
    }

    #[test]
    fn test_with_alpha_clamps() {
        assert_eq!(Color::WHITE.with_alpha(2.0).alpha(), 1.0);
        assert_eq!(Color::WHITE.with_alpha(-1.0).alpha(), 0.0);
    }

    #[test]
    fn test_delta_e() {
        assert_eq!(c("#123456").delta_e(&c("#123456")), 0.0);
        assert!(Color::BLACK.delta_e(&Color::WHITE) > 99.0);
    }
}
