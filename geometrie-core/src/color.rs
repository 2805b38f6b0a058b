/// 24-bit RGB colors and their textual forms
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while_m_n},
    combinator::{all_consuming, map, map_res, opt},
    sequence::preceded,
    IResult,
};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An RGB color packed as `0xRRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xffffff);

    pub const fn from_hex(hex: u32) -> Self {
        Self(hex & 0xffffff)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn hex(self) -> u32 {
        self.0
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Blend towards `other`; `t = 0` keeps `self`, `t = 1` yields `other`
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::from_rgb(
            mix(self.r(), other.r()),
            mix(self.g(), other.g()),
            mix(self.b(), other.b()),
        )
    }

    /// Relative luminance in `[0, 1]`
    pub fn luminance(self) -> f32 {
        (0.2126 * self.r() as f32 + 0.7152 * self.g() as f32 + 0.0722 * self.b() as f32) / 255.0
    }

    /// Parse `#rrggbb`, `0xrrggbb`, `rrggbb` or the short `#rgb` form
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        all_consuming(color)(trimmed)
            .map(|(_, color)| color)
            .map_err(|_| Error::InvalidColor(input.to_string()))
    }

    /// CSS notation, e.g. `#352935`
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Color::from_hex(hex)
    }
}

fn color(input: &str) -> IResult<&str, Color> {
    preceded(
        opt(alt((tag("#"), tag_no_case("0x")))),
        alt((long_form, short_form)),
    )(input)
}

fn long_form(input: &str) -> IResult<&str, Color> {
    map(
        map_res(take_while_m_n(6, 6, |c: char| c.is_ascii_hexdigit()), |digits| {
            u32::from_str_radix(digits, 16)
        }),
        Color::from_hex,
    )(input)
}

fn short_form(input: &str) -> IResult<&str, Color> {
    map(
        map_res(take_while_m_n(3, 3, |c: char| c.is_ascii_hexdigit()), |digits| {
            u32::from_str_radix(digits, 16)
        }),
        |short| {
            let expand = |nibble: u32| ((nibble << 4) | nibble) as u8;
            Color::from_rgb(
                expand((short >> 8) & 0xf),
                expand((short >> 4) & 0xf),
                expand(short & 0xf),
            )
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Color::parse("#352935").unwrap(), Color::from_hex(0x352935));
        assert_eq!(Color::parse("0xFF0000").unwrap(), Color::from_hex(0xff0000));
        assert_eq!(Color::parse("00ff00").unwrap(), Color::from_hex(0x00ff00));
        assert_eq!(Color::parse(" #f0a ").unwrap(), Color::from_hex(0xff00aa));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(Color::parse("#12345"), Err(Error::InvalidColor(_))));
        assert!(Color::parse("#1234567").is_err());
        assert!(Color::parse("red").is_err());
        assert!(Color::parse("").is_err());
    }

    #[test]
    fn test_display_is_css() {
        assert_eq!(Color::from_hex(0x352935).to_css(), "#352935");
        assert_eq!(Color::from_hex(0x0000ff).to_string(), "#0000ff");
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::from_hex(0x000000);
        let b = Color::from_hex(0xffffff);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Color::from_hex(0x808080));
    }
}
