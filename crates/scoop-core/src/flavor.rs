use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Untyped key-value record as delivered by the remote source.
pub type RawRecord = BTreeMap<String, String>;

/// Record keys understood by [`Flavor::from_record`].
pub const NAME_KEY: &str = "name";
pub const TOP_COLOR_KEY: &str = "topColor";
pub const BOTTOM_COLOR_KEY: &str = "bottomColor";

/// An sRGB color parsed from a six digit hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid hex color {0:?}")]
pub struct ColorError(pub String);

impl FromStr for Rgb {
    type Err = ColorError;

    /// Accepts `RRGGBB` or `#RRGGBB`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorError(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Why a raw record could not become a [`Flavor`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRecord {
    #[error("missing or blank \"name\"")]
    MissingName,
    #[error("bad {field}: {source}")]
    BadColor {
        field: &'static str,
        #[source]
        source: ColorError,
    },
}

/// A display-ready flavor. Only ever built from a complete, valid record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flavor {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bottom_color: Option<Rgb>,
}

impl Flavor {
    /// A flavor with no color attributes.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            top_color: None,
            bottom_color: None,
        }
    }

    pub fn with_colors(mut self, top: Rgb, bottom: Rgb) -> Self {
        self.top_color = Some(top);
        self.bottom_color = Some(bottom);
        self
    }

    /// Build a flavor from a raw record.
    ///
    /// `name` is required and must not be blank. `topColor` and
    /// `bottomColor` are optional, but when present they must parse as hex
    /// colors; a malformed color invalidates the whole record.
    pub fn from_record(record: &RawRecord) -> Result<Self, InvalidRecord> {
        let name = record
            .get(NAME_KEY)
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .ok_or(InvalidRecord::MissingName)?;

        let color = |field: &'static str| -> Result<Option<Rgb>, InvalidRecord> {
            record
                .get(field)
                .map(|v| v.parse::<Rgb>())
                .transpose()
                .map_err(|source| InvalidRecord::BadColor { field, source })
        };

        Ok(Self {
            name: name.to_string(),
            top_color: color(TOP_COLOR_KEY)?,
            bottom_color: color(BOTTOM_COLOR_KEY)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn top_color(&self) -> Option<Rgb> {
        self.top_color
    }

    pub fn bottom_color(&self) -> Option<Rgb> {
        self.bottom_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn rgb_parses_with_and_without_hash() {
        assert_eq!("F7F2E1".parse::<Rgb>().unwrap(), Rgb::new(0xF7, 0xF2, 0xE1));
        assert_eq!("#5d3a1a".parse::<Rgb>().unwrap(), Rgb::new(0x5D, 0x3A, 0x1A));
    }

    #[test]
    fn rgb_rejects_wrong_length_and_non_hex() {
        assert!("FFF".parse::<Rgb>().is_err());
        assert!("GG0000".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("brown".parse::<Rgb>().is_err());
    }

    #[test]
    fn rgb_displays_as_uppercase_hex() {
        assert_eq!(Rgb::new(0x0a, 0xbc, 0x01).to_string(), "#0ABC01");
    }

    #[test]
    fn name_only_record_is_valid() {
        let flavor = Flavor::from_record(&record(&[("name", "Vanilla")])).unwrap();
        assert_eq!(flavor, Flavor::named("Vanilla"));
    }

    #[test]
    fn full_record_carries_colors() {
        let flavor = Flavor::from_record(&record(&[
            ("name", "Chocolate"),
            ("topColor", "5D3A1A"),
            ("bottomColor", "#3B2412"),
        ]))
        .unwrap();
        assert_eq!(flavor.top_color(), Some(Rgb::new(0x5D, 0x3A, 0x1A)));
        assert_eq!(flavor.bottom_color(), Some(Rgb::new(0x3B, 0x24, 0x12)));
    }

    #[test]
    fn missing_or_blank_name_is_rejected() {
        assert_eq!(
            Flavor::from_record(&record(&[("color", "brown")])),
            Err(InvalidRecord::MissingName)
        );
        assert_eq!(
            Flavor::from_record(&record(&[("name", "   ")])),
            Err(InvalidRecord::MissingName)
        );
    }

    #[test]
    fn malformed_color_is_rejected() {
        let err = Flavor::from_record(&record(&[("name", "Mint"), ("topColor", "green")]))
            .unwrap_err();
        assert!(matches!(
            err,
            InvalidRecord::BadColor {
                field: TOP_COLOR_KEY,
                ..
            }
        ));
    }

    #[test]
    fn serializes_colors_as_hex_strings() {
        let flavor = Flavor::named("Mint").with_colors(Rgb::new(0xC8, 0xF5, 0xD2), Rgb::new(0, 0, 0));
        let json = serde_json::to_value(&flavor).unwrap();
        assert_eq!(json["name"], "Mint");
        assert_eq!(json["topColor"], "#C8F5D2");
        assert_eq!(json["bottomColor"], "#000000");
    }
}
