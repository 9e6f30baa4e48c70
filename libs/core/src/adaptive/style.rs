//! Closed enumerations for the styling attributes defined by the Adaptive Card schema.
//!
//! Parsing is case-insensitive so payloads written as `"Bolder"` or `"bolder"` both load,
//! while serialization always emits the schema's canonical spelling.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CardError;

macro_rules! style_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CardError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let needle = value.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| {
                        let expected = $name::ALL
                            .iter()
                            .map(|candidate| candidate.as_str())
                            .collect::<Vec<_>>()
                            .join(", ");
                        CardError::invalid(format!(
                            "unsupported {} '{}' (expected one of: {})",
                            $label, value, expected
                        ))
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }
    };
}

style_enum! {
    /// Semantic text colors. Hosts map these onto their own palette.
    Color, "color" {
        Default => "default",
        Accent => "accent",
        Good => "good",
        Warning => "warning",
        Attention => "attention",
    }
}

style_enum! {
    FontSize, "font size" {
        Default => "default",
        Small => "small",
        Medium => "medium",
        Large => "large",
        ExtraLarge => "extraLarge",
    }
}

style_enum! {
    FontWeight, "font weight" {
        Default => "default",
        Lighter => "lighter",
        Bolder => "bolder",
    }
}

style_enum! {
    FontType, "font type" {
        Default => "default",
        Monospace => "monospace",
    }
}

style_enum! {
    ImageSize, "image size" {
        Auto => "auto",
        Stretch => "stretch",
        Small => "small",
        Medium => "medium",
        Large => "large",
    }
}

style_enum! {
    ImageStyle, "image style" {
        Default => "default",
        Person => "person",
    }
}

style_enum! {
    Spacing, "spacing" {
        None => "none",
        Small => "small",
        Default => "default",
        Medium => "medium",
        Large => "large",
        ExtraLarge => "extraLarge",
        Padding => "padding",
    }
}

style_enum! {
    ContainerStyle, "container style" {
        Default => "default",
        Emphasis => "emphasis",
        Good => "good",
        Attention => "attention",
        Warning => "warning",
        Accent => "accent",
    }
}

style_enum! {
    ActionStyle, "action style" {
        Default => "default",
        Positive => "positive",
        Destructive => "destructive",
    }
}

style_enum! {
    ChoiceInputStyle, "choice input style" {
        Compact => "compact",
        Expanded => "expanded",
    }
}

style_enum! {
    VerticalAlignment, "vertical alignment" {
        Top => "top",
        Center => "center",
        Bottom => "bottom",
    }
}

/// Width of a column inside a `ColumnSet`.
///
/// Weights are relative proportions, not pixels; `Pixels` is the schema's explicit
/// `"<n>px"` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnWidth {
    Auto,
    Stretch,
    Weight(u32),
    Pixels(u32),
}

impl ColumnWidth {
    /// Builds a proportional width; negative weights are rejected.
    pub fn weight(value: i64) -> Result<Self, CardError> {
        u32::try_from(value)
            .map(ColumnWidth::Weight)
            .map_err(|_| {
                CardError::invalid(format!("column width must not be negative, got {value}"))
            })
    }
}

impl From<u32> for ColumnWidth {
    fn from(value: u32) -> Self {
        ColumnWidth::Weight(value)
    }
}

impl fmt::Display for ColumnWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnWidth::Auto => f.write_str("auto"),
            ColumnWidth::Stretch => f.write_str("stretch"),
            ColumnWidth::Weight(weight) => write!(f, "{weight}"),
            ColumnWidth::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

impl FromStr for ColumnWidth {
    type Err = CardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(ColumnWidth::Auto);
        }
        if trimmed.eq_ignore_ascii_case("stretch") {
            return Ok(ColumnWidth::Stretch);
        }
        if let Some(px) = trimmed.strip_suffix("px") {
            return px
                .trim()
                .parse::<u32>()
                .map(ColumnWidth::Pixels)
                .map_err(|_| CardError::invalid(format!("invalid pixel column width '{value}'")));
        }
        match trimmed.parse::<i64>() {
            Ok(weight) => ColumnWidth::weight(weight),
            Err(_) => Err(CardError::invalid(format!(
                "invalid column width '{value}' (expected auto, stretch, a weight or <n>px)"
            ))),
        }
    }
}

impl Serialize for ColumnWidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnWidth::Weight(weight) => serializer.serialize_u32(*weight),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnWidth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawWidth {
            Number(i64),
            Text(String),
        }

        match RawWidth::deserialize(deserializer)? {
            RawWidth::Number(weight) => ColumnWidth::weight(weight).map_err(de::Error::custom),
            RawWidth::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}
