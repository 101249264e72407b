// Dance Skeleton 🕺 AGPL-3.0 License

use std::fmt;
use std::str::FromStr;

/// Color type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Red color.
    pub const RED: Color = Color(255, 0, 0);
    /// Green color.
    pub const GREEN: Color = Color(0, 255, 0);
    /// Blue color.
    pub const BLUE: Color = Color(0, 0, 255);
    /// Yellow color.
    pub const YELLOW: Color = Color(255, 255, 0);
    /// White color.
    pub const WHITE: Color = Color(255, 255, 255);
    /// Black color.
    pub const BLACK: Color = Color(0, 0, 0);

    /// Create a new color from RGB values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// RGB components as an array.
    #[must_use]
    pub const fn rgb(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

/// User-selectable skeleton overlay color.
///
/// `Default` is green. The Spanish names are accepted aliases, carried over
/// from the app this tool grew out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkeletonColor {
    /// Green (the default).
    #[default]
    Default,
    /// Green, named explicitly.
    Green,
    /// Blue.
    Blue,
    /// Red.
    Red,
    /// Yellow.
    Yellow,
}

impl SkeletonColor {
    /// The RGB color to draw with.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Default | Self::Green => Color::GREEN,
            Self::Blue => Color::BLUE,
            Self::Red => Color::RED,
            Self::Yellow => Color::YELLOW,
        }
    }
}

impl fmt::Display for SkeletonColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Yellow => "yellow",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SkeletonColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "green" | "verde" => Ok(Self::Green),
            "blue" | "azul" => Ok(Self::Blue),
            "red" | "rojo" => Ok(Self::Red),
            "yellow" | "amarillo" => Ok(Self::Yellow),
            _ => Err(format!(
                "unknown skeleton color '{s}', expected one of: default, green, blue, red, yellow"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_color_parse() {
        assert_eq!(
            SkeletonColor::from_str("default").unwrap(),
            SkeletonColor::Default
        );
        assert_eq!(SkeletonColor::from_str("blue").unwrap(), SkeletonColor::Blue);
        assert_eq!(SkeletonColor::from_str("RED").unwrap(), SkeletonColor::Red);
        assert!(SkeletonColor::from_str("magenta").is_err());
    }

    #[test]
    fn test_skeleton_color_aliases() {
        assert_eq!(SkeletonColor::from_str("azul").unwrap(), SkeletonColor::Blue);
        assert_eq!(SkeletonColor::from_str("rojo").unwrap(), SkeletonColor::Red);
        assert_eq!(
            SkeletonColor::from_str("amarillo").unwrap(),
            SkeletonColor::Yellow
        );
        assert_eq!(
            SkeletonColor::from_str("verde").unwrap(),
            SkeletonColor::Green
        );
    }

    #[test]
    fn test_default_is_green() {
        assert_eq!(SkeletonColor::default().color(), Color::GREEN);
        assert_eq!(SkeletonColor::Green.color(), Color::GREEN);
    }
}
