//! CIE colour coordinates.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Colour coordinates in the bridge's CIE 1931-like colour space.
///
/// Serialized as a two element array, `[x, y]`, each in 0.0-1.0.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Xy {
    x: f32,
    y: f32,
}

impl Xy {
    /// Returns None if either coordinate is outside 0.0-1.0.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::Xy;
    ///
    /// assert!(Xy::create(0.3227, 0.329).is_some());
    /// assert!(Xy::create(1.2, 0.3).is_none());
    /// ```
    pub fn create(x: f32, y: f32) -> Option<Self> {
        let valid = |v: f32| (0.0..=1.0).contains(&v);
        (valid(x) && valid(y)).then_some(Xy { x, y })
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }
}

impl From<[f32; 2]> for Xy {
    fn from([x, y]: [f32; 2]) -> Self {
        Xy { x, y }
    }
}

impl From<Xy> for [f32; 2] {
    fn from(xy: Xy) -> Self {
        [xy.x, xy.y]
    }
}

impl FromStr for Xy {
    type Err = String;

    /// Parse from comma-separated string (e.g., "0.32,0.33").
    fn from_str(s: &str) -> Result<Self, String> {
        let parts: Vec<f32> = s
            .split(',')
            .map(|c| c.trim().parse::<f32>().map_err(|e| e.to_string()))
            .collect::<Result<_, _>>()?;
        match parts.as_slice() {
            [x, y] => Xy::create(*x, *y).ok_or_else(|| "coordinates must be in 0.0-1.0".into()),
            _ => Err("Expected format: x,y".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xy_serializes_as_array() {
        let xy = Xy::create(0.5, 0.25).unwrap();
        assert_eq!(serde_json::to_string(&xy).unwrap(), "[0.5,0.25]");
        let back: Xy = serde_json::from_str("[0.5,0.25]").unwrap();
        assert_eq!(back, xy);
    }

    #[test]
    fn test_xy_from_str() {
        assert_eq!(Xy::from_str("0.5, 0.25").unwrap(), Xy::create(0.5, 0.25).unwrap());
        assert!(Xy::from_str("0.5").is_err());
        assert!(Xy::from_str("a,b").is_err());
        assert!(Xy::from_str("2,0").is_err());
    }
}
