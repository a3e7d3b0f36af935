//! Colour temperature in mireds and Kelvin.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Colour temperature in mireds (micro reciprocal degrees).
///
/// The bridge accepts 154 (coolest) to 500 (warmest). Values outside that
/// range are kept and sent as given; the device decides what to do with them.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(transparent)]
pub struct Mired {
    pub(crate) value: u16,
}

impl Mired {
    pub const COOLEST: u16 = 154;
    pub const WARMEST: u16 = 500;

    /// Wrap a mired value, warning when it is outside 154-500.
    pub fn new(value: u16) -> Self {
        if value < Self::COOLEST {
            warn!("{} mireds is coolest allowed color temp", Self::COOLEST);
        } else if value > Self::WARMEST {
            warn!("{} mireds is warmest allowed color temp", Self::WARMEST);
        }
        Mired { value }
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    /// The equivalent temperature in Kelvin, `round(1e6 / mired)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::Mired;
    ///
    /// assert_eq!(Mired::new(370).to_kelvin(), 2703);
    /// assert_eq!(Mired::new(0).to_kelvin(), 0);
    /// ```
    pub fn to_kelvin(&self) -> u32 {
        if self.value == 0 {
            return 0;
        }
        (1e6 / self.value as f64).round() as u32
    }
}

/// Colour temperature in Kelvin, limited to 2000K-6500K.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Kelvin {
    pub(crate) kelvin: u32,
}

impl Kelvin {
    pub const MIN: u32 = 2000;
    pub const MAX: u32 = 6500;

    /// Clamp to 2000-6500, warning when the value had to be changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::Kelvin;
    ///
    /// assert_eq!(Kelvin::clamped(1500).kelvin(), 2000);
    /// assert_eq!(Kelvin::clamped(2700).kelvin(), 2700);
    /// assert_eq!(Kelvin::clamped(9000).kelvin(), 6500);
    /// ```
    pub fn clamped(kelvin: u32) -> Self {
        let kelvin = if kelvin > Self::MAX {
            warn!("{} K is max allowed color temp", Self::MAX);
            Self::MAX
        } else if kelvin < Self::MIN {
            warn!("{} K is min allowed color temp", Self::MIN);
            Self::MIN
        } else {
            kelvin
        };
        Kelvin { kelvin }
    }

    /// Returns None if value is outside the valid range (2000-6500).
    pub fn create(kelvin: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&kelvin)
            .then_some(Kelvin { kelvin })
    }

    pub fn kelvin(&self) -> u32 {
        self.kelvin
    }

    /// The equivalent mired value, `round(1e6 / kelvin)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::Kelvin;
    ///
    /// assert_eq!(Kelvin::clamped(2000).to_mired().value(), 500);
    /// assert_eq!(Kelvin::clamped(6500).to_mired().value(), 154);
    /// ```
    pub fn to_mired(&self) -> Mired {
        let mireds = (1e6 / self.kelvin as f64).round() as u16;
        debug!("{} K is {} mireds", self.kelvin, mireds);
        Mired::new(mireds)
    }
}

impl From<Kelvin> for Mired {
    fn from(kelvin: Kelvin) -> Self {
        kelvin.to_mired()
    }
}
