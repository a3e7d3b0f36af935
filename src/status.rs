//! Last known state of a light or group, as seen by one handle.

use serde::{Deserialize, Serialize};

use crate::payload::Payload;
use crate::types::{Alert, Brightness, ColorMode, Effect, Mired, Saturation, Xy};

/// Values last read from or written to the bridge through a handle.
///
/// Nothing here is refreshed behind the caller's back; every getter on
/// [`crate::Light`] reads the bridge and stores the result, every setter stores
/// what it sent.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LightStatus {
    pub(crate) name: Option<String>,
    pub(crate) on: Option<bool>,
    pub(crate) brightness: Option<Brightness>,
    pub(crate) colormode: Option<ColorMode>,
    pub(crate) hue: Option<u16>,
    pub(crate) saturation: Option<Saturation>,
    pub(crate) xy: Option<Xy>,
    pub(crate) colortemp: Option<Mired>,
    pub(crate) effect: Option<Effect>,
    pub(crate) alert: Option<Alert>,
    pub(crate) reachable: Option<bool>,
    pub(crate) light_type: Option<String>,
    /// Set when the lamp was switched off with a transition time; see
    /// [`crate::Light::set_on`].
    #[serde(default)]
    pub(crate) reset_bri_after_on: bool,
}

impl LightStatus {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn on(&self) -> Option<bool> {
        self.on
    }

    pub fn brightness(&self) -> Option<Brightness> {
        self.brightness
    }

    pub fn colormode(&self) -> Option<ColorMode> {
        self.colormode
    }

    pub fn hue(&self) -> Option<u16> {
        self.hue
    }

    pub fn saturation(&self) -> Option<Saturation> {
        self.saturation
    }

    pub fn xy(&self) -> Option<Xy> {
        self.xy
    }

    pub fn colortemp(&self) -> Option<Mired> {
        self.colortemp
    }

    pub fn effect(&self) -> Option<Effect> {
        self.effect
    }

    pub fn alert(&self) -> Option<Alert> {
        self.alert
    }

    pub fn reachable(&self) -> Option<bool> {
        self.reachable
    }

    pub fn light_type(&self) -> Option<&str> {
        self.light_type.as_deref()
    }

    /// Whether the next power on has to restore the brightness.
    pub fn reset_bri_after_on(&self) -> bool {
        self.reset_bri_after_on
    }

    /// Record the values a payload sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::{LightStatus, Payload, Brightness};
    ///
    /// let mut status = LightStatus::default();
    /// let mut payload = Payload::new();
    /// payload.on(true).brightness(Brightness::create(42).unwrap());
    /// status.update_from_payload(&payload);
    ///
    /// assert_eq!(status.on(), Some(true));
    /// assert_eq!(status.brightness().unwrap().value(), 42);
    /// assert!(status.hue().is_none());
    /// ```
    pub fn update_from_payload(&mut self, payload: &Payload) {
        if let Some(on) = payload.on {
            self.on = Some(on);
        }
        if let Some(bri) = payload.bri {
            self.brightness = Brightness::create(bri);
        }
        if let Some(hue) = payload.hue {
            self.hue = Some(hue);
            self.colormode = Some(ColorMode::Hs);
        }
        if let Some(sat) = payload.sat {
            self.saturation = Saturation::create(sat);
            self.colormode = Some(ColorMode::Hs);
        }
        if let Some(xy) = payload.xy {
            self.xy = Some(xy);
            self.colormode = Some(ColorMode::Xy);
        }
        if let Some(ct) = payload.ct {
            self.colortemp = Some(Mired { value: ct });
            self.colormode = Some(ColorMode::Ct);
        }
        if let Some(effect) = payload.effect {
            self.effect = Some(effect);
        }
        if let Some(alert) = payload.alert {
            self.alert = Some(alert);
        }
    }
}
