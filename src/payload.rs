//! State change bodies for lights and groups.

use serde::{Deserialize, Serialize};

use crate::types::{Alert, Brightness, Effect, Mired, Saturation, TransitionTime, Xy};

/// A state change to send to a light (`/lights/<id>/state`) or a group
/// (`/groups/<id>/action`).
///
/// Only the attributes that were set are serialized.
///
/// # Creating Payloads
///
/// 1. **From a single attribute** using the [`From`] trait:
///    ```
///    use hue_bridge_rs::{Payload, Alert};
///    let payload = Payload::from(Alert::Select);
///    ```
///
/// 2. **Builder pattern** for combining multiple attributes:
///    ```
///    use hue_bridge_rs::{Payload, Brightness, Mired};
///    let mut payload = Payload::new();
///    payload.on(true);
///    payload.brightness(Brightness::create(200).unwrap());
///    payload.colortemp(Mired::new(370));
///    ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Payload {
    pub(crate) on: Option<bool>,
    pub(crate) bri: Option<u8>,
    pub(crate) hue: Option<u16>,
    pub(crate) sat: Option<u8>,
    pub(crate) xy: Option<Xy>,
    pub(crate) ct: Option<u16>,
    pub(crate) alert: Option<Alert>,
    pub(crate) effect: Option<Effect>,
    pub(crate) transitiontime: Option<u16>,
    pub(crate) bri_inc: Option<i16>,
    pub(crate) sat_inc: Option<i16>,
    pub(crate) hue_inc: Option<i32>,
    pub(crate) ct_inc: Option<i32>,
    pub(crate) scene: Option<String>,
}

impl Payload {
    /// Create a new empty payload.
    ///
    /// At least one attribute besides the transition time must be set for the
    /// payload to be valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::{Payload, TransitionTime};
    ///
    /// let mut payload = Payload::new();
    /// assert!(!payload.is_valid());
    ///
    /// payload.transition_time(TransitionTime::from_deciseconds(10));
    /// assert!(!payload.is_valid());
    ///
    /// payload.on(false);
    /// assert!(payload.is_valid());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.on.is_some()
            || self.bri.is_some()
            || self.hue.is_some()
            || self.sat.is_some()
            || self.xy.is_some()
            || self.ct.is_some()
            || self.alert.is_some()
            || self.effect.is_some()
            || self.bri_inc.is_some()
            || self.sat_inc.is_some()
            || self.hue_inc.is_some()
            || self.ct_inc.is_some()
            || self.scene.is_some()
    }

    pub fn on(&mut self, on: bool) -> &mut Self {
        self.on = Some(on);
        self
    }

    pub fn brightness(&mut self, brightness: Brightness) -> &mut Self {
        self.bri = Some(brightness.value);
        self
    }

    /// Hue angle, 0-65535 wrapping around the colour wheel.
    pub fn hue(&mut self, hue: u16) -> &mut Self {
        self.hue = Some(hue);
        self
    }

    pub fn saturation(&mut self, saturation: Saturation) -> &mut Self {
        self.sat = Some(saturation.value);
        self
    }

    pub fn xy(&mut self, xy: Xy) -> &mut Self {
        self.xy = Some(xy);
        self
    }

    pub fn colortemp(&mut self, ct: Mired) -> &mut Self {
        self.ct = Some(ct.value);
        self
    }

    pub fn alert(&mut self, alert: Alert) -> &mut Self {
        self.alert = Some(alert);
        self
    }

    pub fn effect(&mut self, effect: Effect) -> &mut Self {
        self.effect = Some(effect);
        self
    }

    pub fn transition_time(&mut self, time: TransitionTime) -> &mut Self {
        self.transitiontime = Some(time.deciseconds);
        self
    }

    /// Relative brightness change, -254 to 254.
    pub fn brightness_increment(&mut self, delta: i16) -> &mut Self {
        self.bri_inc = Some(delta.clamp(-254, 254));
        self
    }

    /// Relative saturation change, -254 to 254.
    pub fn saturation_increment(&mut self, delta: i16) -> &mut Self {
        self.sat_inc = Some(delta.clamp(-254, 254));
        self
    }

    /// Relative hue change, -65534 to 65534.
    pub fn hue_increment(&mut self, delta: i32) -> &mut Self {
        self.hue_inc = Some(delta.clamp(-65534, 65534));
        self
    }

    /// Relative colour temperature change in mireds, -65534 to 65534.
    pub fn colortemp_increment(&mut self, delta: i32) -> &mut Self {
        self.ct_inc = Some(delta.clamp(-65534, 65534));
        self
    }

    /// Recall a scene by id (groups only).
    pub fn scene(&mut self, scene_id: &str) -> &mut Self {
        self.scene = Some(scene_id.to_string());
        self
    }

    /// Whether this payload switches the lamp off.
    pub fn turns_off(&self) -> bool {
        self.on == Some(false)
    }

    pub fn has_transition_time(&self) -> bool {
        self.transitiontime.is_some()
    }
}

impl From<Brightness> for Payload {
    fn from(brightness: Brightness) -> Self {
        let mut p = Payload::new();
        p.brightness(brightness);
        p
    }
}

impl From<Mired> for Payload {
    fn from(ct: Mired) -> Self {
        let mut p = Payload::new();
        p.colortemp(ct);
        p
    }
}

impl From<Xy> for Payload {
    fn from(xy: Xy) -> Self {
        let mut p = Payload::new();
        p.xy(xy);
        p
    }
}

impl From<Alert> for Payload {
    fn from(alert: Alert) -> Self {
        let mut p = Payload::new();
        p.alert(alert);
        p
    }
}

impl From<Effect> for Payload {
    fn from(effect: Effect) -> Self {
        let mut p = Payload::new();
        p.effect(effect);
        p
    }
}
