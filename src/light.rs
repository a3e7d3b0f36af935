//! Individual light control.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::bridge::Bridge;
use crate::errors::Error;
use crate::payload::Payload;
use crate::registry::{self, Collection, CollectionMode, ResourceKey, SharedRegistry};
use crate::response::{self, ApiResponse};
use crate::status::LightStatus;
use crate::types::{
    Alert, Brightness, ColorMode, Effect, Kelvin, Mired, Saturation, TransitionTime, Xy,
};

type Result<T> = std::result::Result<T, Error>;

/// State block of a light as reported by the bridge.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LightState {
    pub on: Option<bool>,
    pub bri: Option<u8>,
    pub hue: Option<u16>,
    pub sat: Option<u8>,
    pub xy: Option<Xy>,
    pub ct: Option<u16>,
    pub alert: Option<String>,
    pub effect: Option<String>,
    pub colormode: Option<String>,
    pub reachable: Option<bool>,
    pub mode: Option<String>,
}

/// A light as listed by `/lights/`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LightInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub light_type: String,
    #[serde(default)]
    pub modelid: String,
    #[serde(default)]
    pub uniqueid: String,
    #[serde(default)]
    pub swversion: String,
    #[serde(default)]
    pub manufacturername: String,
    #[serde(default)]
    pub state: LightState,
}

/// Where the state behind a handle lives on the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// `/lights/<id>`, state under `/state`
    Light(u32),
    /// `/groups/<id>`, state under `/action`
    Group(u32),
}

impl Target {
    pub fn id(&self) -> u32 {
        match self {
            Target::Light(id) | Target::Group(id) => *id,
        }
    }

    pub(crate) fn resource(&self) -> String {
        match self {
            Target::Light(id) => format!("/lights/{}", id),
            Target::Group(id) => format!("/groups/{}", id),
        }
    }

    pub(crate) fn state_path(&self) -> String {
        match self {
            Target::Light(id) => format!("/lights/{}/state", id),
            Target::Group(id) => format!("/groups/{}/action", id),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Target::Light(_) => "light",
            Target::Group(_) => "group",
        }
    }

    /// Parameters stored on the resource itself rather than in its state block.
    fn top_level(&self) -> &'static [&'static str] {
        match self {
            Target::Light(_) => &["name", "type", "uniqueid", "swversion"],
            Target::Group(_) => &["name", "lights"],
        }
    }

    fn state_block(&self) -> &'static str {
        match self {
            Target::Light(_) => "state",
            Target::Group(_) => "action",
        }
    }

    /// Pick `parameter` out of a resource object.
    pub(crate) fn extract(&self, resource: &Value, parameter: &str) -> Result<Value> {
        let found = if self.top_level().contains(&parameter) {
            resource.get(parameter)
        } else {
            resource
                .get(self.state_block())
                .and_then(|block| block.get(parameter))
        };
        found
            .cloned()
            .ok_or_else(|| Error::invalid_parameter(parameter, format!("{} {}", self.kind(), self.id())))
    }
}

/// Light accessor of a bridge: name resolution, the light cache, and raw
/// reads and writes of light resources.
///
/// ```ignore
/// let lights = bridge.lights();
/// for light in lights.lights().await? {
///     println!("{}", light.id());
/// }
/// let mut kitchen = lights.get("Kitchen").await?;
/// let mut first = lights.get(1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Lights {
    bridge: Bridge,
    registry: SharedRegistry,
}

impl Lights {
    pub(crate) fn new(bridge: Bridge, registry: SharedRegistry) -> Self {
        Lights { bridge, registry }
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// All lights as reported by the bridge.
    pub async fn get_all_lights(&self) -> Result<BTreeMap<u32, LightInfo>> {
        let value = self.bridge.get("/lights/").await?;
        registry::parse_id_map("/lights/", value)
    }

    /// Look up a light id by its name. Case-sensitive; scans the live list.
    pub async fn get_light_id_by_name(&self, name: &str) -> Result<Option<u32>> {
        let lights = self.get_all_lights().await?;
        Ok(lights
            .into_iter()
            .find(|(_, info)| info.name == name)
            .map(|(id, _)| id))
    }

    pub(crate) async fn resolve(&self, key: &ResourceKey) -> Result<u32> {
        match key {
            ResourceKey::Id(id) => Ok(*id),
            ResourceKey::Name(name) => self
                .get_light_id_by_name(name)
                .await?
                .ok_or_else(|| Error::LightNotFound(name.clone())),
        }
    }

    /// Fill the cache from `/lights/` if it is empty.
    async fn ensure_loaded(&self) -> Result<()> {
        if !registry::lock(&self.registry).is_empty() {
            return Ok(());
        }
        let lights = self.get_all_lights().await?;
        let mut cache = registry::lock(&self.registry);
        for (id, info) in &lights {
            cache.insert(*id, &info.name);
        }
        Ok(())
    }

    /// Handle for a light id, without checking that it exists.
    pub fn light(&self, id: u32) -> Light {
        Light::new(self.bridge.clone(), Target::Light(id), self.registry.clone())
    }

    /// Light handles, as a list (ascending id) or keyed by id or name.
    ///
    /// The first call fills the cache; later calls reuse it.
    pub async fn get_light_objects(&self, mode: CollectionMode) -> Result<Collection<Light>> {
        self.ensure_loaded().await?;
        let cache = registry::lock(&self.registry);
        Ok(cache.collect(mode, |id| self.light(id)))
    }

    pub async fn lights(&self) -> Result<Vec<Light>> {
        self.ensure_loaded().await?;
        Ok(registry::lock(&self.registry).collect_list(|id| self.light(id)))
    }

    pub async fn lights_by_id(&self) -> Result<BTreeMap<u32, Light>> {
        self.ensure_loaded().await?;
        Ok(registry::lock(&self.registry).collect_by_id(|id| self.light(id)))
    }

    pub async fn lights_by_name(&self) -> Result<HashMap<String, Light>> {
        self.ensure_loaded().await?;
        Ok(registry::lock(&self.registry).collect_by_name(|id| self.light(id)))
    }

    /// A cached light by id or name.
    pub async fn get(&self, key: impl Into<ResourceKey>) -> Result<Light> {
        let key = key.into();
        self.ensure_loaded().await?;
        let id = registry::lock(&self.registry)
            .resolve(&key)
            .ok_or_else(|| Error::LightNotFound(key.to_string()))?;
        Ok(self.light(id))
    }

    /// Full resource of one light.
    pub async fn get_light(&self, key: impl Into<ResourceKey>) -> Result<LightInfo> {
        let id = self.resolve(&key.into()).await?;
        self.bridge.get_as(&format!("/lights/{}", id)).await
    }

    /// One parameter of a light. `name`, `type`, `uniqueid` and `swversion`
    /// come from the light itself, everything else from its state.
    pub async fn get_light_parameter(&self, key: impl Into<ResourceKey>, parameter: &str) -> Result<Value> {
        let id = self.resolve(&key.into()).await?;
        let target = Target::Light(id);
        let resource = self.bridge.get_resource(&target.resource()).await?;
        target.extract(&resource, parameter)
    }

    /// Apply a state change to one or more lights.
    ///
    /// Returns the bridge reply for each light, in order. Errors reported by
    /// the bridge are logged and left in the replies.
    pub async fn set_light<K>(
        &self,
        keys: impl IntoIterator<Item = K>,
        payload: &Payload,
        transition_time: Option<TransitionTime>,
    ) -> Result<Vec<Vec<ApiResponse>>>
    where
        K: Into<ResourceKey>,
    {
        if !payload.is_valid() {
            return Err(Error::NoAttribute);
        }
        let mut body = payload.clone();
        if let Some(time) = transition_time {
            body.transition_time(time);
        }
        let data = serde_json::to_value(&body).map_err(Error::JsonDump)?;

        let mut results = Vec::new();
        for key in keys {
            let key = key.into();
            let id = self.resolve(&key).await?;
            debug!("{}", data);
            let replies = self
                .bridge
                .put_replies(&Target::Light(id).state_path(), &data)
                .await?;
            response::warn_errors(&replies, "light", &key);
            results.push(replies);
        }
        debug!("{:?}", results);
        Ok(results)
    }

    /// Rename a light on the bridge. The cache is left alone; use
    /// [`Light::set_name`] to keep it in sync.
    pub async fn set_light_name(&self, key: impl Into<ResourceKey>, name: &str) -> Result<Vec<ApiResponse>> {
        let key = key.into();
        let id = self.resolve(&key).await?;
        let replies = self
            .bridge
            .put_replies(&Target::Light(id).resource(), &json!({ "name": name }))
            .await?;
        response::warn_errors(&replies, "light", &key);
        Ok(replies)
    }
}

/// A light (or, through [`crate::Group`], a group of lights) on the bridge.
///
/// Every getter reads the bridge; every setter writes it. Both remember the
/// value in [`Light::status`].
///
/// A transition time set with [`Light::set_transition_time`] is attached to
/// every state change this handle sends.
#[derive(Debug, Clone)]
pub struct Light {
    bridge: Bridge,
    target: Target,
    registry: SharedRegistry,
    status: LightStatus,
    transition_time: Option<TransitionTime>,
}

impl Light {
    pub(crate) fn new(bridge: Bridge, target: Target, registry: SharedRegistry) -> Self {
        Light {
            bridge,
            target,
            registry,
            status: LightStatus::default(),
            transition_time: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.target.id()
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn status(&self) -> &LightStatus {
        &self.status
    }

    pub fn transition_time(&self) -> Option<TransitionTime> {
        self.transition_time
    }

    /// Transition time used for every later state change of this handle.
    pub fn set_transition_time(&mut self, time: Option<TransitionTime>) {
        self.transition_time = time;
    }

    async fn read(&self, parameter: &str) -> Result<Value> {
        let resource = self.bridge.get_resource(&self.target.resource()).await?;
        self.target.extract(&resource, parameter)
    }

    async fn read_as<T: DeserializeOwned>(&self, parameter: &str) -> Result<T> {
        let value = self.read(parameter).await?;
        serde_json::from_value(value).map_err(Error::JsonLoad)
    }

    async fn read_enum<T: FromStr>(&self, parameter: &str) -> Result<T> {
        let raw: String = self.read_as(parameter).await?;
        T::from_str(&raw).map_err(|_| {
            Error::unexpected(
                &self.target.resource(),
                &format!("unknown {} value {}", parameter, raw),
            )
        })
    }

    /// Send a state change, adding the handle's transition time.
    pub async fn apply(&mut self, payload: &Payload) -> Result<Vec<ApiResponse>> {
        if !payload.is_valid() {
            return Err(Error::NoAttribute);
        }
        let mut body = payload.clone();
        if let Some(time) = self.transition_time {
            debug!(
                "Setting with transitiontime = {} ds = {} s",
                time.deciseconds(),
                time.as_secs_f32()
            );
            body.transition_time(time);
            if body.turns_off() {
                self.status.reset_bri_after_on = true;
            }
        }

        let data = serde_json::to_value(&body).map_err(Error::JsonDump)?;
        debug!("{}", data);
        let replies = self
            .bridge
            .put_replies(&self.target.state_path(), &data)
            .await?;
        response::warn_errors(&replies, self.target.kind(), self.id());
        self.status.update_from_payload(&body);
        Ok(replies)
    }

    /// Write an attribute of the resource itself (`name`, or `lights` for groups).
    pub(crate) async fn write_attribute(&self, attribute: &str, value: Value) -> Result<Vec<ApiResponse>> {
        let mut data = serde_json::Map::new();
        data.insert(attribute.to_string(), value);
        let replies = self
            .bridge
            .put_replies(&self.target.resource(), &Value::Object(data))
            .await?;
        response::warn_errors(&replies, self.target.kind(), self.id());
        Ok(replies)
    }

    pub async fn name(&mut self) -> Result<String> {
        let name: String = self.read_as("name").await?;
        self.status.name = Some(name.clone());
        Ok(name)
    }

    /// Rename on the bridge and in the light cache.
    pub async fn set_name(&mut self, name: &str) -> Result<Vec<ApiResponse>> {
        let old_name = self.name().await?;
        let replies = self.write_attribute("name", json!(name)).await?;
        self.status.name = Some(name.to_string());

        debug!(
            "Renaming {} from '{}' to '{}'",
            self.target.kind(),
            old_name,
            name
        );
        if let Target::Light(_) = self.target {
            registry::lock(&self.registry).rename(&old_name, name);
        }
        Ok(replies)
    }

    pub async fn on(&mut self) -> Result<bool> {
        let on: bool = self.read_as("on").await?;
        self.status.on = Some(on);
        Ok(on)
    }

    /// Switch the light on or off.
    ///
    /// Lamps switched off with a transition time come back on at brightness 1.
    /// When that happens through this handle, the brightness it last knew of is
    /// sent again right after the next power on.
    pub async fn set_on(&mut self, on: bool) -> Result<Vec<ApiResponse>> {
        if self.status.on == Some(true) && !on {
            self.status.reset_bri_after_on = self.transition_time.is_some();
            if self.status.reset_bri_after_on {
                warn!(
                    "Turned off light with transitiontime specified, brightness will be reset on power on"
                );
            }
        }

        let was_on = self.status.on;
        let mut payload = Payload::new();
        payload.on(on);
        let replies = self.apply(&payload).await?;

        if was_on == Some(false) && on && self.status.reset_bri_after_on {
            warn!("Light was turned off with transitiontime specified, brightness needs to be reset now.");
            if let Some(brightness) = self.status.brightness {
                self.set_brightness(brightness).await?;
            }
            self.status.reset_bri_after_on = false;
        }

        self.status.on = Some(on);
        Ok(replies)
    }

    pub async fn colormode(&mut self) -> Result<ColorMode> {
        let mode: ColorMode = self.read_enum("colormode").await?;
        self.status.colormode = Some(mode);
        Ok(mode)
    }

    /// Brightness, 0-254. 0 is not off.
    pub async fn brightness(&mut self) -> Result<Brightness> {
        let bri: u8 = self.read_as("bri").await?;
        let brightness = Brightness::saturating(bri);
        self.status.brightness = Some(brightness);
        Ok(brightness)
    }

    pub async fn set_brightness(&mut self, brightness: Brightness) -> Result<Vec<ApiResponse>> {
        self.apply(&Payload::from(brightness)).await
    }

    /// Hue, 0-65535.
    pub async fn hue(&mut self) -> Result<u16> {
        let hue: u16 = self.read_as("hue").await?;
        self.status.hue = Some(hue);
        Ok(hue)
    }

    pub async fn set_hue(&mut self, hue: u16) -> Result<Vec<ApiResponse>> {
        let mut payload = Payload::new();
        payload.hue(hue);
        self.apply(&payload).await
    }

    /// Saturation, 0 (white) to 254 (most saturated).
    pub async fn saturation(&mut self) -> Result<Saturation> {
        let sat: u8 = self.read_as("sat").await?;
        let saturation = Saturation {
            value: sat.min(Saturation::MAX),
        };
        self.status.saturation = Some(saturation);
        Ok(saturation)
    }

    pub async fn set_saturation(&mut self, saturation: Saturation) -> Result<Vec<ApiResponse>> {
        let mut payload = Payload::new();
        payload.saturation(saturation);
        self.apply(&payload).await
    }

    /// Colour coordinates, in a space similar to (but not quite) CIE 1931.
    pub async fn xy(&mut self) -> Result<Xy> {
        let xy: Xy = self.read_as("xy").await?;
        self.status.xy = Some(xy);
        Ok(xy)
    }

    pub async fn set_xy(&mut self, xy: Xy) -> Result<Vec<ApiResponse>> {
        self.apply(&Payload::from(xy)).await
    }

    /// Colour temperature in mireds, 154-500.
    pub async fn colortemp(&mut self) -> Result<Mired> {
        let ct: u16 = self.read_as("ct").await?;
        let mired = Mired { value: ct };
        self.status.colortemp = Some(mired);
        Ok(mired)
    }

    /// Set the colour temperature in mireds; values outside 154-500 are sent
    /// anyway, with a warning.
    pub async fn set_colortemp(&mut self, mireds: u16) -> Result<Vec<ApiResponse>> {
        self.apply(&Payload::from(Mired::new(mireds))).await
    }

    /// Colour temperature in Kelvin, converted from mireds.
    pub async fn colortemp_k(&mut self) -> Result<u32> {
        Ok(self.colortemp().await?.to_kelvin())
    }

    /// Set the colour temperature in Kelvin, clamped to 2000-6500.
    pub async fn set_colortemp_k(&mut self, kelvin: u32) -> Result<Vec<ApiResponse>> {
        let mireds = Kelvin::clamped(kelvin).to_mired();
        self.set_colortemp(mireds.value()).await
    }

    pub async fn effect(&mut self) -> Result<Effect> {
        let effect: Effect = self.read_enum("effect").await?;
        self.status.effect = Some(effect);
        Ok(effect)
    }

    pub async fn set_effect(&mut self, effect: Effect) -> Result<Vec<ApiResponse>> {
        self.apply(&Payload::from(effect)).await
    }

    pub async fn alert(&mut self) -> Result<Alert> {
        let alert: Alert = self.read_enum("alert").await?;
        self.status.alert = Some(alert);
        Ok(alert)
    }

    /// `None` stops a running alert.
    pub async fn set_alert(&mut self, alert: Option<Alert>) -> Result<Vec<ApiResponse>> {
        self.apply(&Payload::from(alert.unwrap_or_default())).await
    }

    pub async fn reachable(&mut self) -> Result<bool> {
        let reachable: bool = self.read_as("reachable").await?;
        self.status.reachable = Some(reachable);
        Ok(reachable)
    }

    /// Model type, e.g. "Extended color light".
    pub async fn light_type(&mut self) -> Result<String> {
        let light_type: String = self.read_as("type").await?;
        self.status.light_type = Some(light_type.clone());
        Ok(light_type)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bridge::testing::{self, path};
    use crate::transport::Method;
    use crate::transport::mock::MockTransport;

    fn lights_fixture() -> Value {
        json!({
            "1": {
                "name": "Hall",
                "type": "Dimmable light",
                "uniqueid": "00:17:88:01:00:bd:c7:b9-0b",
                "swversion": "5.105.0.21169",
                "state": {"on": true, "bri": 200, "alert": "none", "reachable": true}
            },
            "3": {
                "name": "Kitchen",
                "type": "Extended color light",
                "state": {"on": false, "bri": 90, "hue": 14922, "sat": 144, "xy": [0.4595, 0.4105],
                          "ct": 369, "alert": "none", "effect": "none", "colormode": "ct", "reachable": true}
            }
        })
    }

    fn mock() -> Arc<MockTransport> {
        let lights = lights_fixture();
        Arc::new(
            MockTransport::new()
                .route(Method::Get, &path("/lights/"), lights.clone())
                .route(Method::Get, &path("/lights/1"), lights["1"].clone())
                .route(Method::Get, &path("/lights/3"), lights["3"].clone()),
        )
    }

    #[tokio::test]
    async fn test_get_light_id_by_name() {
        let mock = mock();
        let lights = testing::bridge(&mock).lights();
        assert_eq!(lights.get_light_id_by_name("Kitchen").await.unwrap(), Some(3));
        assert_eq!(lights.get_light_id_by_name("kitchen").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_light_objects_are_cached() {
        let mock = mock();
        let lights = testing::bridge(&mock).lights();

        let list = lights.lights().await.unwrap();
        assert_eq!(list.iter().map(Light::id).collect::<Vec<_>>(), vec![1, 3]);

        let by_name = lights.lights_by_name().await.unwrap();
        assert_eq!(by_name["Kitchen"].id(), 3);
        let by_id = lights.lights_by_id().await.unwrap();
        assert_eq!(by_id.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(by_id[&1].id(), 1);

        // A single enumeration fills the cache.
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_key() {
        let mock = mock();
        let lights = testing::bridge(&mock).lights();
        assert_eq!(lights.get(3).await.unwrap().id(), 3);
        assert_eq!(lights.get("Hall").await.unwrap().id(), 1);

        let err = lights.get("Attic").await.unwrap_err();
        assert_eq!(err, Error::LightNotFound("Attic".into()));
        let err = lights.get(7).await.unwrap_err();
        assert_eq!(err, Error::LightNotFound("7".into()));
    }

    #[tokio::test]
    async fn test_get_light_parameter() {
        let mock = mock();
        let lights = testing::bridge(&mock).lights();

        assert_eq!(lights.get_light_parameter(1, "swversion").await.unwrap(), json!("5.105.0.21169"));
        assert_eq!(lights.get_light_parameter("Kitchen", "ct").await.unwrap(), json!(369));

        let err = lights.get_light_parameter(1, "hue").await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn test_get_light_info() {
        let mock = mock();
        let lights = testing::bridge(&mock).lights();
        let info = lights.get_light("Kitchen").await.unwrap();
        assert_eq!(info.light_type, "Extended color light");
        assert_eq!(info.state.colormode.as_deref(), Some("ct"));
        assert_eq!(info.state.xy, Xy::create(0.4595, 0.4105));
    }

    #[tokio::test]
    async fn test_set_light_multiple() {
        let mock = mock();
        let lights = testing::bridge(&mock).lights();

        let mut payload = Payload::new();
        payload.on(true);
        let results = lights
            .set_light(
                [ResourceKey::from(1), ResourceKey::from("Kitchen")],
                &payload,
                Some(TransitionTime::rounded(4.6)),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        let writes = mock.writes();
        assert_eq!(writes[0].address, "/api/user/lights/1/state");
        assert_eq!(writes[1].address, "/api/user/lights/3/state");
        assert_eq!(writes[1].body, Some(json!({"on": true, "transitiontime": 5})));
    }

    #[tokio::test]
    async fn test_set_light_rejects_empty_payload() {
        let mock = mock();
        let lights = testing::bridge(&mock).lights();
        let err = lights.set_light([1], &Payload::new(), None).await.unwrap_err();
        assert_eq!(err, Error::NoAttribute);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_set_light_keeps_device_errors() {
        let mock = mock();
        mock.set_route(
            Method::Put,
            &path("/lights/3/state"),
            json!([{"error": {"type": 201, "address": "/lights/3/state/bri", "description": "parameter, bri, is not modifiable. Device is set to off."}}]),
        );
        let lights = testing::bridge(&mock).lights();
        let results = lights
            .set_light([3], &Payload::from(Brightness::new()), None)
            .await
            .unwrap();
        assert_eq!(response::first_error(&results[0]).unwrap().kind, 201);
    }

    #[tokio::test]
    async fn test_getters_update_status() {
        let mock = mock();
        let mut light = testing::bridge(&mock).lights().light(3);

        assert!(!light.on().await.unwrap());
        assert_eq!(light.brightness().await.unwrap().value(), 90);
        assert_eq!(light.colormode().await.unwrap(), ColorMode::Ct);
        assert_eq!(light.colortemp_k().await.unwrap(), 2710);
        assert_eq!(light.effect().await.unwrap(), Effect::None);
        assert_eq!(light.light_type().await.unwrap(), "Extended color light");

        let status = light.status();
        assert_eq!(status.on(), Some(false));
        assert_eq!(status.colortemp().unwrap().value(), 369);
    }

    #[tokio::test]
    async fn test_set_name_updates_cache() {
        let mock = mock();
        let lights = testing::bridge(&mock).lights();
        let mut hall = lights.get("Hall").await.unwrap();

        hall.set_name("Entrance").await.unwrap();

        assert_eq!(mock.writes()[0].address, "/api/user/lights/1");
        assert_eq!(mock.writes()[0].body, Some(json!({"name": "Entrance"})));
        assert_eq!(lights.get("Entrance").await.unwrap().id(), 1);
        assert!(lights.get("Hall").await.is_err());
    }

    #[tokio::test]
    async fn test_colortemp_k_is_clamped() {
        let mock = mock();
        let mut light = testing::bridge(&mock).lights().light(3);
        light.set_colortemp_k(10000).await.unwrap();
        light.set_colortemp_k(1000).await.unwrap();

        let writes = mock.writes();
        assert_eq!(writes[0].body, Some(json!({"ct": 154})));
        assert_eq!(writes[1].body, Some(json!({"ct": 500})));
    }

    #[tokio::test]
    async fn test_out_of_range_mireds_sent_anyway() {
        let mock = mock();
        let mut light = testing::bridge(&mock).lights().light(3);
        light.set_colortemp(600).await.unwrap();
        assert_eq!(mock.writes()[0].body, Some(json!({"ct": 600})));
    }

    #[tokio::test]
    async fn test_alert_none() {
        let mock = mock();
        let mut light = testing::bridge(&mock).lights().light(1);
        light.set_alert(None).await.unwrap();
        assert_eq!(mock.writes()[0].body, Some(json!({"alert": "none"})));
    }

    #[tokio::test]
    async fn test_transition_time_attached() {
        let mock = mock();
        let mut light = testing::bridge(&mock).lights().light(1);
        light.set_transition_time(Some(TransitionTime::from_deciseconds(20)));
        light.set_hue(25500).await.unwrap();
        assert_eq!(
            mock.writes()[0].body,
            Some(json!({"hue": 25500, "transitiontime": 20}))
        );
    }

    #[tokio::test]
    async fn test_brightness_restored_after_off_with_transition() {
        let mock = mock();
        let mut light = testing::bridge(&mock).lights().light(1);

        assert!(light.on().await.unwrap());
        light
            .set_brightness(Brightness::create(180).unwrap())
            .await
            .unwrap();
        light.set_transition_time(Some(TransitionTime::from_deciseconds(10)));

        light.set_on(false).await.unwrap();
        assert!(light.status().reset_bri_after_on());

        light.set_on(true).await.unwrap();
        assert!(!light.status().reset_bri_after_on());

        let bodies: Vec<_> = mock.writes().into_iter().map(|r| r.body.unwrap()).collect();
        assert_eq!(
            bodies,
            vec![
                json!({"bri": 180}),
                json!({"on": false, "transitiontime": 10}),
                json!({"on": true, "transitiontime": 10}),
                json!({"bri": 180, "transitiontime": 10}),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_brightness_reset_without_transition() {
        let mock = mock();
        let mut light = testing::bridge(&mock).lights().light(1);
        assert!(light.on().await.unwrap());
        light.set_on(false).await.unwrap();
        light.set_on(true).await.unwrap();
        assert_eq!(mock.writes().len(), 2);
    }

    #[test]
    fn test_target_paths() {
        assert_eq!(Target::Light(4).state_path(), "/lights/4/state");
        assert_eq!(Target::Group(0).state_path(), "/groups/0/action");
        assert_eq!(Target::Group(2).resource(), "/groups/2");
    }
}
