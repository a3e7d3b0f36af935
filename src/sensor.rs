//! Sensors, including software (CLIP) sensors created through the API.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::bridge::Bridge;
use crate::errors::Error;
use crate::registry::{self, Collection, CollectionMode, ResourceKey, SharedRegistry};
use crate::response::{self, ApiResponse};

type Result<T> = std::result::Result<T, Error>;

/// The writable sections of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SensorContent {
    State,
    Config,
}

/// A sensor as listed by `/sensors/`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SensorInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub sensor_type: String,
    #[serde(default)]
    pub modelid: String,
    #[serde(default)]
    pub manufacturername: String,
    #[serde(default)]
    pub swversion: String,
    #[serde(default)]
    pub uniqueid: Option<String>,
    #[serde(default)]
    pub state: Map<String, Value>,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub recycle: Option<bool>,
}

/// Description of a sensor to create with [`Sensors::create_sensor`].
///
/// Without an explicit unique id a random one is generated.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewSensor {
    pub name: String,
    pub modelid: String,
    pub swversion: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub uniqueid: String,
    pub manufacturername: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub state: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
    pub recycle: bool,
}

impl NewSensor {
    pub fn new(name: &str, sensor_type: &str) -> Self {
        NewSensor {
            name: name.to_string(),
            modelid: String::new(),
            swversion: String::new(),
            sensor_type: sensor_type.to_string(),
            uniqueid: uuid::Uuid::new_v4().to_string(),
            manufacturername: String::new(),
            state: Map::new(),
            config: Map::new(),
            recycle: false,
        }
    }

    pub fn modelid(mut self, modelid: &str) -> Self {
        self.modelid = modelid.to_string();
        self
    }

    pub fn swversion(mut self, swversion: &str) -> Self {
        self.swversion = swversion.to_string();
        self
    }

    pub fn uniqueid(mut self, uniqueid: &str) -> Self {
        self.uniqueid = uniqueid.to_string();
        self
    }

    pub fn manufacturername(mut self, manufacturername: &str) -> Self {
        self.manufacturername = manufacturername.to_string();
        self
    }

    pub fn state(mut self, state: Map<String, Value>) -> Self {
        self.state = state;
        self
    }

    pub fn config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    pub fn recycle(mut self, recycle: bool) -> Self {
        self.recycle = recycle;
        self
    }
}

/// Sensor accessor of a bridge.
#[derive(Debug, Clone)]
pub struct Sensors {
    bridge: Bridge,
    registry: SharedRegistry,
}

impl Sensors {
    pub(crate) fn new(bridge: Bridge, registry: SharedRegistry) -> Self {
        Sensors { bridge, registry }
    }

    pub async fn get_all_sensors(&self) -> Result<BTreeMap<u32, SensorInfo>> {
        let value = self.bridge.get("/sensors/").await?;
        registry::parse_id_map("/sensors/", value)
    }

    /// Look up a sensor id by its name. Case-sensitive.
    pub async fn get_sensor_id_by_name(&self, name: &str) -> Result<Option<u32>> {
        let sensors = self.get_all_sensors().await?;
        Ok(sensors
            .into_iter()
            .find(|(_, info)| info.name == name)
            .map(|(id, _)| id))
    }

    async fn resolve(&self, key: &ResourceKey) -> Result<u32> {
        match key {
            ResourceKey::Id(id) => Ok(*id),
            ResourceKey::Name(name) => self
                .get_sensor_id_by_name(name)
                .await?
                .ok_or_else(|| Error::SensorNotFound(name.clone())),
        }
    }

    async fn ensure_loaded(&self) -> Result<()> {
        if !registry::lock(&self.registry).is_empty() {
            return Ok(());
        }
        let sensors = self.get_all_sensors().await?;
        let mut cache = registry::lock(&self.registry);
        for (id, info) in &sensors {
            cache.insert(*id, &info.name);
        }
        Ok(())
    }

    /// Handle for a sensor id, without checking that it exists.
    pub fn sensor(&self, id: u32) -> Sensor {
        Sensor::new(self.clone(), id)
    }

    pub async fn get_sensor_objects(&self, mode: CollectionMode) -> Result<Collection<Sensor>> {
        self.ensure_loaded().await?;
        let cache = registry::lock(&self.registry);
        Ok(cache.collect(mode, |id| self.sensor(id)))
    }

    pub async fn sensors(&self) -> Result<Vec<Sensor>> {
        self.ensure_loaded().await?;
        Ok(registry::lock(&self.registry).collect_list(|id| self.sensor(id)))
    }

    pub async fn sensors_by_id(&self) -> Result<BTreeMap<u32, Sensor>> {
        self.ensure_loaded().await?;
        Ok(registry::lock(&self.registry).collect_by_id(|id| self.sensor(id)))
    }

    pub async fn sensors_by_name(&self) -> Result<HashMap<String, Sensor>> {
        self.ensure_loaded().await?;
        Ok(registry::lock(&self.registry).collect_by_name(|id| self.sensor(id)))
    }

    /// A cached sensor by id or name.
    pub async fn get(&self, key: impl Into<ResourceKey>) -> Result<Sensor> {
        let key = key.into();
        self.ensure_loaded().await?;
        let id = registry::lock(&self.registry)
            .resolve(&key)
            .ok_or_else(|| Error::SensorNotFound(key.to_string()))?;
        Ok(self.sensor(id))
    }

    /// Create a sensor and add it to the cache once the cache is filled.
    ///
    /// Returns the new id, or [`Error::Api`] with the bridge's reason.
    pub async fn create_sensor(&self, sensor: &NewSensor) -> Result<u32> {
        let data = serde_json::to_value(sensor).map_err(Error::JsonDump)?;
        let replies = self.bridge.post_replies("/sensors/", &data).await?;

        match replies.into_iter().next() {
            Some(ApiResponse::Success(created)) => {
                let id = created
                    .get("id")
                    .and_then(|id| match id {
                        Value::String(s) => s.parse().ok(),
                        other => other.as_u64().and_then(|n| u32::try_from(n).ok()),
                    })
                    .ok_or_else(|| Error::unexpected("/sensors/", "missing sensor id"))?;
                debug!("Created sensor with ID {}", id);
                let mut cache = registry::lock(&self.registry);
                if !cache.is_empty() {
                    cache.insert(id, &sensor.name);
                }
                Ok(id)
            }
            Some(ApiResponse::Error(err)) => {
                debug!("Failed to create sensor: {:?}", err);
                Err(Error::Api(err))
            }
            None => Err(Error::unexpected("/sensors/", "empty reply")),
        }
    }

    /// Full resource of one sensor.
    pub async fn get_sensor(&self, key: impl Into<ResourceKey>) -> Result<Value> {
        let id = self.resolve(&key.into()).await?;
        self.bridge.get_resource(&format!("/sensors/{}", id)).await
    }

    pub async fn get_sensor_parameter(&self, key: impl Into<ResourceKey>, parameter: &str) -> Result<Value> {
        let key = key.into();
        let data = self.get_sensor(&key).await?;
        data.get(parameter)
            .cloned()
            .ok_or_else(|| Error::invalid_parameter(parameter, format!("sensor {}", key)))
    }

    /// Change top level attributes of a sensor, such as its name.
    pub async fn set_sensor(&self, id: u32, data: &Value) -> Result<Vec<ApiResponse>> {
        debug!("{}", data);
        let replies = self.bridge.put_replies(&format!("/sensors/{}", id), data).await?;
        response::warn_errors(&replies, "sensor", id);
        debug!("{:?}", replies);
        Ok(replies)
    }

    pub async fn set_sensor_state(&self, id: u32, data: &Map<String, Value>) -> Result<Vec<ApiResponse>> {
        self.set_sensor_content(id, data, SensorContent::State).await
    }

    pub async fn set_sensor_config(&self, id: u32, data: &Map<String, Value>) -> Result<Vec<ApiResponse>> {
        self.set_sensor_content(id, data, SensorContent::Config).await
    }

    /// Write a sensor's state or config. `lastupdated` is read-only and is
    /// left out.
    pub async fn set_sensor_content(
        &self,
        id: u32,
        data: &Map<String, Value>,
        section: SensorContent,
    ) -> Result<Vec<ApiResponse>> {
        let mut data = data.clone();
        data.remove("lastupdated");
        let data = Value::Object(data);

        debug!("{}", data);
        let replies = self
            .bridge
            .put_replies(&format!("/sensors/{}/{}", id, section), &data)
            .await?;
        response::warn_errors(&replies, "sensor", id);
        debug!("{:?}", replies);
        Ok(replies)
    }

    /// Delete a sensor from the bridge and the cache.
    pub async fn delete_sensor(&self, id: u32) -> Result<Vec<ApiResponse>> {
        if registry::lock(&self.registry).remove(id).is_none() {
            debug!("Deleting sensor {} which was not cached", id);
        }
        self.bridge.delete_replies(&format!("/sensors/{}", id)).await
    }
}

/// A sensor on the bridge.
///
/// `state` and `config` keep the sections last read; the `set_*_value`
/// methods change one key and send the whole section back.
#[derive(Debug, Clone)]
pub struct Sensor {
    sensors: Sensors,
    id: u32,
    state: Map<String, Value>,
    config: Map<String, Value>,
}

impl Sensor {
    fn new(sensors: Sensors, id: u32) -> Self {
        Sensor {
            sensors,
            id,
            state: Map::new(),
            config: Map::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    async fn read(&self, parameter: &str) -> Result<Value> {
        self.sensors.get_sensor_parameter(self.id, parameter).await
    }

    async fn read_string(&self, parameter: &str) -> Result<String> {
        match self.read(parameter).await? {
            Value::String(s) => Ok(s),
            other => Err(Error::unexpected(
                &format!("/sensors/{}", self.id),
                &format!("{} is not a string: {}", parameter, other),
            )),
        }
    }

    async fn read_section(&self, section: SensorContent) -> Result<Map<String, Value>> {
        match self.read(section.as_ref()).await? {
            Value::Object(map) => Ok(map),
            other => Err(Error::unexpected(
                &format!("/sensors/{}", self.id),
                &format!("{} is not an object: {}", section, other),
            )),
        }
    }

    pub async fn name(&self) -> Result<String> {
        self.read_string("name").await
    }

    /// Rename on the bridge and in the sensor cache.
    pub async fn set_name(&self, name: &str) -> Result<Vec<ApiResponse>> {
        let old_name = self.name().await?;
        let replies = self.sensors.set_sensor(self.id, &json!({ "name": name })).await?;
        debug!("Renaming sensor from '{}' to '{}'", old_name, name);
        registry::lock(&self.sensors.registry).rename(&old_name, name);
        Ok(replies)
    }

    /// Identifier of the hardware model.
    pub async fn modelid(&self) -> Result<String> {
        self.read_string("modelid").await
    }

    pub async fn swversion(&self) -> Result<String> {
        self.read_string("swversion").await
    }

    /// Sensor type, e.g. "ZLLPresence" or "CLIPGenericStatus".
    pub async fn sensor_type(&self) -> Result<String> {
        self.read_string("type").await
    }

    pub async fn uniqueid(&self) -> Result<String> {
        self.read_string("uniqueid").await
    }

    pub async fn manufacturername(&self) -> Result<String> {
        self.read_string("manufacturername").await
    }

    /// Whether the bridge removes the sensor once nothing references it.
    pub async fn recycle(&self) -> Result<bool> {
        match self.read("recycle").await? {
            Value::Bool(recycle) => Ok(recycle),
            other => Err(Error::unexpected(
                &format!("/sensors/{}", self.id),
                &format!("recycle is not a bool: {}", other),
            )),
        }
    }

    /// Refresh and return the state section.
    pub async fn state(&mut self) -> Result<&Map<String, Value>> {
        self.state = self.read_section(SensorContent::State).await?;
        Ok(&self.state)
    }

    /// Refresh and return the config section.
    pub async fn config(&mut self) -> Result<&Map<String, Value>> {
        self.config = self.read_section(SensorContent::Config).await?;
        Ok(&self.config)
    }

    /// The state section as last read or written, without a request.
    pub fn cached_state(&self) -> &Map<String, Value> {
        &self.state
    }

    pub fn cached_config(&self) -> &Map<String, Value> {
        &self.config
    }

    pub async fn set_state_value(&mut self, key: &str, value: Value) -> Result<Vec<ApiResponse>> {
        self.state.insert(key.to_string(), value);
        self.sensors.set_sensor_state(self.id, &self.state).await
    }

    pub async fn set_config_value(&mut self, key: &str, value: Value) -> Result<Vec<ApiResponse>> {
        self.config.insert(key.to_string(), value);
        self.sensors.set_sensor_config(self.id, &self.config).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bridge::testing::{self, path};
    use crate::transport::Method;
    use crate::transport::mock::MockTransport;

    fn sensors_fixture() -> Value {
        json!({
            "1": {
                "name": "Daylight",
                "type": "Daylight",
                "modelid": "PHDL00",
                "manufacturername": "Philips",
                "swversion": "1.0",
                "state": {"daylight": true, "lastupdated": "2024-05-01T05:12:00"},
                "config": {"on": true, "sunriseoffset": 30}
            },
            "5": {
                "name": "Away flag",
                "type": "CLIPGenericFlag",
                "modelid": "flag",
                "manufacturername": "hue_bridge_rs",
                "swversion": "1",
                "uniqueid": "away-1",
                "recycle": true,
                "state": {"flag": false, "lastupdated": "none"},
                "config": {"on": true, "reachable": true}
            }
        })
    }

    fn mock() -> Arc<MockTransport> {
        let sensors = sensors_fixture();
        Arc::new(
            MockTransport::new()
                .route(Method::Get, &path("/sensors/"), sensors.clone())
                .route(Method::Get, &path("/sensors/1"), sensors["1"].clone())
                .route(Method::Get, &path("/sensors/5"), sensors["5"].clone()),
        )
    }

    #[tokio::test]
    async fn test_sensor_objects() {
        let mock = mock();
        let sensors = testing::bridge(&mock).sensors();

        let ids: Vec<u32> = sensors.sensors().await.unwrap().iter().map(Sensor::id).collect();
        assert_eq!(ids, vec![1, 5]);
        assert_eq!(sensors.get("Away flag").await.unwrap().id(), 5);

        let by_id = sensors.sensors_by_id().await.unwrap();
        assert_eq!(by_id.keys().copied().collect::<Vec<_>>(), vec![1, 5]);
        let by_name = sensors.sensors_by_name().await.unwrap();
        assert_eq!(by_name["Daylight"].id(), 1);
        assert_eq!(mock.requests().len(), 1);
        assert_eq!(
            sensors.get("Motion").await.unwrap_err(),
            Error::SensorNotFound("Motion".into())
        );
    }

    #[tokio::test]
    async fn test_create_sensor_registers() {
        let mock = mock();
        mock.set_route(
            Method::Post,
            &path("/sensors/"),
            json!([{"success": {"id": "7"}}]),
        );
        let sensors = testing::bridge(&mock).sensors();
        sensors.sensors().await.unwrap();

        let mut state = Map::new();
        state.insert("status".into(), json!(0));
        let new_sensor = NewSensor::new("Mode", "CLIPGenericStatus")
            .modelid("status")
            .swversion("1")
            .manufacturername("hue_bridge_rs")
            .state(state);

        assert_eq!(sensors.create_sensor(&new_sensor).await.unwrap(), 7);
        assert_eq!(sensors.get("Mode").await.unwrap().id(), 7);

        let body = mock.writes()[0].body.clone().unwrap();
        assert_eq!(body["type"], "CLIPGenericStatus");
        assert_eq!(body["state"], json!({"status": 0}));
        assert!(body.get("config").is_none());
        assert_eq!(body["uniqueid"].as_str().unwrap().len(), 36);
    }

    #[tokio::test]
    async fn test_create_sensor_failure() {
        let mock = mock();
        mock.set_route(
            Method::Post,
            &path("/sensors/"),
            json!([{"error": {"type": 7, "address": "/sensors/type", "description": "invalid value, Nope, for parameter, type"}}]),
        );
        let sensors = testing::bridge(&mock).sensors();
        let err = sensors
            .create_sensor(&NewSensor::new("Bad", "Nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ref e) if e.kind == 7));
    }

    #[tokio::test]
    async fn test_get_sensor() {
        let mock = mock();
        let sensors = testing::bridge(&mock).sensors();

        assert_eq!(sensors.get_sensor("Daylight").await.unwrap()["modelid"], "PHDL00");
        assert_eq!(sensors.get_sensor_parameter(5, "uniqueid").await.unwrap(), json!("away-1"));

        let err = sensors.get_sensor(9).await.unwrap_err();
        assert!(matches!(err, Error::Api(ref e) if e.kind == 3));
    }

    #[tokio::test]
    async fn test_content_drops_lastupdated() {
        let mock = mock();
        let sensors = testing::bridge(&mock).sensors();

        let mut data = Map::new();
        data.insert("flag".into(), json!(true));
        data.insert("lastupdated".into(), json!("none"));
        sensors.set_sensor_state(5, &data).await.unwrap();

        let writes = mock.writes();
        assert_eq!(writes[0].address, "/api/user/sensors/5/state");
        assert_eq!(writes[0].body, Some(json!({"flag": true})));
    }

    #[tokio::test]
    async fn test_set_state_value_pushes_section() {
        let mock = mock();
        let mut flag = testing::bridge(&mock).sensors().sensor(5);

        assert_eq!(flag.state().await.unwrap()["flag"], json!(false));
        flag.set_state_value("flag", json!(true)).await.unwrap();
        flag.set_config_value("on", json!(false)).await.unwrap();

        let writes = mock.writes();
        assert_eq!(writes[0].body, Some(json!({"flag": true})));
        assert_eq!(writes[1].address, "/api/user/sensors/5/config");
        assert_eq!(writes[1].body, Some(json!({"on": false})));
        assert_eq!(flag.cached_state()["flag"], json!(true));
    }

    #[tokio::test]
    async fn test_sensor_properties() {
        let mock = mock();
        let sensors = testing::bridge(&mock).sensors();
        let flag = sensors.sensor(5);

        assert_eq!(flag.sensor_type().await.unwrap(), "CLIPGenericFlag");
        assert_eq!(flag.manufacturername().await.unwrap(), "hue_bridge_rs");
        assert!(flag.recycle().await.unwrap());
        assert!(sensors.sensor(1).recycle().await.is_err());
    }

    #[tokio::test]
    async fn test_rename_and_delete_update_cache() {
        let mock = mock();
        let sensors = testing::bridge(&mock).sensors();
        let daylight = sensors.get("Daylight").await.unwrap();

        daylight.set_name("Sun").await.unwrap();
        assert_eq!(sensors.get("Sun").await.unwrap().id(), 1);

        sensors.delete_sensor(1).await.unwrap();
        assert!(sensors.get("Sun").await.is_err());

        // Uncached sensors are still deleted on the bridge.
        sensors.delete_sensor(42).await.unwrap();
        let writes = mock.writes();
        assert_eq!(writes[1].method, Method::Delete);
        assert_eq!(writes.last().unwrap().address, "/api/user/sensors/42");
    }
}
