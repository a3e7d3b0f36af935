//! Groups of lights.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::bridge::Bridge;
use crate::errors::Error;
use crate::light::{self, Light, LightState};
use crate::payload::Payload;
use crate::registry::ResourceKey;
use crate::response::{self, ApiResponse};
use crate::types::TransitionTime;

type Result<T> = std::result::Result<T, Error>;

/// A group as listed by `/groups/`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct GroupInfo {
    #[serde(default)]
    pub name: String,
    /// Light ids, as strings.
    #[serde(default)]
    pub lights: Vec<String>,
    #[serde(default, rename = "type")]
    pub group_type: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub action: LightState,
}

impl GroupInfo {
    /// Member light ids in ascending order; non-numeric entries are skipped.
    pub fn light_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.lights.iter().filter_map(|l| l.parse().ok()).collect();
        ids.sort_unstable();
        ids
    }
}

/// What [`Groups::set_group`] changes.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupUpdate {
    /// State of every light in the group, sent to `/groups/<id>/action`.
    State(Payload),
    /// Sent to `/groups/<id>`.
    Name(String),
    /// Member lights, sent to `/groups/<id>`.
    Lights(Vec<u32>),
}

impl From<Payload> for GroupUpdate {
    fn from(payload: Payload) -> Self {
        GroupUpdate::State(payload)
    }
}

fn light_list(lights: &[u32]) -> Value {
    json!(lights.iter().map(u32::to_string).collect::<Vec<_>>())
}

/// Group accessor of a bridge.
#[derive(Debug, Clone)]
pub struct Groups {
    bridge: Bridge,
}

impl Groups {
    pub(crate) fn new(bridge: Bridge) -> Self {
        Groups { bridge }
    }

    pub async fn get_all_groups(&self) -> Result<BTreeMap<u32, GroupInfo>> {
        let value = self.bridge.get("/groups/").await?;
        crate::registry::parse_id_map("/groups/", value)
    }

    /// Handles for every group the bridge lists. Group 0 is never listed;
    /// see [`Groups::all_lights`].
    pub async fn groups(&self) -> Result<Vec<Group>> {
        let groups = self.get_all_groups().await?;
        Ok(groups
            .into_keys()
            .map(|id| Group::new(&self.bridge, id))
            .collect())
    }

    /// Look up a group id by its name. Case-sensitive.
    pub async fn get_group_id_by_name(&self, name: &str) -> Result<Option<u32>> {
        let groups = self.get_all_groups().await?;
        Ok(groups
            .into_iter()
            .find(|(_, info)| info.name == name)
            .map(|(id, _)| id))
    }

    async fn resolve(&self, key: &ResourceKey) -> Result<u32> {
        match key {
            ResourceKey::Id(id) => Ok(*id),
            ResourceKey::Name(name) => match self.get_group_id_by_name(name).await? {
                Some(id) => Ok(id),
                None => {
                    error!("Group name does not exist: {}", name);
                    Err(Error::GroupNotFound(name.clone()))
                }
            },
        }
    }

    /// Handle for a group by id or name. Names must exist on the bridge.
    pub async fn group(&self, key: impl Into<ResourceKey>) -> Result<Group> {
        let id = self.resolve(&key.into()).await?;
        Ok(Group::new(&self.bridge, id))
    }

    /// The implicit group of all lights.
    pub fn all_lights(&self) -> Group {
        Group::all_lights(&self.bridge)
    }

    pub async fn get_group(&self, key: impl Into<ResourceKey>) -> Result<GroupInfo> {
        let id = self.resolve(&key.into()).await?;
        self.bridge.get_as(&format!("/groups/{}", id)).await
    }

    /// One parameter of a group. `name` and `lights` come from the group
    /// itself, everything else from its action.
    pub async fn get_group_parameter(&self, key: impl Into<ResourceKey>, parameter: &str) -> Result<Value> {
        let id = self.resolve(&key.into()).await?;
        let target = light::Target::Group(id);
        let resource = self.bridge.get_resource(&target.resource()).await?;
        target.extract(&resource, parameter)
    }

    /// Change one or more groups.
    ///
    /// The transition time only applies to [`GroupUpdate::State`].
    pub async fn set_group<K>(
        &self,
        keys: impl IntoIterator<Item = K>,
        update: impl Into<GroupUpdate>,
        transition_time: Option<TransitionTime>,
    ) -> Result<Vec<Vec<ApiResponse>>>
    where
        K: Into<ResourceKey>,
    {
        let update = update.into();
        let (suffix, data) = match &update {
            GroupUpdate::State(payload) => {
                if !payload.is_valid() {
                    return Err(Error::NoAttribute);
                }
                let mut body = payload.clone();
                if let Some(time) = transition_time {
                    body.transition_time(time);
                }
                ("/action", serde_json::to_value(&body).map_err(Error::JsonDump)?)
            }
            GroupUpdate::Name(name) => ("", json!({ "name": name })),
            GroupUpdate::Lights(lights) => ("", json!({ "lights": light_list(lights) })),
        };

        let mut results = Vec::new();
        for key in keys {
            let key = key.into();
            let id = self.resolve(&key).await?;
            debug!("{}", data);
            let replies = self
                .bridge
                .put_replies(&format!("/groups/{}{}", id, suffix), &data)
                .await?;
            response::warn_errors(&replies, "group", &key);
            results.push(replies);
        }
        debug!("{:?}", results);
        Ok(results)
    }

    /// Create a group; the bridge replies with the new id.
    pub async fn create_group(&self, name: &str, lights: &[u32]) -> Result<Vec<ApiResponse>> {
        let data = json!({ "lights": light_list(lights), "name": name });
        self.bridge.post_replies("/groups/", &data).await
    }

    pub async fn delete_group(&self, id: u32) -> Result<Vec<ApiResponse>> {
        self.bridge.delete_replies(&format!("/groups/{}", id)).await
    }
}

/// A group of lights, controlled through the group's action.
///
/// Every light property of [`Light`] is available on a group and applies to
/// all of its members. Reads and writes go to `/groups/<id>` and its
/// `/action`, so `id()` is the group id, the same as [`Group::group_id`], and
/// `set_name` renames the group without touching the light cache.
///
/// ```ignore
/// let mut kitchen = bridge.groups().group("Kitchen").await?;
/// kitchen.set_hue(50000).await?; // all lights in the group turn blue
/// kitchen.set_on(false).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Group {
    light: Light,
}

impl Group {
    /// Group 0: every light on the bridge. The bridge does not list it.
    pub const ALL_LIGHTS: u32 = 0;

    pub(crate) fn new(bridge: &Bridge, id: u32) -> Self {
        Group {
            light: Light::new(bridge.clone(), light::Target::Group(id), bridge.light_registry()),
        }
    }

    pub fn all_lights(bridge: &Bridge) -> Self {
        Group::new(bridge, Self::ALL_LIGHTS)
    }

    pub fn group_id(&self) -> u32 {
        self.light.id()
    }

    /// Handles for the member lights.
    pub async fn lights(&self) -> Result<Vec<Light>> {
        let resource = self
            .light
            .bridge()
            .get_resource(&self.light.target().resource())
            .await?;
        let info: GroupInfo = serde_json::from_value(resource).map_err(Error::JsonLoad)?;
        let bridge = self.light.bridge();
        Ok(info
            .light_ids()
            .into_iter()
            .map(|id| Light::new(bridge.clone(), light::Target::Light(id), bridge.light_registry()))
            .collect())
    }

    pub async fn set_lights(&self, lights: &[u32]) -> Result<Vec<ApiResponse>> {
        debug!("Setting lights in group {} to {:?}", self.group_id(), lights);
        self.light.write_attribute("lights", light_list(lights)).await
    }
}

/// Light handle aimed at the group's resource; see [`Group`].
impl Deref for Group {
    type Target = Light;

    fn deref(&self) -> &Light {
        &self.light
    }
}

impl DerefMut for Group {
    fn deref_mut(&mut self) -> &mut Light {
        &mut self.light
    }
}
