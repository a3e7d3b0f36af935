//! Scenes stored on the bridge.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use serde_with::{DisplayFromStr, serde_as};

use crate::bridge::Bridge;
use crate::errors::Error;
use crate::payload::Payload;
use crate::response::ApiResponse;
use crate::types::TransitionTime;

type Result<T> = std::result::Result<T, Error>;

/// A scene as listed by `/scenes`.
#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Scene {
    /// Taken from the listing key.
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Light ids in ascending order.
    #[serde_as(as = "Vec<DisplayFromStr>")]
    #[serde(default)]
    pub lights: Vec<u32>,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub recycle: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub appdata: Map<String, Value>,
    #[serde(default)]
    pub picture: String,
    pub lastupdated: Option<String>,
    #[serde(default)]
    pub version: u32,
    #[serde(default, rename = "type")]
    pub scene_type: String,
    #[serde(default)]
    pub group: Option<String>,
}

/// Scene accessor of a bridge.
#[derive(Debug, Clone)]
pub struct Scenes {
    bridge: Bridge,
}

impl Scenes {
    pub(crate) fn new(bridge: Bridge) -> Self {
        Scenes { bridge }
    }

    /// The raw `/scenes` listing.
    pub async fn get_scene(&self) -> Result<Value> {
        self.bridge.get_resource("/scenes").await
    }

    /// Every scene, ordered by id.
    pub async fn scenes(&self) -> Result<Vec<Scene>> {
        let raw: BTreeMap<String, Scene> =
            serde_json::from_value(self.get_scene().await?).map_err(Error::JsonLoad)?;
        Ok(raw
            .into_iter()
            .map(|(id, mut scene)| {
                scene.id = id;
                scene.lights.sort_unstable();
                scene
            })
            .collect())
    }

    /// Create a scene covering every light of a group.
    ///
    /// Lights added to the group later are added to the scene by the bridge.
    pub async fn create_group_scene(&self, name: &str, group: u32) -> Result<Vec<ApiResponse>> {
        let data = json!({
            "name": name,
            "group": group.to_string(),
            "recycle": true,
            "type": "GroupScene",
        });
        self.bridge.post_replies("/scenes", &data).await
    }

    pub async fn modify_scene(&self, scene_id: &str, data: &Value) -> Result<Vec<ApiResponse>> {
        self.bridge
            .put_replies(&format!("/scenes/{}", scene_id), data)
            .await
    }

    /// Recall a scene on a group. The transition time defaults to 4 (400ms).
    pub async fn activate_scene(
        &self,
        group_id: u32,
        scene_id: &str,
        transition_time: Option<TransitionTime>,
    ) -> Result<Vec<ApiResponse>> {
        let mut payload = Payload::new();
        payload
            .scene(scene_id)
            .transition_time(transition_time.unwrap_or(TransitionTime::DEFAULT));
        let data = serde_json::to_value(&payload).map_err(Error::JsonDump)?;
        self.bridge
            .put_replies(&format!("/groups/{}/action", group_id), &data)
            .await
    }

    /// Run a scene by group name and scene name.
    ///
    /// The group name must match exactly one group. If several scenes share
    /// the name, the first one with exactly the group's lights is used.
    /// Returns whether a scene was run.
    pub async fn run_scene(
        &self,
        group_name: &str,
        scene_name: &str,
        transition_time: Option<TransitionTime>,
    ) -> Result<bool> {
        let groups: Vec<_> = self
            .bridge
            .groups()
            .get_all_groups()
            .await?
            .into_iter()
            .filter(|(_, info)| info.name == group_name)
            .collect();
        let [(group_id, group)] = groups.as_slice() else {
            if groups.is_empty() {
                warn!("run_scene: No group found by name {}", group_name);
            } else {
                warn!("run_scene: More than 1 group found by name {}", group_name);
            }
            return Ok(false);
        };

        let scenes: Vec<Scene> = self
            .scenes()
            .await?
            .into_iter()
            .filter(|s| s.name == scene_name)
            .collect();
        let scene = match scenes.as_slice() {
            [] => {
                warn!("run_scene: No scene found {}", scene_name);
                return Ok(false);
            }
            [scene] => scene,
            _ => {
                let group_lights = group.light_ids();
                match scenes.iter().find(|s| s.lights == group_lights) {
                    Some(scene) => scene,
                    None => {
                        warn!(
                            "run_scene: did not find a scene: {} that shared lights with group {}",
                            scene_name, group_name
                        );
                        return Ok(false);
                    }
                }
            }
        };

        self.activate_scene(*group_id, &scene.id, transition_time)
            .await?;
        Ok(true)
    }

    pub async fn delete_scene(&self, scene_id: &str) -> Result<Vec<ApiResponse>> {
        self.bridge
            .delete_replies(&format!("/scenes/{}", scene_id))
            .await
    }
}
