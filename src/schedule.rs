//! Schedules: timed commands run by the bridge.

use serde::Serialize;
use serde_json::Value;

use crate::bridge::Bridge;
use crate::errors::Error;
use crate::response::ApiResponse;
use crate::transport::Method;

type Result<T> = std::result::Result<T, Error>;

/// Description used when none is given.
pub const DEFAULT_DESCRIPTION: &str = " ";

#[derive(Debug, Serialize)]
struct Command<'a, T: Serialize> {
    method: &'a str,
    address: String,
    body: &'a T,
}

#[derive(Debug, Serialize)]
struct NewSchedule<'a, T: Serialize> {
    name: &'a str,
    localtime: &'a str,
    description: &'a str,
    command: Command<'a, T>,
}

/// Schedule accessor of a bridge.
#[derive(Debug, Clone)]
pub struct Schedules {
    bridge: Bridge,
}

impl Schedules {
    pub(crate) fn new(bridge: Bridge) -> Self {
        Schedules { bridge }
    }

    pub async fn get_schedules(&self) -> Result<Value> {
        self.bridge.get_resource("/schedules").await
    }

    pub async fn get_schedule(&self, id: u32) -> Result<Value> {
        self.bridge.get_resource(&format!("/schedules/{}", id)).await
    }

    async fn create<T: Serialize>(
        &self,
        name: &str,
        time: &str,
        target: &str,
        body: &T,
        description: Option<&str>,
    ) -> Result<Vec<ApiResponse>> {
        let schedule = NewSchedule {
            name,
            localtime: time,
            description: description.unwrap_or(DEFAULT_DESCRIPTION),
            command: Command {
                method: Method::Put.as_ref(),
                address: format!("{}{}", self.bridge.api_prefix()?, target),
                body,
            },
        };
        let data = serde_json::to_value(&schedule).map_err(Error::JsonDump)?;
        self.bridge.post_replies("/schedules", &data).await
    }

    /// Schedule a state change of one light.
    ///
    /// `time` is a bridge local time such as `2024-05-01T07:30:00` or a
    /// recurring pattern like `W124/T07:30:00`.
    pub async fn create_schedule<T: Serialize>(
        &self,
        name: &str,
        time: &str,
        light_id: u32,
        body: &T,
        description: Option<&str>,
    ) -> Result<Vec<ApiResponse>> {
        let target = format!("/lights/{}/state", light_id);
        self.create(name, time, &target, body, description).await
    }

    /// Schedule a state change of a group.
    pub async fn create_group_schedule<T: Serialize>(
        &self,
        name: &str,
        time: &str,
        group_id: u32,
        body: &T,
        description: Option<&str>,
    ) -> Result<Vec<ApiResponse>> {
        let target = format!("/groups/{}/action", group_id);
        self.create(name, time, &target, body, description).await
    }

    pub async fn set_schedule_attributes(&self, id: u32, attributes: &Value) -> Result<Vec<ApiResponse>> {
        self.bridge
            .put_replies(&format!("/schedules/{}", id), attributes)
            .await
    }

    pub async fn delete_schedule(&self, id: u32) -> Result<Vec<ApiResponse>> {
        self.bridge
            .delete_replies(&format!("/schedules/{}", id))
            .await
    }
}
