//! JSON-RPC client for the monitoring platform API

use super::{async_trait, TelemetryProvider};
use crate::error::TelemetryError;
use crate::models::{Host, HostFilter, HostStatus, ItemSample, ItemStatus, MonitoredItem, ValueType};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;
use url::Url;

const INTERFACE_TYPE_AGENT: &str = "1";
const INTERFACE_PRIMARY: &str = "1";
const HOST_STATUS_MONITORED: &str = "0";
const ITEM_STATUS_ACTIVE: &str = "0";

/// Telemetry provider backed by the platform's JSON-RPC endpoint
pub struct JsonRpcTelemetry {
    client: Client,
    url: Url,
    token: Option<String>,
    next_id: AtomicU64,
}

impl JsonRpcTelemetry {
    pub fn new(url: &str, token: Option<String>) -> Result<Self, TelemetryError> {
        let url = Url::parse(url)
            .map_err(|e| TelemetryError::Decode(format!("invalid telemetry url '{}': {}", url, e)))?;

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            url,
            token,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, TelemetryError> {
        self.request(method, params, true).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        authenticated: bool,
    ) -> Result<T, TelemetryError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        let mut request = self
            .client
            .post(self.url.clone())
            .header("Content-Type", "application/json-rpc")
            .json(&body);
        if let Some(token) = self.token.as_ref().filter(|_| authenticated) {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let envelope: RpcResponse = response.json().await?;

        if let Some(error) = envelope.error {
            return Err(TelemetryError::Api {
                code: error.code,
                message: error.message,
                data: error.data.map(|d| match d {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
            });
        }

        let result = envelope
            .result
            .ok_or_else(|| TelemetryError::Decode(format!("{} returned no result", method)))?;

        debug!(method = %method, id = id, "Telemetry call completed");

        serde_json::from_value(result)
            .map_err(|e| TelemetryError::Decode(format!("{}: {}", method, e)))
    }
}

#[async_trait]
impl TelemetryProvider for JsonRpcTelemetry {
    async fn list_hosts(&self, filter: &HostFilter) -> Result<Vec<Host>, TelemetryError> {
        let mut params = json!({
            "output": ["hostid", "name", "status"],
            "selectInterfaces": ["type", "main", "available"],
            "selectHostGroups": ["groupid"],
        });

        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            params["search"] = json!({ "name": name });
        }
        if !filter.group_ids.is_empty() {
            params["groupids"] = json!(filter.group_ids);
        }
        if !filter.show_inactive {
            params["filter"] = json!({ "status": HOST_STATUS_MONITORED });
        }

        let hosts: Vec<RawHost> = self.call("host.get", params).await?;
        Ok(hosts.into_iter().map(RawHost::into_host).collect())
    }

    async fn list_host_items(&self, host_id: &str) -> Result<Vec<MonitoredItem>, TelemetryError> {
        let params = json!({
            "output": ["itemid", "key_", "value_type", "units", "name", "status"],
            "hostids": [host_id],
            "monitored": true,
            "filter": { "status": ITEM_STATUS_ACTIVE },
        });

        let items: Vec<RawItem> = self.call("item.get", params).await?;
        Ok(items.into_iter().filter_map(RawItem::into_item).collect())
    }

    async fn latest_value(&self, item_id: &str) -> Result<Option<ItemSample>, TelemetryError> {
        let mut values = self.latest_values(&[item_id.to_string()]).await?;
        Ok(values.remove(item_id))
    }

    async fn latest_values(
        &self,
        item_ids: &[String],
    ) -> Result<HashMap<String, ItemSample>, TelemetryError> {
        if item_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let params = json!({
            "output": ["itemid", "lastvalue", "lastclock"],
            "itemids": item_ids,
        });

        let items: Vec<RawItem> = self.call("item.get", params).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let sample = item.sample()?;
                Some((item.itemid, sample))
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), TelemetryError> {
        // apiinfo.version refuses authenticated requests
        let _version: String = self.request("apiinfo.version", json!([]), false).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// The API encodes most scalars as strings but not consistently
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn text(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
        }
    }

    fn is(&self, expected: &str) -> bool {
        self.text() == expected
    }
}

#[derive(Debug, Deserialize)]
struct RawInterface {
    #[serde(rename = "type")]
    kind: Scalar,
    main: Scalar,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    groupid: Scalar,
}

#[derive(Debug, Deserialize)]
struct RawHost {
    hostid: Scalar,
    name: String,
    status: Scalar,
    #[serde(default)]
    interfaces: Vec<RawInterface>,
    #[serde(default, alias = "groups")]
    hostgroups: Vec<RawGroup>,
}

impl RawHost {
    fn into_host(self) -> Host {
        let has_agent_interface = self
            .interfaces
            .iter()
            .any(|i| i.kind.is(INTERFACE_TYPE_AGENT) && i.main.is(INTERFACE_PRIMARY));

        Host {
            host_id: self.hostid.text(),
            name: self.name,
            status: if self.status.is(HOST_STATUS_MONITORED) {
                HostStatus::Monitored
            } else {
                HostStatus::Unmonitored
            },
            has_agent_interface,
            group_ids: self.hostgroups.iter().map(|g| g.groupid.text()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    itemid: String,
    #[serde(default)]
    key_: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    value_type: Option<Scalar>,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    status: Option<Scalar>,
    #[serde(default)]
    lastvalue: Option<String>,
    #[serde(default)]
    lastclock: Option<Scalar>,
}

impl RawItem {
    fn into_item(self) -> Option<MonitoredItem> {
        let code = self.value_type.as_ref()?.text().parse::<u8>().ok()?;
        let Some(value_type) = ValueType::from_code(code) else {
            debug!(item_id = %self.itemid, value_type = code, "Skipping item with unknown value type");
            return None;
        };

        let status = match &self.status {
            Some(s) if !s.is(ITEM_STATUS_ACTIVE) => ItemStatus::Disabled,
            _ => ItemStatus::Active,
        };

        Some(MonitoredItem {
            item_id: self.itemid,
            key: self.key_.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            value_type,
            units: self.units.unwrap_or_default(),
            status,
        })
    }

    fn sample(&self) -> Option<ItemSample> {
        let timestamp = self
            .lastclock
            .as_ref()
            .and_then(|c| c.text().parse::<i64>().ok())
            .filter(|ts| *ts > 0);

        // lastclock 0 means the item never reported
        if timestamp.is_none() {
            return None;
        }

        Some(ItemSample {
            value: self.lastvalue.clone(),
            timestamp,
        })
    }
}
