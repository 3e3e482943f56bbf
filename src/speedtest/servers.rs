//! Speed test server list entries

use crate::{models::ServerInfo, AppError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// One entry of the speedtest.net server list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// The server's `upload.php` endpoint; every other endpoint is a sibling
    pub url: String,
    /// City the server is in
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    /// Operator hosting the server
    #[serde(default)]
    pub sponsor: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub host: String,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl ServerEntry {
    pub fn upload_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.url)?)
    }

    fn sibling(&self, file: &str) -> Result<Url> {
        Ok(self.upload_url()?.join(file)?)
    }

    pub fn latency_url(&self) -> Result<Url> {
        self.sibling("latency.txt")
    }

    /// URL of the `size`x`size` test image
    pub fn download_url(&self, size: u32) -> Result<Url> {
        self.sibling(&format!("random{0}x{0}.jpg", size))
    }

    /// Host label for logs
    pub fn label(&self) -> &str {
        if self.host.is_empty() {
            &self.url
        } else {
            &self.host
        }
    }

    /// Identity stored in the result record
    pub fn server_info(&self) -> ServerInfo {
        ServerInfo::new(&self.sponsor, &self.name, &self.country)
    }
}

/// A server chosen for the run, with its measured latency
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedServer {
    pub entry: ServerEntry,
    pub latency_ms: f64,
}

impl SelectedServer {
    pub fn server_info(&self) -> ServerInfo {
        self.entry.server_info()
    }
}

/// Parse the JSON server list body
pub fn parse_server_list(body: &str) -> Result<Vec<ServerEntry>> {
    let servers: Vec<ServerEntry> = serde_json::from_str(body)?;
    if servers.is_empty() {
        return Err(AppError::measurement("Speed test server list is empty"));
    }
    Ok(servers)
}
