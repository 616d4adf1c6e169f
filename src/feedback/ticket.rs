use crate::feedback::canvas::ScreenSize;
use crate::settings::Settings;
use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use sysinfo::System;
use url::Url;

/// Server-assigned ticket identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketId(String);

impl TicketId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of the create-ticket call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub comment: String,
    pub app_version: String,
    pub device: String,
    pub height: f32,
    pub os_name: String,
    pub width: f32,
}

impl NewTicket {
    pub fn new(comment: &str, device: &DeviceInfo, screen: ScreenSize) -> Self {
        Self {
            comment: comment.to_string(),
            app_version: device.app_version.clone(),
            device: device.device.clone(),
            height: screen.height,
            os_name: device.os_name.clone(),
            width: screen.width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenshotUpload<'a> {
    pub image: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedTicket {
    #[serde(default)]
    id: Value,
}

/// Fixed metadata sent with every ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub app_version: String,
    pub device: String,
    pub os_name: String,
}

impl DeviceInfo {
    /// Configured values win; anything unset is read from the host system.
    pub fn detect(settings: &Settings) -> Self {
        let device = settings
            .device_name
            .clone()
            .or_else(System::host_name)
            .unwrap_or_else(|| "unknown".into());
        let os_name = settings
            .os_name
            .clone()
            .or_else(System::name)
            .unwrap_or_else(|| std::env::consts::OS.to_string());
        Self {
            app_version: settings.app_version.clone(),
            device,
            os_name,
        }
    }
}

pub trait TicketApi: Send + Sync {
    fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketId>;
    fn attach_screenshot(&self, id: &TicketId, image: &str) -> Result<()>;
}

/// Creates the ticket, then attaches the image to it. The attach call is only
/// made once a ticket id is known.
pub fn submit_ticket(api: &dyn TicketApi, ticket: &NewTicket, image: &str) -> Result<TicketId> {
    let id = api.create_ticket(ticket).context("create ticket")?;
    tracing::info!(ticket = %id, "ticket created");
    api.attach_screenshot(&id, image)
        .with_context(|| format!("attach screenshot to ticket {id}"))?;
    Ok(id)
}

/// URLs of the ticket endpoints for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketEndpoints {
    project: Url,
}

impl TicketEndpoints {
    pub fn new(base_url: &str, project_id: &str) -> Result<Self> {
        if project_id.trim().is_empty() {
            bail!("ticket project id is empty");
        }
        let mut project =
            Url::parse(base_url).with_context(|| format!("invalid ticket base url {base_url}"))?;
        project
            .path_segments_mut()
            .map_err(|_| anyhow!("ticket base url cannot carry a path: {base_url}"))?
            .pop_if_empty()
            .extend(["projects", project_id]);
        Ok(Self { project })
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.project.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    pub fn tickets(&self) -> Url {
        self.with_segments(&["tickets"])
    }

    pub fn screenshot(&self, id: &TicketId) -> Url {
        self.with_segments(&["tickets", id.as_str(), "screenshot"])
    }
}

pub struct HttpTicketApi {
    client: Client,
    endpoints: TicketEndpoints,
}

impl HttpTicketApi {
    pub fn new(endpoints: TicketEndpoints, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("snap_ticket/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("build ticket http client")?;
        Ok(Self { client, endpoints })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let endpoints = TicketEndpoints::new(&settings.api_base_url, &settings.project_id)?;
        Self::new(
            endpoints,
            settings.request_timeout_secs.map(Duration::from_secs),
        )
    }

    fn post_json<T: Serialize + ?Sized>(&self, url: Url, body: &T) -> Result<Response> {
        let payload = serde_json::to_vec(body).context("serialize request body")?;
        let resp = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload)
            .send()
            .with_context(|| format!("POST {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("POST {url} returned {status}");
        }
        Ok(resp)
    }
}

impl TicketApi for HttpTicketApi {
    fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketId> {
        let resp = self.post_json(self.endpoints.tickets(), ticket)?;
        let bytes = resp.bytes().context("read create-ticket response")?;
        let created: CreatedTicket =
            serde_json::from_slice(&bytes).context("parse create-ticket response")?;
        ticket_id_from_value(created.id)
    }

    fn attach_screenshot(&self, id: &TicketId, image: &str) -> Result<()> {
        self.post_json(self.endpoints.screenshot(id), &ScreenshotUpload { image })?;
        Ok(())
    }
}

fn ticket_id_from_value(value: Value) -> Result<TicketId> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(TicketId(s)),
        Value::Number(n) => Ok(TicketId(n.to_string())),
        other => Err(anyhow!("create-ticket response has no usable id: {other}")),
    }
}
