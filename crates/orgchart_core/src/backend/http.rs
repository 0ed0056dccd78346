//! REST directory client.
//!
//! # Responsibility
//! - Call the dashboard API endpoints for root data, executive members and
//!   parent updates.
//! - Map wire payloads into collaborator records.
//!
//! # Invariants
//! - One cookie-carrying client per backend, so session cookies issued at
//!   login accompany every request.
//! - No request timeout unless configured.
//! - HTTP 401 is always reported as `BackendError::Unauthorized`.

use super::{BackendError, BackendResult, OrgBackend};
use crate::config::ApiConfig;
use crate::model::record::{MemberRecord, RootRecord, SecretaryRecord, UpdateOutcome};
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{StatusCode, Url};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

const CEO_DATA_PATH: &str = "/ceo-data";
const EC_MEMBERS_PATH: &str = "/members/ec";
const UPDATE_PARENT_PATH: &str = "/members/update-parent";

/// Blocking REST implementation of `OrgBackend`.
pub struct HttpOrgBackend {
    client: Client,
    base_url: String,
}

impl HttpOrgBackend {
    /// Builds a client for `config.base_url`.
    ///
    /// # Errors
    /// - `Transport` when the HTTP client cannot be constructed (TLS init).
    pub fn new(config: &ApiConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(
        &self,
        method: &'static str,
        path: &str,
        request: RequestBuilder,
    ) -> BackendResult<(StatusCode, String)> {
        let started_at = Instant::now();
        let response = request.send().map_err(|err| {
            warn!(
                "event=directory_request module=backend status=error method={method} path={path} duration_ms={} error_code=transport",
                started_at.elapsed().as_millis()
            );
            BackendError::Transport(err.to_string())
        })?;

        let status = response.status();
        debug!(
            "event=directory_request module=backend status=ok method={method} path={path} http_status={} duration_ms={}",
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
        let body = response
            .text()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok((status, body))
    }
}

impl OrgBackend for HttpOrgBackend {
    fn fetch_root(&self) -> BackendResult<Option<RootRecord>> {
        let request = self.client.get(self.endpoint(CEO_DATA_PATH));
        let (status, body) = self.send("GET", CEO_DATA_PATH, request)?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        ensure_success(status)?;
        parse_ceo_data(&body)
    }

    fn fetch_members(&self) -> BackendResult<Vec<MemberRecord>> {
        let request = self.client.get(self.endpoint(EC_MEMBERS_PATH));
        let (status, body) = self.send("GET", EC_MEMBERS_PATH, request)?;
        ensure_success(status)?;
        parse_ec_members(&body)
    }

    fn update_parent(
        &self,
        node_id: &str,
        new_parent_id: Option<&str>,
    ) -> BackendResult<UpdateOutcome> {
        let url = update_parent_url(&self.base_url, node_id)?;
        let request = self
            .client
            .put(url)
            .json(&UpdateParentBody {
                parent_member_id: new_parent_id,
            });
        let (status, body) = self.send("PUT", UPDATE_PARENT_PATH, request)?;
        ensure_success(status)?;
        parse_update_result(&body)
    }
}

/// `{base}/members/update-parent/{node_id}` with `node_id` as one encoded
/// path segment.
fn update_parent_url(base_url: &str, node_id: &str) -> BackendResult<Url> {
    let invalid = |reason: String| BackendError::Transport(format!("invalid api url: {reason}"));
    let mut url = Url::parse(&format!("{base_url}{UPDATE_PARENT_PATH}"))
        .map_err(|err| invalid(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid(format!("`{base_url}` cannot carry a path")))?
        .push(node_id);
    Ok(url)
}

fn ensure_success(status: StatusCode) -> BackendResult<()> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(BackendError::Unauthorized);
    }
    if !status.is_success() {
        return Err(BackendError::Status(status.as_u16()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct CeoDataWire {
    #[serde(rename = "memberId", default, deserialize_with = "de_opt_id")]
    member_id: Option<String>,
    #[serde(rename = "Secretaries", default)]
    secretaries: Option<Vec<SecretaryWire>>,
}

#[derive(Debug, Deserialize)]
struct SecretaryWire {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "photoPath", default)]
    photo_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default = "Option::default")]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct EcMemberWire {
    #[serde(rename = "memberId", deserialize_with = "de_id")]
    member_id: String,
    #[serde(rename = "representiveName", default)]
    representive_name: Option<String>,
    #[serde(rename = "ecPosition", default)]
    ec_position: Option<String>,
    #[serde(rename = "companyOrIndividualImage", default)]
    image: Option<String>,
    #[serde(rename = "parentMemberId", default, deserialize_with = "de_opt_id")]
    parent_member_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateParentBody<'a> {
    #[serde(rename = "parentMemberId")]
    parent_member_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SuccessWire {
    #[serde(default)]
    success: bool,
}

pub(crate) fn parse_ceo_data(body: &str) -> BackendResult<Option<RootRecord>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let wire: CeoDataWire =
        serde_json::from_str(trimmed).map_err(|err| BackendError::Decode(err.to_string()))?;
    let Some(member_id) = wire.member_id else {
        return Ok(None);
    };

    Ok(Some(RootRecord {
        id: member_id,
        name: None,
        title: None,
        image_ref: None,
        secretaries: wire
            .secretaries
            .unwrap_or_default()
            .into_iter()
            .map(|secretary| SecretaryRecord {
                name: secretary.name,
                image_ref: secretary.photo_path,
            })
            .collect(),
    }))
}

pub(crate) fn parse_ec_members(body: &str) -> BackendResult<Vec<MemberRecord>> {
    let envelope: Envelope<Vec<EcMemberWire>> =
        serde_json::from_str(body).map_err(|err| BackendError::Decode(err.to_string()))?;
    if !envelope.success {
        warn!("event=directory_request module=backend status=rejected path={EC_MEMBERS_PATH}");
        return Ok(Vec::new());
    }

    Ok(envelope
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|member| MemberRecord {
            id: member.member_id,
            name: member.representive_name,
            title: member.ec_position,
            image_ref: member.image,
            parent_id: member.parent_member_id,
        })
        .collect())
}

pub(crate) fn parse_update_result(body: &str) -> BackendResult<UpdateOutcome> {
    let wire: SuccessWire =
        serde_json::from_str(body).map_err(|err| BackendError::Decode(err.to_string()))?;
    Ok(UpdateOutcome {
        success: wire.success,
    })
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    de_opt_id(deserializer)?.ok_or_else(|| D::Error::custom("member id must not be blank"))
}
