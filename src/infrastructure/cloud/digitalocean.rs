//! DigitalOcean API v2 client
//!
//! Blocking `CloudInventory` implementation over the public REST API.
//! Every listing follows `links.pages.next` until the collection is
//! exhausted. A next link pointing away from the API root is refused so the
//! bearer token never leaves it.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::domain::ports::{CloudError, CloudInventory, DropletRecord, LoadBalancerRecord};
use crate::domain::value_objects::SecretString;

pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com";

const PER_PAGE: &str = "200";
const MAX_PAGES: usize = 500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `CloudInventory` backed by the DigitalOcean API
#[derive(Debug)]
pub struct DigitalOceanClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl DigitalOceanClient {
    pub fn new(token: &str) -> Result<Self, CloudError> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    /// Client against a different API root (staging, a local mock)
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, CloudError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("drone-digitalocean/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CloudError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: SecretString::new(token),
        })
    }

    /// Fetch every page of a collection
    fn fetch_all<P: Paged>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<P::Item>, CloudError> {
        let mut items = Vec::new();
        let mut request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("per_page", PER_PAGE)])
            .query(query);

        for page_number in 1..=MAX_PAGES {
            let page: P = self.get_page(request)?;
            let (page_items, next) = page.into_parts();
            trace!(path, page = page_number, items = page_items.len(), "page fetched");
            items.extend(page_items);

            match next {
                Some(next) if same_origin(&self.base_url, &next) => {
                    request = self.client.get(next)
                }
                Some(next) => {
                    return Err(CloudError::Decode(format!(
                        "refusing to follow pagination link outside {}: {}",
                        self.base_url, next
                    )))
                }
                None => {
                    debug!(path, total = items.len(), "collection fetched");
                    return Ok(items);
                }
            }
        }

        Err(CloudError::Decode(format!(
            "{} did not finish after {} pages",
            path, MAX_PAGES
        )))
    }

    fn get_page<P: DeserializeOwned>(&self, request: RequestBuilder) -> Result<P, CloudError> {
        let response = request
            .bearer_auth(self.token.expose())
            .send()
            .map_err(|e| CloudError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CloudError::Status {
                status: status.as_u16(),
                message: api_error_message(&body, status.canonical_reason()),
            });
        }

        response
            .json()
            .map_err(|e| CloudError::Decode(e.to_string()))
    }
}

impl CloudInventory for DigitalOceanClient {
    fn list_load_balancers(&self) -> Result<Vec<LoadBalancerRecord>, CloudError> {
        self.fetch_all::<LoadBalancersPage>("/v2/load_balancers", &[])
    }

    fn list_droplets(&self) -> Result<Vec<DropletRecord>, CloudError> {
        self.fetch_all::<DropletsPage>("/v2/droplets", &[])
    }

    fn list_droplets_by_tag(&self, tag: &str) -> Result<Vec<DropletRecord>, CloudError> {
        self.fetch_all::<DropletsPage>("/v2/droplets", &[("tag_name", tag)])
    }
}

/// Whether `next` has the scheme, host and port of `base`
fn same_origin(base: &str, next: &str) -> bool {
    match (Url::parse(base), Url::parse(next)) {
        (Ok(base), Ok(next)) => {
            base.scheme() == next.scheme()
                && base.host_str() == next.host_str()
                && base.port_or_known_default() == next.port_or_known_default()
        }
        _ => false,
    }
}

/// The API's `message` field, or the status reason when the body has none
fn api_error_message(body: &str, reason: Option<&str>) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }

    serde_json::from_str::<ApiError>(body)
        .map(|e| e.message)
        .ok()
        .filter(|m| !m.is_empty())
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| "unknown error".to_string())
}

// Wire types. Only the fields the resolver needs are decoded.

trait Paged: DeserializeOwned {
    type Item;

    /// Records on this page and the URL of the next one
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    pages: Option<Pages>,
}

#[derive(Debug, Default, Deserialize)]
struct Pages {
    #[serde(default)]
    next: Option<String>,
}

impl Links {
    fn next(self) -> Option<String> {
        self.pages.and_then(|p| p.next).filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct LoadBalancersPage {
    #[serde(default)]
    load_balancers: Vec<WireLoadBalancer>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Deserialize)]
struct WireLoadBalancer {
    name: String,
    #[serde(default)]
    droplet_ids: Vec<u64>,
}

impl Paged for LoadBalancersPage {
    type Item = LoadBalancerRecord;

    fn into_parts(self) -> (Vec<LoadBalancerRecord>, Option<String>) {
        let records = self
            .load_balancers
            .into_iter()
            .map(|lb| LoadBalancerRecord {
                name: lb.name,
                droplet_ids: lb.droplet_ids,
            })
            .collect();
        (records, self.links.next())
    }
}

#[derive(Debug, Deserialize)]
struct DropletsPage {
    #[serde(default)]
    droplets: Vec<WireDroplet>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Deserialize)]
struct WireDroplet {
    id: u64,
    #[serde(default)]
    networks: WireNetworks,
}

#[derive(Debug, Default, Deserialize)]
struct WireNetworks {
    #[serde(default)]
    v4: Vec<WireNetwork>,
}

#[derive(Debug, Deserialize)]
struct WireNetwork {
    ip_address: String,
    #[serde(rename = "type")]
    kind: String,
}

impl WireDroplet {
    fn public_ipv4(&self) -> Option<String> {
        self.networks
            .v4
            .iter()
            .find(|n| n.kind == "public")
            .map(|n| n.ip_address.clone())
    }
}

impl Paged for DropletsPage {
    type Item = DropletRecord;

    fn into_parts(self) -> (Vec<DropletRecord>, Option<String>) {
        let records = self
            .droplets
            .into_iter()
            .map(|d| DropletRecord {
                public_ipv4: d.public_ipv4(),
                id: d.id,
            })
            .collect();
        (records, self.links.next())
    }
}
