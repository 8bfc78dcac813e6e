//! Common test utilities for drone-digitalocean integration tests.
//!
//! - `FakeInventory`: in-memory `CloudInventory`
//! - `SharedBuffer`: a `Write` target the test can read back
//! - `plugin_command`: the plugin binary with a scrubbed environment
//! - `droplets_body`: a DigitalOcean droplets page for `mockito` servers

#![allow(dead_code)]

use std::io::{self, Write};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use drone_digitalocean::domain::ports::{
    CloudError, CloudInventory, DropletRecord, LoadBalancerRecord,
};

/// Every variable the plugin reads, so a developer's shell cannot leak in
pub const PLUGIN_VARS: &[&str] = &[
    "PLUGIN_LOADBALANCER",
    "PLUGIN_TAG",
    "PLUGIN_SSH_USER",
    "PLUGIN_SSH_KEY_PATH",
    "PLUGIN_SSH_KEY",
    "PLUGIN_SSH_PASSWORD",
    "PLUGIN_SSH_PORT",
    "PLUGIN_SSH_TIMEOUT",
    "PLUGIN_PAT",
    "PLUGIN_SOURCE",
    "PLUGIN_TARGET",
    "PLUGIN_PRE_SYNC",
    "PLUGIN_POST_SYNC",
    "PLUGIN_CONCURRENCY",
    "PLUGIN_COMMAND_TIMEOUT",
    "PLUGIN_DRY_RUN",
    "PLUGIN_API_URL",
    "PLUGIN_ENV_FILE",
    "TAG",
    "SSH_USER",
    "SSH_KEY_PATH",
    "SSH_KEY",
    "SSH_PASSWORD",
    "SSH_PORT",
    "SSH_TIMEOUT",
    "PAT",
    "SOURCE",
    "TARGET",
    "PRE_SYNC",
    "POST_SYNC",
    "RUST_LOG",
];

/// The plugin binary with none of its variables inherited
pub fn plugin_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_drone-digitalocean"));
    for var in PLUGIN_VARS {
        cmd.env_remove(var);
    }
    // Nothing listens here; any test reaching the API fails fast
    cmd.env("PLUGIN_API_URL", "http://127.0.0.1:9");
    cmd
}

/// In-memory cloud inventory
#[derive(Default)]
pub struct FakeInventory {
    pub load_balancers: Vec<LoadBalancerRecord>,
    pub droplets: Vec<DropletRecord>,
    pub tagged: Vec<DropletRecord>,
    pub fail_with: Option<CloudError>,
    pub calls: AtomicUsize,
}

impl FakeInventory {
    pub fn tagged(droplets: Vec<DropletRecord>) -> Self {
        Self {
            tagged: droplets,
            ..Default::default()
        }
    }

    pub fn behind_load_balancer(name: &str, members: &[u64], droplets: Vec<DropletRecord>) -> Self {
        Self {
            load_balancers: vec![LoadBalancerRecord {
                name: name.to_string(),
                droplet_ids: members.to_vec(),
            }],
            droplets,
            ..Default::default()
        }
    }

    pub fn failing(error: CloudError) -> Self {
        Self {
            fail_with: Some(error),
            ..Default::default()
        }
    }

    /// Number of list calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer<T: Clone>(&self, records: &[T]) -> Result<Vec<T>, CloudError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(records.to_vec()),
        }
    }
}

impl CloudInventory for FakeInventory {
    fn list_load_balancers(&self) -> Result<Vec<LoadBalancerRecord>, CloudError> {
        self.answer(&self.load_balancers)
    }

    fn list_droplets(&self) -> Result<Vec<DropletRecord>, CloudError> {
        self.answer(&self.droplets)
    }

    fn list_droplets_by_tag(&self, _tag: &str) -> Result<Vec<DropletRecord>, CloudError> {
        self.answer(&self.tagged)
    }
}

/// Droplet `id` at 10.0.0.`id`
pub fn droplet(id: u64) -> DropletRecord {
    DropletRecord::new(id, Some(&format!("10.0.0.{}", id)))
}

/// Cloneable in-memory writer
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Parse every line as JSON
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.text()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A droplets page body
pub fn droplets_body(droplets: &[(u64, &str)], next: Option<&str>) -> String {
    let droplets: Vec<serde_json::Value> = droplets
        .iter()
        .map(|(id, ip)| {
            serde_json::json!({
                "id": id,
                "name": format!("web-{}", id),
                "networks": { "v4": [
                    { "ip_address": "10.10.0.1", "type": "private" },
                    { "ip_address": ip, "type": "public" }
                ]}
            })
        })
        .collect();
    let links = match next {
        Some(next) => serde_json::json!({ "pages": { "next": next } }),
        None => serde_json::json!({}),
    };
    serde_json::json!({ "droplets": droplets, "links": links }).to_string()
}
