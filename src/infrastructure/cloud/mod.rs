//! Cloud inventory adapters

mod digitalocean;

pub use digitalocean::{DigitalOceanClient, DEFAULT_API_URL};
