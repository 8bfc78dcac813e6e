//! Property tests for host resolution.

use std::collections::HashSet;

use proptest::prelude::*;

use drone_digitalocean::config::HostSelector;
use drone_digitalocean::domain::ports::{DropletRecord, LoadBalancerRecord};
use drone_digitalocean::domain::services::InventoryResolver;
use drone_digitalocean::error::InventoryError;

use crate::common::FakeInventory;

fn address() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => (1u8..=254).prop_map(|n| Some(format!("203.0.113.{}", n))),
        1 => Just(None),
        1 => Just(Some(String::new())),
        1 => Just(Some("fe80::1".to_string())),
    ]
}

fn droplets() -> impl Strategy<Value = Vec<DropletRecord>> {
    proptest::collection::vec((0u64..16, address()), 0..24).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(id, ip)| DropletRecord::new(id, ip.as_deref()))
            .collect()
    })
}

/// First record per ID, in listing order
fn first_per_id(droplets: &[DropletRecord]) -> Vec<&DropletRecord> {
    let mut seen = HashSet::new();
    droplets.iter().filter(|d| seen.insert(d.id)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: hosts are unique members in listing order, and every
    /// member is either a host or skipped.
    #[test]
    fn property_load_balancer_resolution(
        droplets in droplets(),
        members in proptest::collection::vec(0u64..16, 0..10),
    ) {
        let inventory = FakeInventory {
            load_balancers: vec![LoadBalancerRecord {
                name: "lb1".to_string(),
                droplet_ids: members.clone(),
            }],
            droplets: droplets.clone(),
            ..Default::default()
        };
        let members: HashSet<u64> = members.into_iter().collect();
        let expected: Vec<u64> = first_per_id(&droplets)
            .into_iter()
            .filter(|d| members.contains(&d.id))
            .map(|d| d.id)
            .collect();

        match InventoryResolver::new(&inventory).resolve(HostSelector::LoadBalancer("lb1")) {
            Ok(resolved) => {
                let mut covered: Vec<u64> = resolved.hosts.iter().map(|h| h.id()).collect();
                let unique: HashSet<u64> = covered.iter().copied().collect();
                prop_assert_eq!(unique.len(), covered.len());
                prop_assert!(!resolved.hosts.is_empty());

                covered.extend(&resolved.skipped_ids);
                let mut sorted_expected = expected.clone();
                sorted_expected.sort_unstable();
                covered.sort_unstable();
                prop_assert_eq!(covered, sorted_expected);

                // Hosts keep the listing order
                let host_ids: Vec<u64> = resolved.hosts.iter().map(|h| h.id()).collect();
                let ordered: Vec<u64> = expected
                    .iter()
                    .copied()
                    .filter(|id| host_ids.contains(id))
                    .collect();
                prop_assert_eq!(host_ids, ordered);
            }
            Err(InventoryError::NoHostsFound { .. }) => {
                let usable = first_per_id(&droplets).into_iter().any(|d| {
                    members.contains(&d.id)
                        && d.public_ipv4.as_deref().is_some_and(|ip| ip.parse::<std::net::Ipv4Addr>().is_ok())
                });
                prop_assert!(!usable);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    /// PROPERTY: tag resolution never yields an empty host list.
    #[test]
    fn property_tag_resolution_is_never_empty(droplets in droplets()) {
        let inventory = FakeInventory::tagged(droplets);
        if let Ok(resolved) = InventoryResolver::new(&inventory).resolve(HostSelector::Tag("web")) {
            prop_assert!(!resolved.hosts.is_empty());
            for host in &resolved.hosts {
                prop_assert!(!resolved.skipped_ids.contains(&host.id()));
            }
        }
    }
}
