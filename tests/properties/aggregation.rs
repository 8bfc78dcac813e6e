//! Property tests for outcome aggregation.

use std::net::Ipv4Addr;

use proptest::prelude::*;

use drone_digitalocean::domain::services::ResultAggregator;
use drone_digitalocean::{Host, HostError, HostErrorKind, Outcome, PipelineStage};

fn outcome(host: Host, ok: bool) -> Outcome {
    if ok {
        Outcome::done(host, vec![])
    } else {
        Outcome::failed(
            host,
            PipelineStage::PostSync,
            HostError::new(HostErrorKind::PostSync, "exit code 1"),
            vec![],
        )
    }
}

proptest! {
    /// PROPERTY: outcomes come back in host order whatever order they
    /// finished in, and the run succeeds only if every host did.
    #[test]
    fn property_report_order_and_verdict(
        results in proptest::collection::vec(any::<bool>(), 0..12),
        rotation in 0usize..12,
    ) {
        let hosts: Vec<Host> = (0..results.len())
            .map(|i| Host::new(i as u64 + 1, Ipv4Addr::new(10, 0, 0, i as u8 + 1)))
            .collect();
        let mut finished: Vec<Outcome> = hosts
            .iter()
            .zip(&results)
            .map(|(host, ok)| outcome(*host, *ok))
            .collect();
        if !finished.is_empty() {
            let shift = rotation % finished.len();
            finished.rotate_left(shift);
            finished.reverse();
        }

        let report = ResultAggregator::aggregate(&hosts, finished);

        let order: Vec<u64> = report.outcomes.iter().map(|o| o.host().id()).collect();
        let expected: Vec<u64> = hosts.iter().map(Host::id).collect();
        prop_assert_eq!(order, expected);
        prop_assert_eq!(
            report.overall_succeeded,
            !results.is_empty() && results.iter().all(|ok| *ok)
        );
        prop_assert_eq!(report.succeeded_count() + report.failed_count(), results.len());
    }
}
