//! Signal collection
//!
//! Turns httpx records into the inputs of the decision core:
//! - a [`SignalSet`] for the inference engine
//! - a [`PassiveObservation`] for the posture assessment

use tracing::debug;

use orion_core::{PassiveObservation, Signal, SignalKind, SignalSet, SignalStrength};

use crate::HttpxRecord;

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn first_of<F>(records: &[HttpxRecord], field: F) -> Option<String>
where
    F: Fn(&HttpxRecord) -> Option<String>,
{
    records.iter().find_map(field)
}

/// Third-party services seen in front of or inside the target
fn third_party_services(records: &[HttpxRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| non_empty(r.cdn_name.as_deref()))
        .collect()
}

/// Derive engine signals from a batch of httpx records
///
/// `asn` and `isp` come from the first record carrying ASN data, so the
/// pair always describes the same network. `third_party_services` is only
/// emitted when there was at least one record to look at; an empty list
/// then means "none seen", which the engine reads differently from absence.
pub fn collect_signals(records: &[HttpxRecord]) -> SignalSet {
    let mut signals = SignalSet::new();

    let asn = records
        .iter()
        .filter_map(|r| r.asn.as_ref())
        .find(|asn| non_empty(asn.as_number.as_deref()).is_some());
    if let Some(asn) = asn {
        if let Some(number) = non_empty(asn.as_number.as_deref()) {
            signals.insert(
                Signal::builder("asn", number)
                    .strength(SignalStrength::Strong)
                    .build(),
            );
        }
        if let Some(isp) = non_empty(asn.as_name.as_deref()) {
            signals.insert(
                Signal::builder("isp", isp)
                    .strength(SignalStrength::Strong)
                    .build(),
            );
        }
    }

    let providers: Vec<String> = records
        .iter()
        .filter_map(|r| r.asn.as_ref())
        .filter_map(|asn| non_empty(asn.as_name.as_deref()))
        .collect();
    if !providers.is_empty() {
        signals.insert(Signal::builder("hosting_providers", providers).build());
    }

    if !records.is_empty() {
        signals.insert(
            Signal::builder("third_party_services", third_party_services(records))
                .kind(SignalKind::Behavioral)
                .build(),
        );
    }

    if let Some(server) = first_of(records, HttpxRecord::server) {
        signals.insert(
            Signal::builder("server", server)
                .kind(SignalKind::Residual)
                .strength(SignalStrength::Weak)
                .build(),
        );
    }
    if let Some(powered_by) = first_of(records, |r| r.header_value("x-powered-by")) {
        signals.insert(
            Signal::builder("powered_by", powered_by)
                .kind(SignalKind::Residual)
                .strength(SignalStrength::Weak)
                .build(),
        );
    }
    if let Some(ip) = first_of(records, |r| non_empty(r.host.as_deref())) {
        signals.insert(Signal::builder("ip", ip).build());
    }

    debug!(
        "Collected {} signals from {} records",
        signals.len(),
        records.len()
    );
    signals
}

/// Passive facts about the first endpoints that disclosed them
pub fn passive_observation(records: &[HttpxRecord]) -> PassiveObservation {
    PassiveObservation {
        server: first_of(records, HttpxRecord::server),
        powered_by: first_of(records, |r| r.header_value("x-powered-by")),
        ip: first_of(records, |r| non_empty(r.host.as_deref())),
    }
}
