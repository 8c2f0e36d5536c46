//! Prometheus metrics for the vote endpoint.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that `GET /metrics` encodes
//! into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct RpcMetrics {
    pub registry: Registry,
    /// Votes recorded in the ledger.
    pub votes_accepted: IntCounter,
    /// Votes turned away, labelled by reason.
    pub votes_rejected: IntCounterVec,
}

impl RpcMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let votes_accepted = register_int_counter_with_registry!(
            Opts::new("tally_votes_accepted_total", "Votes recorded in the ledger"),
            registry
        )
        .expect("failed to register votes_accepted");

        let votes_rejected = register_int_counter_vec_with_registry!(
            Opts::new("tally_votes_rejected_total", "Votes rejected, by reason"),
            &["reason"],
            registry
        )
        .expect("failed to register votes_rejected");

        Self {
            registry,
            votes_accepted,
            votes_rejected,
        }
    }

    /// Encode every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for RpcMetrics {
    fn default() -> Self {
        Self::new()
    }
}
