//! Probe configuration.
//!
//! A [`MetricsConfig`] is built once through [`MetricsConfigBuilder`] and
//! handed to an [`Exporter`](crate::exporter::Exporter). Identifier defaults
//! come from an explicitly injected [`IdentifierProvider`], so two probes in
//! one process never share hidden generator state and tests can pin
//! identifiers down.

use rand::{Rng, rng};
use std::collections::HashMap;
use std::time::Duration;

const RUNES_IDENTIFIER: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const LEN_IDENTIFIER: usize = 6;

const DEFAULT_REFRESH_EVERY: Duration = Duration::from_millis(2000);

pub(crate) const DEFAULT_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Source of short identifiers for configuration defaults.
pub trait IdentifierProvider {
    /// Returns a new short identifier, without any prefix.
    fn generate(&self) -> String;
}

/// Default identifier source, drawing short alphanumeric strings from the
/// thread-local generator.
#[derive(Default, Debug, Copy, Clone)]
pub struct RandomIdentifierProvider;

impl IdentifierProvider for RandomIdentifierProvider {
    fn generate(&self) -> String {
        let mut rng = rng();

        (0..LEN_IDENTIFIER)
            .map(|_| {
                let idx = rng.random_range(0..RUNES_IDENTIFIER.len());
                RUNES_IDENTIFIER[idx] as char
            })
            .collect()
    }
}

/// Settings of one measurement probe.
///
/// The polling cadence fields describe how the embedding application drives
/// its collector; the crate itself never schedules anything.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Interval between two snapshots. Informational.
    pub(crate) refresh_every: Duration,
    /// Delay before the first snapshot. Informational.
    pub(crate) start_after: Duration,
    /// Measurement duration cap, `None` to run until an explicit stop.
    /// Informational.
    pub(crate) stop_after: Option<Duration>,
    /// When true, tickets embed the full retained sequence.
    pub(crate) record: bool,
    /// When true, snapshots are retained for ticket generation. When false,
    /// `add_report` is a no-op and memory stays flat.
    pub(crate) ticket: bool,
    /// Name of the measured peer connection.
    pub(crate) pname: String,
    /// Call identifier.
    pub(crate) cid: String,
    /// User identifier.
    pub(crate) uid: String,
    /// Identity of the measuring agent, stamped into tickets.
    pub(crate) agent: String,
    /// Raw stats fields to copy through unmodified, keyed by stats entry
    /// type, e.g. `{"inbound-rtp": ["jitter", "bytesReceived"]}`.
    pub(crate) passthrough: HashMap<String, Vec<String>>,
}

impl MetricsConfig {
    pub fn refresh_every(&self) -> Duration {
        self.refresh_every
    }

    pub fn start_after(&self) -> Duration {
        self.start_after
    }

    pub fn stop_after(&self) -> Option<Duration> {
        self.stop_after
    }

    pub fn record(&self) -> bool {
        self.record
    }

    pub fn ticket(&self) -> bool {
        self.ticket
    }

    pub fn pname(&self) -> &str {
        &self.pname
    }

    pub fn call_id(&self) -> &str {
        &self.cid
    }

    pub fn user_id(&self) -> &str {
        &self.uid
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn passthrough(&self) -> &HashMap<String, Vec<String>> {
        &self.passthrough
    }
}

/// Builds a [`MetricsConfig`], filling unset identifiers from an
/// [`IdentifierProvider`].
#[derive(Default, Debug, Clone)]
pub struct MetricsConfigBuilder {
    refresh_every: Option<Duration>,
    start_after: Option<Duration>,
    stop_after: Option<Duration>,
    record: bool,
    ticket: Option<bool>,
    pname: Option<String>,
    cid: Option<String>,
    uid: Option<String>,
    agent: Option<String>,
    passthrough: HashMap<String, Vec<String>>,
}

impl MetricsConfigBuilder {
    pub fn new() -> Self {
        MetricsConfigBuilder::default()
    }

    pub fn with_refresh_every(mut self, refresh_every: Duration) -> Self {
        self.refresh_every = Some(refresh_every);
        self
    }

    pub fn with_start_after(mut self, start_after: Duration) -> Self {
        self.start_after = Some(start_after);
        self
    }

    pub fn with_stop_after(mut self, stop_after: Duration) -> Self {
        self.stop_after = Some(stop_after);
        self
    }

    pub fn with_record(mut self, record: bool) -> Self {
        self.record = record;
        self
    }

    pub fn with_ticket(mut self, ticket: bool) -> Self {
        self.ticket = Some(ticket);
        self
    }

    pub fn with_pname(mut self, pname: String) -> Self {
        self.pname = Some(pname);
        self
    }

    pub fn with_cid(mut self, cid: String) -> Self {
        self.cid = Some(cid);
        self
    }

    pub fn with_uid(mut self, uid: String) -> Self {
        self.uid = Some(uid);
        self
    }

    pub fn with_agent(mut self, agent: String) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_passthrough(mut self, passthrough: HashMap<String, Vec<String>>) -> Self {
        self.passthrough = passthrough;
        self
    }

    /// Builds the configuration with random identifier defaults.
    pub fn build(self) -> MetricsConfig {
        self.build_with(&RandomIdentifierProvider)
    }

    /// Builds the configuration, drawing any unset identifier from
    /// `provider`.
    pub fn build_with(self, provider: &dyn IdentifierProvider) -> MetricsConfig {
        MetricsConfig {
            refresh_every: self.refresh_every.unwrap_or(DEFAULT_REFRESH_EVERY),
            start_after: self.start_after.unwrap_or(Duration::ZERO),
            stop_after: self.stop_after,
            record: self.record,
            ticket: self.ticket.unwrap_or(true),
            pname: self
                .pname
                .unwrap_or_else(|| format!("p-{}", provider.generate())),
            cid: self
                .cid
                .unwrap_or_else(|| format!("c-{}", provider.generate())),
            uid: self
                .uid
                .unwrap_or_else(|| format!("u-{}", provider.generate())),
            agent: self.agent.unwrap_or_else(|| DEFAULT_AGENT.to_owned()),
            passthrough: self.passthrough,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct FixedIdentifierProvider;

    impl IdentifierProvider for FixedIdentifierProvider {
        fn generate(&self) -> String {
            "abc123".to_owned()
        }
    }

    #[test]
    fn test_builder_defaults() {
        let cfg = MetricsConfigBuilder::new().build_with(&FixedIdentifierProvider);

        assert_eq!(cfg.refresh_every(), Duration::from_millis(2000));
        assert_eq!(cfg.start_after(), Duration::ZERO);
        assert_eq!(cfg.stop_after(), None);
        assert!(!cfg.record());
        assert!(cfg.ticket());
        assert_eq!(cfg.pname(), "p-abc123");
        assert_eq!(cfg.call_id(), "c-abc123");
        assert_eq!(cfg.user_id(), "u-abc123");
        assert_eq!(cfg.agent(), DEFAULT_AGENT);
        assert!(cfg.passthrough().is_empty());
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = MetricsConfigBuilder::new()
            .with_refresh_every(Duration::from_secs(5))
            .with_stop_after(Duration::from_secs(60))
            .with_record(true)
            .with_ticket(false)
            .with_pname("conference".to_owned())
            .with_cid("call-42".to_owned())
            .with_uid("user-7".to_owned())
            .with_agent("test-agent/1.0".to_owned())
            .build_with(&FixedIdentifierProvider);

        assert_eq!(cfg.refresh_every(), Duration::from_secs(5));
        assert_eq!(cfg.stop_after(), Some(Duration::from_secs(60)));
        assert!(cfg.record());
        assert!(!cfg.ticket());
        assert_eq!(cfg.pname(), "conference");
        assert_eq!(cfg.call_id(), "call-42");
        assert_eq!(cfg.user_id(), "user-7");
        assert_eq!(cfg.agent(), "test-agent/1.0");
    }

    #[test]
    fn test_random_identifier_shape() {
        let provider = RandomIdentifierProvider;
        let id = provider.generate();

        assert_eq!(id.len(), LEN_IDENTIFIER);
        assert!(id.bytes().all(|b| RUNES_IDENTIFIER.contains(&b)));
    }
}
