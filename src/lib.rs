//! # RTC Metrics - Sans-I/O WebRTC Call Quality Aggregation
//!
//! Statistical aggregation of WebRTC call quality metrics using a
//! **sans-I/O architecture**. The embedding application polls its peer
//! connections, shapes the raw counters into [`MetricSnapshot`]s and pushes
//! them in; this crate retains the sequence and turns it into a summary
//! document, a [`Ticket`], on demand. No timers, no transport, no stats
//! collection: you control scheduling and I/O, the crate owns the math.
//!
//! ## What goes in
//!
//! One [`MetricSnapshot`] per collection interval, carrying per-stream
//! audio/video metrics keyed by SSRC, candidate-pair network facts and
//! call-wide data counters. Snapshots are validated at ingestion (monotonic
//! timestamps, stable stream directions) and never reinterpreted afterwards.
//!
//! ## What comes out
//!
//! A [`Ticket`]: per-stream jitter, MOS and round-trip statistics (average,
//! minimum, maximum, volatility), call-wide packet loss, bitrate and traffic
//! aggregates, and the network paths in use. Generating a ticket is a pure
//! read over the retained sequence.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rtc_metrics::configuration::MetricsConfigBuilder;
//! use rtc_metrics::exporter::Exporter;
//! use rtc_metrics::metrics::audio::{AudioInboundMetric, AudioStreamMetric};
//! use rtc_metrics::metrics::snapshot::MetricSnapshot;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = MetricsConfigBuilder::new()
//!     .with_uid("u-alice".to_owned())
//!     .build();
//! let mut exporter = Exporter::new(cfg);
//! exporter.start();
//!
//! // Push one snapshot per collection interval.
//! let mut report = MetricSnapshot::new(1_694_000_000_000);
//! report.audio.insert(
//!     0xdead_beef,
//!     AudioStreamMetric::Inbound(AudioInboundMetric {
//!         delta_jitter_ms: 5.0,
//!         ..Default::default()
//!     }),
//! );
//! exporter.add_report(report)?;
//!
//! exporter.stop();
//! println!("{}", serde_json::to_string_pretty(&exporter.ticket())?);
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod configuration;
pub mod error;
pub mod exporter;
pub mod metrics;
pub mod reducer;

pub use configuration::{
    IdentifierProvider, MetricsConfig, MetricsConfigBuilder, RandomIdentifierProvider,
};
pub use error::{Error, Result};
pub use exporter::ticket::Ticket;
pub use exporter::{CustomEvent, Exporter};
pub use metrics::snapshot::MetricSnapshot;
pub use metrics::{Direction, MediaKind, SSRC};

/// Name of this library.
pub fn lib_name() -> &'static str {
    env!("CARGO_PKG_NAME")
}

/// Version of this library.
pub fn lib_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
