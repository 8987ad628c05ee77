//! Ticket document model.
//!
//! A ticket is a derived summary of one measurement session, produced on
//! demand by [`Exporter::ticket`](crate::exporter::Exporter::ticket) and
//! meant to be serialized and shipped as-is. Key spellings follow the
//! established document format: statistics blocks annotate their units under
//! `_unit`, while the call-level packet-loss, bitrate and traffic blocks use
//! a `unit` sibling.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::exporter::CustomEvent;
use crate::metrics::snapshot::MetricSnapshot;
use crate::metrics::{Direction, MediaKind, SSRC};

/// Version of the ticket document schema.
pub const TICKET_VERSION: &str = "1.0";

/// Units of the four statistics of a block.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct UnitBlock {
    pub avg: &'static str,
    pub min: &'static str,
    pub max: &'static str,
    pub volatility: &'static str,
}

impl UnitBlock {
    pub(crate) const MS: UnitBlock = UnitBlock {
        avg: "ms",
        min: "ms",
        max: "ms",
        volatility: "percent",
    };

    pub(crate) const MOS: UnitBlock = UnitBlock {
        avg: "number (1-5)",
        min: "number (1-5)",
        max: "number (1-5)",
        volatility: "percent",
    };

    pub(crate) const KBS: UnitBlock = UnitBlock {
        avg: "kbs",
        min: "kbs",
        max: "kbs",
        volatility: "percent",
    };

    pub(crate) const KBYTES: UnitBlock = UnitBlock {
        avg: "KBytes",
        min: "KBytes",
        max: "KBytes",
        volatility: "percent",
    };
}

/// Average, extrema and relative dispersion of one series.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct StatValues {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub volatility: f64,
}

/// A [`StatValues`] together with its unit annotation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct StatBlock {
    #[serde(flatten)]
    pub values: StatValues,
    #[serde(rename = "_unit")]
    pub unit: UnitBlock,
}

/// Mean Opinion Score statistics of a received audio stream, under both
/// scoring models.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct MosBlock {
    /// E-model based score.
    pub emodel: StatValues,
    /// Effective score.
    pub effective: StatValues,
    #[serde(rename = "_unit")]
    pub unit: UnitBlock,
}

/// Per-stream summary: jitter for every stream, plus scores for received
/// audio and round-trip time for sent streams.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SsrcStats {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub direction: Direction,
    pub jitter: StatBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mos: Option<MosBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtt: Option<StatBlock>,
}

/// Identity of the measuring side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserAgentSection {
    pub agent: String,
    pub pname: String,
    pub user_id: String,
}

/// Identity of the call and its event timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSection {
    pub call_id: String,
    pub events: Vec<CustomEvent>,
}

/// Raw material of the session: how many snapshots were taken, the full
/// sequence when recording is enabled, and the reference snapshot if one was
/// saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsSection {
    pub count: usize,
    pub reports: Vec<MetricSnapshot>,
    pub reference: Option<MetricSnapshot>,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PacketsLostValue {
    pub avg: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct KindPacketsLost {
    #[serde(rename = "in")]
    pub inbound: PacketsLostValue,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PacketsLostUnit {
    pub avg: &'static str,
}

/// Received packet loss per media kind, in percent of packets expected.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PacketsLostSection {
    pub audio: KindPacketsLost,
    pub video: KindPacketsLost,
    pub unit: PacketsLostUnit,
}

/// A statistics pair for both directions of flow, sharing one unit
/// annotation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DirectionalStats {
    #[serde(rename = "in")]
    pub inbound: StatValues,
    #[serde(rename = "out")]
    pub outbound: StatValues,
    pub unit: UnitBlock,
}

/// Network paths selected on each side of the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSection {
    pub local_connection: String,
    pub remote_connection: String,
}

/// Call-level aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSection {
    pub rtt: StatBlock,
    #[serde(rename = "packetsLost")]
    pub packets_lost: PacketsLostSection,
    pub bitrate: DirectionalStats,
    pub traffic: DirectionalStats,
    pub network: NetworkSection,
}

/// Summary document of one measurement session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    pub version: &'static str,
    pub started: Option<DateTime<Utc>>,
    pub ended: Option<DateTime<Utc>>,
    pub ua: UserAgentSection,
    pub call: CallSection,
    pub details: DetailsSection,
    /// Per-stream summaries from the most recent snapshot's streams, keyed
    /// by SSRC. Empty when no snapshot was retained.
    pub ssrc: BTreeMap<SSRC, SsrcStats>,
    pub data: DataSection,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ssrc_stats_serialization_shape() {
        let stats = SsrcStats {
            kind: MediaKind::Audio,
            direction: Direction::Inbound,
            jitter: StatBlock {
                values: StatValues {
                    avg: 10.0,
                    min: 5.0,
                    max: 15.0,
                    volatility: 33.0,
                },
                unit: UnitBlock::MS,
            },
            mos: Some(MosBlock {
                emodel: StatValues {
                    avg: 4.3,
                    min: 4.1,
                    max: 4.5,
                    volatility: 2.0,
                },
                effective: StatValues {
                    avg: 4.2,
                    min: 4.0,
                    max: 4.4,
                    volatility: 2.0,
                },
                unit: UnitBlock::MOS,
            }),
            rtt: None,
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["type"], "audio");
        assert_eq!(json["direction"], "inbound");
        assert_eq!(json["jitter"]["avg"], 10.0);
        assert_eq!(json["jitter"]["_unit"]["volatility"], "percent");
        assert_eq!(json["mos"]["_unit"]["avg"], "number (1-5)");
        // Absent blocks are omitted entirely.
        assert!(json.get("rtt").is_none());
    }

    #[test]
    fn test_data_section_key_spellings() {
        let data = DataSection {
            rtt: StatBlock {
                values: StatValues {
                    avg: 0.0,
                    min: 0.0,
                    max: 0.0,
                    volatility: 0.0,
                },
                unit: UnitBlock::MS,
            },
            packets_lost: PacketsLostSection {
                audio: KindPacketsLost {
                    inbound: PacketsLostValue { avg: 1.25 },
                },
                video: KindPacketsLost {
                    inbound: PacketsLostValue { avg: 0.0 },
                },
                unit: PacketsLostUnit { avg: "percent" },
            },
            bitrate: DirectionalStats {
                inbound: StatValues {
                    avg: 100.0,
                    min: 50.0,
                    max: 150.0,
                    volatility: 10.0,
                },
                outbound: StatValues {
                    avg: 200.0,
                    min: 100.0,
                    max: 300.0,
                    volatility: 20.0,
                },
                unit: UnitBlock::KBS,
            },
            traffic: DirectionalStats {
                inbound: StatValues {
                    avg: 25.0,
                    min: 12.5,
                    max: 37.5,
                    volatility: 10.0,
                },
                outbound: StatValues {
                    avg: 50.0,
                    min: 25.0,
                    max: 75.0,
                    volatility: 20.0,
                },
                unit: UnitBlock::KBYTES,
            },
            network: NetworkSection {
                local_connection: "direct/udp".to_owned(),
                remote_connection: "turn/tcp".to_owned(),
            },
        };

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["packetsLost"]["audio"]["in"]["avg"], 1.25);
        assert_eq!(json["packetsLost"]["unit"]["avg"], "percent");
        assert_eq!(json["bitrate"]["in"]["avg"], 100.0);
        assert_eq!(json["bitrate"]["unit"]["avg"], "kbs");
        assert_eq!(json["traffic"]["out"]["max"], 75.0);
        assert_eq!(json["traffic"]["unit"]["max"], "KBytes");
        assert_eq!(json["network"]["localConnection"], "direct/udp");
        assert_eq!(json["network"]["remoteConnection"], "turn/tcp");
        assert_eq!(json["rtt"]["_unit"]["avg"], "ms");
    }
}
