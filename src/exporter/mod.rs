//! Session ledger and ticket generation.
//!
//! An [`Exporter`] owns the retained snapshot sequence of one measurement
//! session. The embedding application pushes snapshots in as it collects
//! them and may ask for a [`Ticket`] at any moment; nothing is computed
//! until then, and generating a ticket never mutates the ledger.

pub mod ticket;

use chrono::{DateTime, Utc};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::configuration::MetricsConfig;
use crate::error::{Error, Result};
use crate::exporter::ticket::{
    CallSection, DataSection, DetailsSection, DirectionalStats, KindPacketsLost, MosBlock,
    NetworkSection, PacketsLostSection, PacketsLostUnit, PacketsLostValue, SsrcStats, StatBlock,
    StatValues, Ticket, UnitBlock, UserAgentSection, TICKET_VERSION,
};
use crate::metrics::network::{CandidateType, TransportProtocol};
use crate::metrics::snapshot::MetricSnapshot;
use crate::metrics::{Direction, MediaKind, SSRC};
use crate::reducer::{self, CallField, StreamField};

/// Caller-supplied timestamped label appended to the session timeline.
///
/// Events are carried through into tickets as-is and never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    /// Instant the event happened.
    pub at: DateTime<Utc>,
    /// Free-form grouping label, e.g. "call" or "device".
    pub category: String,
    pub name: String,
    pub description: String,
}

/// Mean round-trip time of one stream, in milliseconds.
///
/// Prefers the last snapshot's cumulative counters (`total_rtt_ms /
/// total_rtt_measure`); when either counter is zero, or the total is not
/// finite, the stream is considered to have no cumulative data yet and the
/// mean of the per-interval measurements over the whole sequence is used
/// instead. A session whose
/// true mean is exactly zero is indistinguishable from "no data", which is
/// acceptable for real network paths.
///
/// Returns `Some(0.0)` for an empty sequence and `None` when the stream is
/// absent from the last snapshot's map for `kind`.
pub fn average_rtt(reports: &[MetricSnapshot], kind: MediaKind, ssrc: SSRC) -> Option<f64> {
    if reports.is_empty() {
        return Some(0.0);
    }

    let last = reports.last()?;
    let totals = match kind {
        MediaKind::Audio => last.audio.get(&ssrc)?.rtt_totals(),
        MediaKind::Video => last.video.get(&ssrc)?.rtt_totals(),
    };

    Some(match totals {
        Some((total_ms, measures)) if measures > 0 && total_ms.is_finite() && total_ms != 0.0 => {
            total_ms / measures as f64
        }
        _ => reducer::average_values(reports, kind, StreamField::DeltaRttOut, ssrc),
    })
}

/// Mean connectivity round-trip time of the call, in milliseconds.
///
/// Connectivity round-trips are measured on the selected candidate pair's
/// STUN checks, so this exists even for data-only calls. Same cumulative
/// counter preference and fallback as [`average_rtt`]; call-scoped, so an
/// empty sequence simply yields 0.
pub fn average_rtt_connectivity(reports: &[MetricSnapshot]) -> f64 {
    let last = match reports.last() {
        Some(last) => last,
        None => return 0.0,
    };

    let total_ms = last.data.total_rtt_connectivity_ms;
    let measures = last.data.total_rtt_connectivity_measure;
    if measures == 0 || !total_ms.is_finite() || total_ms == 0.0 {
        reducer::average_call_values(reports, CallField::DeltaRttConnectivity)
    } else {
        total_ms / measures as f64
    }
}

/// Network path in use on the local side, e.g. `"direct/udp"` or
/// `"turn/tls"`, derived from the last snapshot's selected candidate.
pub fn local_path(reports: &[MetricSnapshot]) -> String {
    match reports.last().map(|report| &report.network) {
        Some(network) if network.local_candidate_type == CandidateType::Relay => {
            format!("turn/{}", network.local_candidate_relay_protocol)
        }
        Some(network) => format!("direct/{}", network.local_candidate_protocol),
        None => format!("direct/{}", TransportProtocol::Unspecified),
    }
}

/// Network path in use on the remote side. The remote candidate carries no
/// relay protocol of its own, so its transport protocol is reported either
/// way.
pub fn remote_path(reports: &[MetricSnapshot]) -> String {
    match reports.last().map(|report| &report.network) {
        Some(network) if network.remote_candidate_type == CandidateType::Relay => {
            format!("turn/{}", network.remote_candidate_protocol)
        }
        Some(network) => format!("direct/{}", network.remote_candidate_protocol),
        None => format!("direct/{}", TransportProtocol::Unspecified),
    }
}

fn stream_stat_values(
    reports: &[MetricSnapshot],
    kind: MediaKind,
    field: StreamField,
    ssrc: SSRC,
) -> StatValues {
    StatValues {
        avg: reducer::average_values(reports, kind, field, ssrc),
        min: reducer::min_value(reports, kind, field, ssrc),
        max: reducer::max_value(reports, kind, field, ssrc),
        volatility: reducer::volatility_values(reports, kind, field, ssrc),
    }
}

fn call_stat_values(reports: &[MetricSnapshot], field: CallField) -> StatValues {
    StatValues {
        avg: reducer::average_call_values(reports, field),
        min: reducer::min_call_value(reports, field),
        max: reducer::max_call_value(reports, field),
        volatility: reducer::volatility_call_values(reports, field),
    }
}

fn jitter_block(
    reports: &[MetricSnapshot],
    kind: MediaKind,
    direction: Direction,
    ssrc: SSRC,
) -> StatBlock {
    let field = match direction {
        Direction::Inbound => StreamField::DeltaJitterIn,
        Direction::Outbound => StreamField::DeltaJitterOut,
    };
    StatBlock {
        values: stream_stat_values(reports, kind, field, ssrc),
        unit: UnitBlock::MS,
    }
}

fn rtt_block(reports: &[MetricSnapshot], kind: MediaKind, ssrc: SSRC) -> StatBlock {
    let mut values = stream_stat_values(reports, kind, StreamField::DeltaRttOut, ssrc);
    // The ssrc comes from the last snapshot, so the stream always resolves.
    values.avg = average_rtt(reports, kind, ssrc).unwrap_or(0.0);
    StatBlock {
        values,
        unit: UnitBlock::MS,
    }
}

fn mos_block(reports: &[MetricSnapshot], ssrc: SSRC) -> MosBlock {
    MosBlock {
        emodel: stream_stat_values(reports, MediaKind::Audio, StreamField::MosEmodelIn, ssrc),
        effective: stream_stat_values(
            reports,
            MediaKind::Audio,
            StreamField::MosEffectiveIn,
            ssrc,
        ),
        unit: UnitBlock::MOS,
    }
}

/// One summary entry per stream of the last snapshot: jitter for everyone,
/// scores for received audio, round-trip time for sent streams.
fn build_ssrc_section(reports: &[MetricSnapshot]) -> BTreeMap<SSRC, SsrcStats> {
    let mut section = BTreeMap::new();
    let last = match reducer::last_report(reports) {
        Ok(last) => last,
        Err(_) => return section,
    };

    for (&ssrc, metric) in &last.audio {
        let direction = metric.direction();
        let entry = match direction {
            Direction::Inbound => SsrcStats {
                kind: MediaKind::Audio,
                direction,
                jitter: jitter_block(reports, MediaKind::Audio, direction, ssrc),
                mos: Some(mos_block(reports, ssrc)),
                rtt: None,
            },
            Direction::Outbound => SsrcStats {
                kind: MediaKind::Audio,
                direction,
                jitter: jitter_block(reports, MediaKind::Audio, direction, ssrc),
                mos: None,
                rtt: Some(rtt_block(reports, MediaKind::Audio, ssrc)),
            },
        };
        section.insert(ssrc, entry);
    }

    for (&ssrc, metric) in &last.video {
        let direction = metric.direction();
        let entry = match direction {
            Direction::Inbound => SsrcStats {
                kind: MediaKind::Video,
                direction,
                jitter: jitter_block(reports, MediaKind::Video, direction, ssrc),
                mos: None,
                rtt: None,
            },
            Direction::Outbound => SsrcStats {
                kind: MediaKind::Video,
                direction,
                jitter: jitter_block(reports, MediaKind::Video, direction, ssrc),
                mos: None,
                rtt: Some(rtt_block(reports, MediaKind::Video, ssrc)),
            },
        };
        section.insert(ssrc, entry);
    }

    section
}

/// Percentage of inbound packets lost for one media kind, rounded to two
/// decimal places. 0 when nothing was received or no inbound stream of that
/// kind was ever retained.
fn packets_lost_percent(reports: &[MetricSnapshot], kind: MediaKind) -> f64 {
    let totals = match reducer::last_inbound_packet_totals(reports, kind) {
        Some(totals) => totals,
        None => return 0.0,
    };

    let expected = totals.lost as f64 + totals.received as f64;
    if expected <= 0.0 {
        return 0.0;
    }
    let percent = (totals.lost as f64 / expected) * 100.0;
    if percent.is_finite() {
        (percent * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// Session ledger: retains the snapshot sequence and event timeline of one
/// measurement session and generates tickets from them.
#[derive(Debug)]
pub struct Exporter {
    cfg: MetricsConfig,
    started: Option<DateTime<Utc>>,
    ended: Option<DateTime<Utc>>,
    reference: Option<MetricSnapshot>,
    reports: Vec<MetricSnapshot>,
    events: Vec<CustomEvent>,
}

impl Exporter {
    pub fn new(cfg: MetricsConfig) -> Self {
        Exporter {
            cfg,
            started: None,
            ended: None,
            reference: None,
            reports: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Stamps the session start and returns it. Stamping again overwrites.
    pub fn start(&mut self) -> DateTime<Utc> {
        trace!("start() - start exporter");
        let now = Utc::now();
        self.started = Some(now);
        now
    }

    /// Stamps the session end and returns it. Stamping again overwrites.
    pub fn stop(&mut self) -> DateTime<Utc> {
        trace!("stop() - stop exporter");
        let now = Utc::now();
        self.ended = Some(now);
        now
    }

    /// Stores one caller-chosen snapshot as the session baseline. Not
    /// interpreted; carried into tickets under `details.reference`.
    pub fn save_reference_report(&mut self, report: MetricSnapshot) {
        self.reference = Some(report);
    }

    pub fn reference_report(&self) -> Option<&MetricSnapshot> {
        self.reference.as_ref()
    }

    /// Appends a snapshot to the retained sequence.
    ///
    /// With the `ticket` flag off nothing is retained and this is an
    /// accepted no-op, keeping memory flat for callers that only consume
    /// live snapshots. With retention on, the snapshot is validated against
    /// the sequence invariants first and rejected with
    /// [`Error::ErrSchemaViolation`] if it breaks one.
    pub fn add_report(&mut self, report: MetricSnapshot) -> Result<()> {
        if !self.cfg.ticket {
            return Ok(());
        }

        self.validate_incoming(&report)?;
        debug!("add_report() - add report to exporter at {}", report.timestamp);
        self.reports.push(report);
        Ok(())
    }

    fn validate_incoming(&self, report: &MetricSnapshot) -> Result<()> {
        for ssrc in report.audio.keys() {
            if report.video.contains_key(ssrc) {
                return Err(Error::ErrSchemaViolation(format!(
                    "stream {ssrc} appears in both the audio and the video map"
                )));
            }
        }

        if let Some(last) = self.reports.last() {
            if report.timestamp < last.timestamp {
                return Err(Error::ErrSchemaViolation(format!(
                    "timestamp {} is older than the last retained snapshot at {}",
                    report.timestamp, last.timestamp
                )));
            }

            for (ssrc, metric) in &report.audio {
                if let Some(previous) = last.audio.get(ssrc) {
                    if previous.direction() != metric.direction() {
                        return Err(Error::ErrSchemaViolation(format!(
                            "audio stream {ssrc} changed direction from {} to {}",
                            previous.direction(),
                            metric.direction()
                        )));
                    }
                }
            }
            for (ssrc, metric) in &report.video {
                if let Some(previous) = last.video.get(ssrc) {
                    if previous.direction() != metric.direction() {
                        return Err(Error::ErrSchemaViolation(format!(
                            "video stream {ssrc} changed direction from {} to {}",
                            previous.direction(),
                            metric.direction()
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Appends an event to the session timeline, unconditionally.
    pub fn add_custom_event(&mut self, event: CustomEvent) {
        self.events.push(event);
    }

    /// Clears the retained sequence, the reference snapshot and both
    /// lifecycle stamps. The event timeline survives; events belong to the
    /// probe's lifetime, not to one measurement window.
    pub fn reset(&mut self) {
        trace!("reset() - reset reports");
        self.reports.clear();
        self.reference = None;
        self.started = None;
        self.ended = None;
    }

    /// Replaces the active configuration for subsequent calls.
    pub fn update_config(&mut self, cfg: MetricsConfig) {
        self.cfg = cfg;
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.cfg
    }

    /// The most recent retained snapshot, if any.
    pub fn last_report(&self) -> Option<&MetricSnapshot> {
        self.reports.last()
    }

    /// The second most recent retained snapshot, if any.
    pub fn before_last_report(&self) -> Option<&MetricSnapshot> {
        let len = self.reports.len();
        if len < 2 {
            return None;
        }
        self.reports.get(len - 2)
    }

    /// Number of retained snapshots.
    pub fn reports_number(&self) -> usize {
        self.reports.len()
    }

    /// The retained sequence, oldest first.
    pub fn reports(&self) -> &[MetricSnapshot] {
        &self.reports
    }

    /// Generates the summary document of the session as retained so far.
    ///
    /// Pure read; can be called any number of times, before, during or
    /// after [`stop`](Exporter::stop). With no retained snapshot the
    /// per-stream section is empty and every aggregate reduces to its
    /// neutral value.
    pub fn ticket(&self) -> Ticket {
        debug!("ticket() - generate ticket");
        let reports = &self.reports;

        Ticket {
            version: TICKET_VERSION,
            started: self.started,
            ended: self.ended,
            ua: UserAgentSection {
                agent: self.cfg.agent.clone(),
                pname: self.cfg.pname.clone(),
                user_id: self.cfg.uid.clone(),
            },
            call: CallSection {
                call_id: self.cfg.cid.clone(),
                events: self.events.clone(),
            },
            details: DetailsSection {
                count: reports.len(),
                reports: if self.cfg.record {
                    reports.clone()
                } else {
                    Vec::new()
                },
                reference: self.reference.clone(),
            },
            ssrc: build_ssrc_section(reports),
            data: DataSection {
                rtt: StatBlock {
                    values: StatValues {
                        avg: average_rtt_connectivity(reports),
                        min: reducer::min_call_value(reports, CallField::DeltaRttConnectivity),
                        max: reducer::max_call_value(reports, CallField::DeltaRttConnectivity),
                        volatility: reducer::volatility_call_values(
                            reports,
                            CallField::DeltaRttConnectivity,
                        ),
                    },
                    unit: UnitBlock::MS,
                },
                packets_lost: PacketsLostSection {
                    audio: KindPacketsLost {
                        inbound: PacketsLostValue {
                            avg: packets_lost_percent(reports, MediaKind::Audio),
                        },
                    },
                    video: KindPacketsLost {
                        inbound: PacketsLostValue {
                            avg: packets_lost_percent(reports, MediaKind::Video),
                        },
                    },
                    unit: PacketsLostUnit { avg: "percent" },
                },
                bitrate: DirectionalStats {
                    inbound: call_stat_values(reports, CallField::DeltaKbsIn),
                    outbound: call_stat_values(reports, CallField::DeltaKbsOut),
                    unit: UnitBlock::KBS,
                },
                traffic: DirectionalStats {
                    inbound: call_stat_values(reports, CallField::DeltaKBytesIn),
                    outbound: call_stat_values(reports, CallField::DeltaKBytesOut),
                    unit: UnitBlock::KBYTES,
                },
                network: NetworkSection {
                    local_connection: local_path(reports),
                    remote_connection: remote_path(reports),
                },
            },
        }
    }
}
