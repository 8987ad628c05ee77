//! Statistical reducers over a sequence of snapshots.
//!
//! Every reducer walks the whole retained sequence and builds a filtered
//! series: snapshots where the requested stream exists and the requested
//! field carries a finite value contribute one sample, all others contribute
//! nothing. An empty series reduces to 0 rather than an error, so reducers
//! stay total over sequences with appearing and disappearing streams.
//!
//! Fields are addressed through the closed [`StreamField`] and [`CallField`]
//! selectors; adding a field is a compile-time checked change of the
//! extraction match, not a stringly-typed lookup.

use crate::error::{Error, Result};
use crate::metrics::audio::AudioStreamMetric;
use crate::metrics::snapshot::MetricSnapshot;
use crate::metrics::video::VideoStreamMetric;
use crate::metrics::{MediaKind, SSRC};

/// Per-stream series selectable within one media kind.
///
/// A selector that does not exist for the record's direction (for instance
/// [`StreamField::DeltaJitterOut`] on an inbound record) yields no sample
/// from that snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StreamField {
    /// Jitter of the received stream during the interval, in milliseconds.
    DeltaJitterIn,
    /// Jitter reported by the remote endpoint during the interval, in
    /// milliseconds.
    DeltaJitterOut,
    /// Round-trip time measured during the interval, in milliseconds.
    DeltaRttOut,
    /// E-model based Mean Opinion Score of the received audio stream.
    MosEmodelIn,
    /// Effective Mean Opinion Score of the received audio stream.
    MosEffectiveIn,
    /// Incoming bitrate during the interval, in kbit/s.
    DeltaKbsIn,
    /// Outgoing bitrate during the interval, in kbit/s.
    DeltaKbsOut,
    /// KBytes received during the interval.
    DeltaKBytesIn,
    /// KBytes sent during the interval.
    DeltaKBytesOut,
}

/// Call-level series selectable from the data block.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CallField {
    DeltaKbsIn,
    DeltaKbsOut,
    DeltaKBytesIn,
    DeltaKBytesOut,
    DeltaKbsBandwidthIn,
    DeltaKbsBandwidthOut,
    /// Connectivity round-trip time measured during the interval, in
    /// milliseconds.
    DeltaRttConnectivity,
}

fn audio_field(metric: &AudioStreamMetric, field: StreamField) -> Option<f64> {
    match metric {
        AudioStreamMetric::Inbound(m) => match field {
            StreamField::DeltaJitterIn => Some(m.delta_jitter_ms),
            StreamField::DeltaRttOut => m.delta_rtt_ms,
            StreamField::MosEmodelIn => Some(m.mos_emodel),
            StreamField::MosEffectiveIn => Some(m.mos),
            StreamField::DeltaKbsIn => Some(m.delta_kbs),
            StreamField::DeltaKBytesIn => Some(m.delta_kbytes),
            StreamField::DeltaJitterOut
            | StreamField::DeltaKbsOut
            | StreamField::DeltaKBytesOut => None,
        },
        AudioStreamMetric::Outbound(m) => match field {
            StreamField::DeltaJitterOut => Some(m.delta_jitter_ms),
            StreamField::DeltaRttOut => m.delta_rtt_ms,
            StreamField::DeltaKbsOut => Some(m.delta_kbs),
            StreamField::DeltaKBytesOut => Some(m.delta_kbytes),
            StreamField::DeltaJitterIn
            | StreamField::MosEmodelIn
            | StreamField::MosEffectiveIn
            | StreamField::DeltaKbsIn
            | StreamField::DeltaKBytesIn => None,
        },
    }
}

fn video_field(metric: &VideoStreamMetric, field: StreamField) -> Option<f64> {
    match metric {
        VideoStreamMetric::Inbound(m) => match field {
            StreamField::DeltaJitterIn => Some(m.delta_jitter_ms),
            StreamField::DeltaKbsIn => Some(m.delta_kbs),
            StreamField::DeltaKBytesIn => Some(m.delta_kbytes),
            StreamField::DeltaJitterOut
            | StreamField::DeltaRttOut
            | StreamField::MosEmodelIn
            | StreamField::MosEffectiveIn
            | StreamField::DeltaKbsOut
            | StreamField::DeltaKBytesOut => None,
        },
        VideoStreamMetric::Outbound(m) => match field {
            StreamField::DeltaJitterOut => Some(m.delta_jitter_ms),
            StreamField::DeltaRttOut => m.delta_rtt_ms,
            StreamField::DeltaKbsOut => Some(m.delta_kbs),
            StreamField::DeltaKBytesOut => Some(m.delta_kbytes),
            StreamField::DeltaJitterIn
            | StreamField::MosEmodelIn
            | StreamField::MosEffectiveIn
            | StreamField::DeltaKbsIn
            | StreamField::DeltaKBytesIn => None,
        },
    }
}

fn stream_field(
    report: &MetricSnapshot,
    kind: MediaKind,
    field: StreamField,
    ssrc: SSRC,
) -> Option<f64> {
    match kind {
        MediaKind::Audio => report.audio.get(&ssrc).and_then(|m| audio_field(m, field)),
        MediaKind::Video => report.video.get(&ssrc).and_then(|m| video_field(m, field)),
    }
}

fn call_field(report: &MetricSnapshot, field: CallField) -> Option<f64> {
    match field {
        CallField::DeltaKbsIn => Some(report.data.delta_kbs_in),
        CallField::DeltaKbsOut => Some(report.data.delta_kbs_out),
        CallField::DeltaKBytesIn => Some(report.data.delta_kbytes_in),
        CallField::DeltaKBytesOut => Some(report.data.delta_kbytes_out),
        CallField::DeltaKbsBandwidthIn => Some(report.data.delta_kbs_bandwidth_in),
        CallField::DeltaKbsBandwidthOut => Some(report.data.delta_kbs_bandwidth_out),
        CallField::DeltaRttConnectivity => report.data.delta_rtt_connectivity_ms,
    }
}

fn stream_series<'a>(
    reports: &'a [MetricSnapshot],
    kind: MediaKind,
    field: StreamField,
    ssrc: SSRC,
) -> impl Iterator<Item = f64> + 'a {
    reports
        .iter()
        .filter_map(move |report| stream_field(report, kind, field, ssrc))
        .filter(|value| value.is_finite())
}

fn call_series(
    reports: &[MetricSnapshot],
    field: CallField,
) -> impl Iterator<Item = f64> + '_ {
    reports
        .iter()
        .filter_map(move |report| call_field(report, field))
        .filter(|value| value.is_finite())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

fn minimum(values: impl Iterator<Item = f64>) -> f64 {
    values.reduce(f64::min).unwrap_or(0.0)
}

fn maximum(values: impl Iterator<Item = f64>) -> f64 {
    values.reduce(f64::max).unwrap_or(0.0)
}

/// Relative dispersion of a series, as a percentage: the mean absolute
/// deviation around the mean, divided by the mean, times 100. Returns 0 for
/// fewer than two samples or a zero mean.
fn volatility(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let deviation = values.iter().map(|v| (v - mean).abs()).sum::<f64>() / values.len() as f64;
    (deviation / mean) * 100.0
}

/// Mean of the stream series; 0 when no snapshot contributes a sample.
pub fn average_values(
    reports: &[MetricSnapshot],
    kind: MediaKind,
    field: StreamField,
    ssrc: SSRC,
) -> f64 {
    mean(stream_series(reports, kind, field, ssrc))
}

/// Smallest sample of the stream series; 0 when the series is empty.
pub fn min_value(
    reports: &[MetricSnapshot],
    kind: MediaKind,
    field: StreamField,
    ssrc: SSRC,
) -> f64 {
    minimum(stream_series(reports, kind, field, ssrc))
}

/// Largest sample of the stream series; 0 when the series is empty.
pub fn max_value(
    reports: &[MetricSnapshot],
    kind: MediaKind,
    field: StreamField,
    ssrc: SSRC,
) -> f64 {
    maximum(stream_series(reports, kind, field, ssrc))
}

/// Relative dispersion of the stream series, in percent: mean absolute
/// deviation around the mean, over the mean. 0 for fewer than two samples or
/// a zero mean.
pub fn volatility_values(
    reports: &[MetricSnapshot],
    kind: MediaKind,
    field: StreamField,
    ssrc: SSRC,
) -> f64 {
    let values: Vec<f64> = stream_series(reports, kind, field, ssrc).collect();
    volatility(&values)
}

/// Sample from the most recent snapshot that carries one, if any.
pub fn last_value(
    reports: &[MetricSnapshot],
    kind: MediaKind,
    field: StreamField,
    ssrc: SSRC,
) -> Option<f64> {
    reports
        .iter()
        .rev()
        .find_map(|report| stream_field(report, kind, field, ssrc))
        .filter(|value| value.is_finite())
}

/// Mean of the call-level series; 0 when no snapshot contributes a sample.
pub fn average_call_values(reports: &[MetricSnapshot], field: CallField) -> f64 {
    mean(call_series(reports, field))
}

/// Smallest sample of the call-level series; 0 when the series is empty.
pub fn min_call_value(reports: &[MetricSnapshot], field: CallField) -> f64 {
    minimum(call_series(reports, field))
}

/// Largest sample of the call-level series; 0 when the series is empty.
pub fn max_call_value(reports: &[MetricSnapshot], field: CallField) -> f64 {
    maximum(call_series(reports, field))
}

/// Relative dispersion of the call-level series, in percent.
pub fn volatility_call_values(reports: &[MetricSnapshot], field: CallField) -> f64 {
    let values: Vec<f64> = call_series(reports, field).collect();
    volatility(&values)
}

/// Call-level sample from the most recent snapshot that carries one, if any.
pub fn last_call_value(reports: &[MetricSnapshot], field: CallField) -> Option<f64> {
    reports
        .iter()
        .rev()
        .find_map(|report| call_field(report, field))
        .filter(|value| value.is_finite())
}

/// The most recent snapshot of the sequence.
///
/// Callers building summaries over a possibly-empty sequence must check the
/// sequence length first or handle [`Error::ErrNoReportsAvailable`].
pub fn last_report(reports: &[MetricSnapshot]) -> Result<&MetricSnapshot> {
    reports.last().ok_or(Error::ErrNoReportsAvailable)
}

/// Cumulative inbound packet counters for one media kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PacketTotals {
    /// Total packets lost. Can be negative due to duplication.
    pub lost: i64,
    /// Total packets received.
    pub received: u64,
}

/// Cumulative inbound packet counters of one media kind, summed over the
/// inbound streams of the most recent snapshot carrying at least one such
/// stream. `None` when no snapshot does.
pub fn last_inbound_packet_totals(
    reports: &[MetricSnapshot],
    kind: MediaKind,
) -> Option<PacketTotals> {
    reports.iter().rev().find_map(|report| match kind {
        MediaKind::Audio => {
            let inbound = report.audio.values().filter_map(|m| match m {
                AudioStreamMetric::Inbound(m) => Some((m.total_packets_lost, m.total_packets)),
                AudioStreamMetric::Outbound(_) => None,
            });
            sum_packet_totals(inbound)
        }
        MediaKind::Video => {
            let inbound = report.video.values().filter_map(|m| match m {
                VideoStreamMetric::Inbound(m) => Some((m.total_packets_lost, m.total_packets)),
                VideoStreamMetric::Outbound(_) => None,
            });
            sum_packet_totals(inbound)
        }
    })
}

fn sum_packet_totals(streams: impl Iterator<Item = (i64, u64)>) -> Option<PacketTotals> {
    let mut found = false;
    let mut totals = PacketTotals {
        lost: 0,
        received: 0,
    };
    for (lost, received) in streams {
        found = true;
        totals.lost += lost;
        totals.received += received;
    }
    found.then_some(totals)
}
