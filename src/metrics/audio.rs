use serde::{Deserialize, Serialize};

use crate::metrics::{CodecInfo, Direction};

/// Measurements for one received audio stream over one interval.
///
/// Delta fields are relative to the immediately preceding snapshot that
/// contained the same SSRC; on a stream's first appearance they are 0 (or
/// absent), never a spurious large value. Cumulative fields cover the whole
/// session.
///
/// Wire names keep the established report format of the measurement
/// documents, hence the directional suffixes.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInboundMetric {
    /// Audio level of the received track.
    #[serde(rename = "level_in")]
    pub level: f64,
    /// Identifier of the codec stats entry in use.
    #[serde(rename = "codec_id_in")]
    pub codec_id: String,
    /// Codec in use for this stream.
    #[serde(rename = "codec_in")]
    pub codec: CodecInfo,
    /// Jitter measured during the interval, in milliseconds.
    #[serde(rename = "delta_jitter_ms_in")]
    pub delta_jitter_ms: f64,
    /// Round-trip time measured during the interval via remote reports, in
    /// milliseconds. Absent until a measurement exists.
    #[serde(rename = "delta_rtt_ms_out")]
    pub delta_rtt_ms: Option<f64>,
    /// Sum of all round-trip time measurements, in milliseconds.
    #[serde(rename = "total_rtt_ms_out")]
    pub total_rtt_ms: f64,
    /// Number of round-trip time measurements taken.
    #[serde(rename = "total_rtt_measure_out")]
    pub total_rtt_measure: u64,
    /// Percentage of packets lost during the interval.
    #[serde(rename = "percent_packets_lost_in")]
    pub percent_packets_lost: f64,
    /// Packets received during the interval.
    #[serde(rename = "delta_packets_in")]
    pub delta_packets: u64,
    /// Packets lost during the interval. Can be negative due to duplication.
    #[serde(rename = "delta_packets_lost_in")]
    pub delta_packets_lost: i64,
    /// Total packets received for this stream.
    #[serde(rename = "total_packets_in")]
    pub total_packets: u64,
    /// Total packets lost for this stream. Can be negative due to duplication.
    #[serde(rename = "total_packets_lost_in")]
    pub total_packets_lost: i64,
    /// Total KBytes received for this stream.
    #[serde(rename = "total_KBytes_in")]
    pub total_kbytes: f64,
    /// KBytes received during the interval.
    #[serde(rename = "delta_KBytes_in")]
    pub delta_kbytes: f64,
    /// Incoming bitrate during the interval, in kbit/s.
    #[serde(rename = "delta_kbs_in")]
    pub delta_kbs: f64,
    /// Timestamp of the underlying stats entry, in epoch milliseconds.
    #[serde(rename = "timestamp_in")]
    pub timestamp: Option<i64>,
    /// Effective Mean Opinion Score, from 1 (poor) to 5 (excellent).
    #[serde(rename = "mos_in")]
    pub mos: f64,
    /// E-model based Mean Opinion Score, from 1 (poor) to 5 (excellent).
    #[serde(rename = "mos_emodel_in")]
    pub mos_emodel: f64,
    /// Identifier of the media track in use.
    #[serde(rename = "track_in")]
    pub track: String,
}

/// Measurements for one sent audio stream over one interval.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioOutboundMetric {
    /// Whether the stream is actively sending.
    #[serde(rename = "active_out")]
    pub active: Option<bool>,
    /// Audio level of the sent track.
    #[serde(rename = "level_out")]
    pub level: f64,
    #[serde(rename = "codec_id_out")]
    pub codec_id: String,
    #[serde(rename = "codec_out")]
    pub codec: CodecInfo,
    /// Jitter reported by the remote endpoint during the interval, in
    /// milliseconds.
    #[serde(rename = "delta_jitter_ms_out")]
    pub delta_jitter_ms: f64,
    /// Round-trip time measured during the interval, in milliseconds.
    #[serde(rename = "delta_rtt_ms_out")]
    pub delta_rtt_ms: Option<f64>,
    /// Sum of all round-trip time measurements, in milliseconds.
    #[serde(rename = "total_rtt_ms_out")]
    pub total_rtt_ms: f64,
    /// Number of round-trip time measurements taken.
    #[serde(rename = "total_rtt_measure_out")]
    pub total_rtt_measure: u64,
    #[serde(rename = "percent_packets_lost_out")]
    pub percent_packets_lost: f64,
    #[serde(rename = "delta_packets_out")]
    pub delta_packets: u64,
    #[serde(rename = "delta_packets_lost_out")]
    pub delta_packets_lost: i64,
    #[serde(rename = "total_packets_out")]
    pub total_packets: u64,
    #[serde(rename = "total_packets_lost_out")]
    pub total_packets_lost: i64,
    #[serde(rename = "total_KBytes_out")]
    pub total_kbytes: f64,
    #[serde(rename = "delta_KBytes_out")]
    pub delta_kbytes: f64,
    /// Outgoing bitrate during the interval, in kbit/s.
    #[serde(rename = "delta_kbs_out")]
    pub delta_kbs: f64,
    #[serde(rename = "timestamp_out")]
    pub timestamp: Option<i64>,
    #[serde(rename = "mos_out")]
    pub mos: f64,
    #[serde(rename = "mos_emodel_out")]
    pub mos_emodel: f64,
    #[serde(rename = "track_out")]
    pub track: String,
}

/// One audio stream record, tagged by its direction of flow.
///
/// Serializes with a `direction` field alongside the record's own fields, so
/// the document shape stays flat while the crate side gets an exhaustive
/// union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "direction")]
pub enum AudioStreamMetric {
    #[serde(rename = "inbound")]
    Inbound(AudioInboundMetric),
    #[serde(rename = "outbound")]
    Outbound(AudioOutboundMetric),
}

impl AudioStreamMetric {
    pub fn direction(&self) -> Direction {
        match self {
            AudioStreamMetric::Inbound(_) => Direction::Inbound,
            AudioStreamMetric::Outbound(_) => Direction::Outbound,
        }
    }

    /// Cumulative round-trip time counters (sum of measurements in
    /// milliseconds, number of measurements).
    pub(crate) fn rtt_totals(&self) -> Option<(f64, u64)> {
        match self {
            AudioStreamMetric::Inbound(m) => Some((m.total_rtt_ms, m.total_rtt_measure)),
            AudioStreamMetric::Outbound(m) => Some((m.total_rtt_ms, m.total_rtt_measure)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_audio_stream_direction_tag() {
        let inbound = AudioStreamMetric::Inbound(AudioInboundMetric {
            delta_jitter_ms: 5.0,
            ..Default::default()
        });

        let json = serde_json::to_value(&inbound).unwrap();
        assert_eq!(json["direction"], "inbound");
        assert_eq!(json["delta_jitter_ms_in"], 5.0);
        assert_eq!(json["delta_rtt_ms_out"], serde_json::Value::Null);

        let back: AudioStreamMetric = serde_json::from_value(json).unwrap();
        assert_eq!(back, inbound);
        assert_eq!(back.direction(), Direction::Inbound);
    }

    #[test]
    fn test_audio_rtt_totals() {
        let outbound = AudioStreamMetric::Outbound(AudioOutboundMetric {
            total_rtt_ms: 300.0,
            total_rtt_measure: 3,
            ..Default::default()
        });

        assert_eq!(outbound.rtt_totals(), Some((300.0, 3)));
    }
}
