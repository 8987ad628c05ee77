use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::metrics::{CodecInfo, Direction};

/// Dimensions and rate of a video frame flow.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
    pub framerate: f64,
}

/// Playout interruptions counted over one interval or over the session.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlitchCount {
    /// Number of freezes detected.
    pub freeze: u32,
    /// Number of pauses detected.
    pub pause: u32,
}

/// The reason for quality limitation in video encoding.
///
/// # Specification
///
/// See [RTCQualityLimitationReason](https://w3c.github.io/webrtc-stats/#dom-rtcqualitylimitationreason)
/// in the W3C WebRTC Statistics specification.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitationReason {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "cpu")]
    Cpu,
    #[serde(rename = "bandwidth")]
    Bandwidth,
    #[serde(rename = "other")]
    Other,
}

/// Encoder quality limitation state for a sent video stream.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityLimitation {
    pub reason: LimitationReason,
    /// Time spent in each limitation state, in seconds, keyed by reason.
    pub durations: Option<HashMap<String, f64>>,
    /// Number of resolution changes caused by a limitation.
    #[serde(rename = "resolutionChanges")]
    pub resolution_changes: u32,
}

/// Measurements for one received video stream over one interval.
///
/// Delta fields are relative to the immediately preceding snapshot that
/// contained the same SSRC; on a stream's first appearance they are 0 (or
/// absent). Video reception carries no round-trip time measurements.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInboundMetric {
    #[serde(rename = "codec_id_in")]
    pub codec_id: String,
    /// Received frame size and rate.
    #[serde(rename = "size_in")]
    pub size: FrameSize,
    #[serde(rename = "codec_in")]
    pub codec: CodecInfo,
    /// Jitter measured during the interval, in milliseconds.
    #[serde(rename = "delta_jitter_ms_in")]
    pub delta_jitter_ms: f64,
    #[serde(rename = "percent_packets_lost_in")]
    pub percent_packets_lost: f64,
    #[serde(rename = "delta_packets_in")]
    pub delta_packets: u64,
    #[serde(rename = "delta_packets_lost_in")]
    pub delta_packets_lost: i64,
    #[serde(rename = "total_packets_in")]
    pub total_packets: u64,
    #[serde(rename = "total_packets_lost_in")]
    pub total_packets_lost: i64,
    #[serde(rename = "total_KBytes_in")]
    pub total_kbytes: f64,
    #[serde(rename = "delta_KBytes_in")]
    pub delta_kbytes: f64,
    #[serde(rename = "delta_kbs_in")]
    pub delta_kbs: f64,
    /// Freezes and pauses detected during the interval.
    #[serde(rename = "delta_glitch_in")]
    pub delta_glitch: GlitchCount,
    /// Freezes and pauses detected since the beginning of the session.
    #[serde(rename = "total_glitch_in")]
    pub total_glitch: GlitchCount,
    /// Decoder implementation in use.
    #[serde(rename = "decoder_in")]
    pub decoder: Option<String>,
    /// Average time spent decoding one frame during the interval, in
    /// milliseconds.
    #[serde(rename = "delta_ms_decode_frame_in")]
    pub delta_ms_decode_frame: f64,
    #[serde(rename = "total_frames_decoded_in")]
    pub total_frames_decoded: u32,
    /// Total time spent decoding, in seconds.
    #[serde(rename = "total_time_decoded_in")]
    pub total_time_decoded: f64,
    /// NACK feedback sent to the remote encoder during the interval.
    #[serde(rename = "delta_nack_sent_in")]
    pub delta_nack_sent: u32,
    /// PLI feedback sent to the remote encoder during the interval.
    #[serde(rename = "delta_pli_sent_in")]
    pub delta_pli_sent: u32,
    #[serde(rename = "total_nack_sent_in")]
    pub total_nack_sent: u32,
    #[serde(rename = "total_pli_sent_in")]
    pub total_pli_sent: u32,
    #[serde(rename = "track_in")]
    pub track: String,
}

/// Measurements for one sent video stream over one interval.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoOutboundMetric {
    #[serde(rename = "active_out")]
    pub active: Option<bool>,
    #[serde(rename = "codec_id_out")]
    pub codec_id: String,
    /// Sent frame size and rate.
    #[serde(rename = "size_out")]
    pub size: FrameSize,
    /// Frame size and rate requested by the application.
    #[serde(rename = "size_pref_out")]
    pub size_pref: FrameSize,
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
    #[serde(rename = "delta_kbs_out")]
    pub delta_kbs: f64,
    /// Encoder implementation in use.
    #[serde(rename = "encoder_out")]
    pub encoder: Option<String>,
    /// Average time spent encoding one frame during the interval, in
    /// milliseconds.
    #[serde(rename = "delta_ms_encode_frame_out")]
    pub delta_ms_encode_frame: f64,
    /// Total time spent encoding, in seconds.
    #[serde(rename = "total_time_encoded_out")]
    pub total_time_encoded: f64,
    #[serde(rename = "total_frames_encoded_out")]
    pub total_frames_encoded: u32,
    /// NACK feedback received from the remote endpoint during the interval.
    #[serde(rename = "delta_nack_received_out")]
    pub delta_nack_received: u32,
    /// PLI feedback received from the remote endpoint during the interval.
    #[serde(rename = "delta_pli_received_out")]
    pub delta_pli_received: u32,
    #[serde(rename = "total_nack_received_out")]
    pub total_nack_received: u32,
    #[serde(rename = "total_pli_received_out")]
    pub total_pli_received: u32,
    /// Encoder quality limitation state.
    #[serde(rename = "limitation_out")]
    pub limitation: QualityLimitation,
    #[serde(rename = "timestamp_out")]
    pub timestamp: Option<i64>,
    #[serde(rename = "track_out")]
    pub track: String,
}

/// One video stream record, tagged by its direction of flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "direction")]
pub enum VideoStreamMetric {
    #[serde(rename = "inbound")]
    Inbound(VideoInboundMetric),
    #[serde(rename = "outbound")]
    Outbound(VideoOutboundMetric),
}

impl VideoStreamMetric {
    pub fn direction(&self) -> Direction {
        match self {
            VideoStreamMetric::Inbound(_) => Direction::Inbound,
            VideoStreamMetric::Outbound(_) => Direction::Outbound,
        }
    }

    /// Cumulative round-trip time counters, absent for received streams
    /// which carry no round-trip measurements.
    pub(crate) fn rtt_totals(&self) -> Option<(f64, u64)> {
        match self {
            VideoStreamMetric::Inbound(_) => None,
            VideoStreamMetric::Outbound(m) => Some((m.total_rtt_ms, m.total_rtt_measure)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_video_stream_direction_tag() {
        let outbound = VideoStreamMetric::Outbound(VideoOutboundMetric {
            delta_jitter_ms: 2.5,
            limitation: QualityLimitation {
                reason: LimitationReason::Bandwidth,
                resolution_changes: 2,
                ..Default::default()
            },
            ..Default::default()
        });

        let json = serde_json::to_value(&outbound).unwrap();
        assert_eq!(json["direction"], "outbound");
        assert_eq!(json["delta_jitter_ms_out"], 2.5);
        assert_eq!(json["limitation_out"]["reason"], "bandwidth");
        assert_eq!(json["limitation_out"]["resolutionChanges"], 2);

        let back: VideoStreamMetric = serde_json::from_value(json).unwrap();
        assert_eq!(back, outbound);
    }

    #[test]
    fn test_video_rtt_totals() {
        let tests = vec![
            (VideoStreamMetric::Inbound(VideoInboundMetric::default()), None),
            (
                VideoStreamMetric::Outbound(VideoOutboundMetric {
                    total_rtt_ms: 120.0,
                    total_rtt_measure: 4,
                    ..Default::default()
                }),
                Some((120.0, 4)),
            ),
        ];

        for (metric, expected_totals) in tests {
            assert_eq!(metric.rtt_totals(), expected_totals);
        }
    }
}
