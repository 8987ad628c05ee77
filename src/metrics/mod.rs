//! Typed call-quality measurement model.
//!
//! One [`MetricSnapshot`](snapshot::MetricSnapshot) describes a single
//! measurement interval of a call: per-SSRC audio and video stream records,
//! the current network path, and call-level counters. Snapshots are produced
//! by the embedding application (typically from a WebRTC getStats pass) and
//! pushed into an [`Exporter`](crate::exporter::Exporter).

pub mod audio;
pub mod data;
pub mod network;
pub mod snapshot;
pub mod video;

use serde::{Deserialize, Serialize};
use std::fmt;

/// SSRC represents a synchronization source.
///
/// A synchronization source is a randomly chosen
/// value that uniquely identifies a stream within an RTP session.
pub type SSRC = u32;

pub(crate) const MEDIA_KIND_AUDIO_STR: &str = "audio";
pub(crate) const MEDIA_KIND_VIDEO_STR: &str = "video";

/// Kind of media carried by a stream.
///
/// # Specification
///
/// See [MediaStreamTrack.kind](https://www.w3.org/TR/mediacapture-streams/#dom-mediastreamtrack-kind)
/// in the W3C Media Capture specification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// An audio stream.
    #[serde(rename = "audio")]
    Audio,
    /// A video stream.
    #[serde(rename = "video")]
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            MediaKind::Audio => MEDIA_KIND_AUDIO_STR,
            MediaKind::Video => MEDIA_KIND_VIDEO_STR,
        };
        write!(f, "{s}")
    }
}

pub(crate) const DIRECTION_INBOUND_STR: &str = "inbound";
pub(crate) const DIRECTION_OUTBOUND_STR: &str = "outbound";

/// Direction of media flow for a stream, seen from the local endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Media received from the remote endpoint.
    #[serde(rename = "inbound")]
    Inbound,
    /// Media sent to the remote endpoint.
    #[serde(rename = "outbound")]
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Direction::Inbound => DIRECTION_INBOUND_STR,
            Direction::Outbound => DIRECTION_OUTBOUND_STR,
        };
        write!(f, "{s}")
    }
}

/// Codec description attached to a stream record.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecInfo {
    /// The codec MIME media type/subtype, e.g. "audio/opus".
    pub mime_type: Option<String>,
    /// The media sampling rate in Hz.
    pub clock_rate: Option<u32>,
    /// The "a=fmtp" line of the codec in the local description.
    pub sdp_fmtp_line: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_media_kind_string() {
        let tests = vec![
            (MediaKind::Audio, MEDIA_KIND_AUDIO_STR),
            (MediaKind::Video, MEDIA_KIND_VIDEO_STR),
        ];

        for (kind, expected_string) in tests {
            assert_eq!(kind.to_string(), expected_string);
        }
    }

    #[test]
    fn test_direction_string() {
        let tests = vec![
            (Direction::Inbound, DIRECTION_INBOUND_STR),
            (Direction::Outbound, DIRECTION_OUTBOUND_STR),
        ];

        for (direction, expected_string) in tests {
            assert_eq!(direction.to_string(), expected_string);
        }
    }

    #[test]
    fn test_media_kind_serde() {
        let tests = vec![(MediaKind::Audio, "\"audio\""), (MediaKind::Video, "\"video\"")];

        for (kind, expected_json) in tests {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, expected_json);
            let back: MediaKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }
}
