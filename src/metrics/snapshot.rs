use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::metrics::audio::AudioStreamMetric;
use crate::metrics::data::CallDataMetric;
use crate::metrics::network::NetworkMetric;
use crate::metrics::video::VideoStreamMetric;
use crate::metrics::{Direction, MediaKind, SSRC};

/// Timing introspection of the measurement pass itself.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalMetric {
    /// Time spent collecting and shaping this snapshot, in milliseconds.
    pub time_to_measure_ms: f64,
}

/// One measurement interval of a call.
///
/// A snapshot is produced by the embedding application once per polling
/// interval and pushed into an [`Exporter`](crate::exporter::Exporter). The
/// stream maps are keyed by SSRC; a given SSRC may appear or disappear
/// across snapshots as streams are added, muted or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Name of the measured peer connection.
    pub pname: String,
    /// Identifier of the call.
    pub call_id: String,
    /// Identifier of the user.
    pub user_id: String,
    /// Instant the snapshot was taken, in epoch milliseconds. Non-decreasing
    /// across a retained sequence.
    pub timestamp: i64,
    /// Sequence number of the snapshot within its session.
    pub count: u32,
    /// Audio stream records, keyed by SSRC.
    pub audio: HashMap<SSRC, AudioStreamMetric>,
    /// Video stream records, keyed by SSRC.
    pub video: HashMap<SSRC, VideoStreamMetric>,
    /// Connectivity descriptor at the time of the snapshot.
    pub network: NetworkMetric,
    /// Call-level counters.
    pub data: CallDataMetric,
    pub experimental: ExperimentalMetric,
    /// Raw stats fields copied through unmodified, as selected by the
    /// `passthrough` configuration. Never interpreted.
    pub passthrough: serde_json::Map<String, serde_json::Value>,
}

impl MetricSnapshot {
    /// Creates an empty snapshot taken at `timestamp` (epoch milliseconds).
    pub fn new(timestamp: i64) -> Self {
        MetricSnapshot {
            pname: String::new(),
            call_id: String::new(),
            user_id: String::new(),
            timestamp,
            count: 0,
            audio: HashMap::new(),
            video: HashMap::new(),
            network: NetworkMetric::default(),
            data: CallDataMetric::default(),
            experimental: ExperimentalMetric::default(),
            passthrough: serde_json::Map::new(),
        }
    }

    /// Creates the next snapshot of a sequence from its predecessor.
    ///
    /// Identification, stream records, network, data and experimental blocks
    /// carry forward so that the measuring application only writes what
    /// changed; the passthrough block resets and the sequence number
    /// increments.
    pub fn from_previous(previous: &MetricSnapshot, timestamp: i64) -> Self {
        MetricSnapshot {
            pname: previous.pname.clone(),
            call_id: previous.call_id.clone(),
            user_id: previous.user_id.clone(),
            timestamp,
            count: previous.count + 1,
            audio: previous.audio.clone(),
            video: previous.video.clone(),
            network: previous.network.clone(),
            data: previous.data.clone(),
            experimental: previous.experimental.clone(),
            passthrough: serde_json::Map::new(),
        }
    }

    /// Direction of the stream `ssrc` within the `kind` map, if present.
    pub fn stream_direction(&self, kind: MediaKind, ssrc: SSRC) -> Option<Direction> {
        match kind {
            MediaKind::Audio => self.audio.get(&ssrc).map(AudioStreamMetric::direction),
            MediaKind::Video => self.video.get(&ssrc).map(VideoStreamMetric::direction),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metrics::audio::AudioInboundMetric;
    use crate::metrics::network::Infrastructure;

    #[test]
    fn test_new_snapshot_is_empty() {
        let snapshot = MetricSnapshot::new(1000);

        assert_eq!(snapshot.timestamp, 1000);
        assert_eq!(snapshot.count, 0);
        assert!(snapshot.audio.is_empty());
        assert!(snapshot.video.is_empty());
        assert_eq!(snapshot.network.infrastructure, Infrastructure::Wifi);
    }

    #[test]
    fn test_from_previous_carries_state() {
        let mut first = MetricSnapshot::new(1000);
        first.pname = "p-test".to_owned();
        first.audio.insert(
            1111,
            AudioStreamMetric::Inbound(AudioInboundMetric {
                delta_jitter_ms: 5.0,
                ..Default::default()
            }),
        );
        first.data.total_kbytes_in = 12.0;
        first
            .passthrough
            .insert("jitter".to_owned(), serde_json::json!(0.005));

        let second = MetricSnapshot::from_previous(&first, 3000);

        assert_eq!(second.timestamp, 3000);
        assert_eq!(second.count, 1);
        assert_eq!(second.pname, "p-test");
        assert_eq!(second.audio, first.audio);
        assert_eq!(second.data.total_kbytes_in, 12.0);
        assert!(second.passthrough.is_empty());
        assert_eq!(
            second.stream_direction(MediaKind::Audio, 1111),
            Some(Direction::Inbound)
        );
        assert_eq!(second.stream_direction(MediaKind::Video, 1111), None);
    }
}
