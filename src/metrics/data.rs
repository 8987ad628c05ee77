use serde::{Deserialize, Serialize};

/// Call-level counters aggregated across every stream of the call, plus the
/// round-trip time of the selected candidate pair (measured on STUN
/// connectivity checks, so it exists even for data-only calls).
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDataMetric {
    /// Total KBytes received since the beginning of the call.
    #[serde(rename = "total_KBytes_in")]
    pub total_kbytes_in: f64,
    /// Total KBytes sent since the beginning of the call.
    #[serde(rename = "total_KBytes_out")]
    pub total_kbytes_out: f64,
    /// KBytes received during the interval.
    #[serde(rename = "delta_KBytes_in")]
    pub delta_kbytes_in: f64,
    /// KBytes sent during the interval.
    #[serde(rename = "delta_KBytes_out")]
    pub delta_kbytes_out: f64,
    /// Incoming bitrate during the interval, in kbit/s.
    pub delta_kbs_in: f64,
    /// Outgoing bitrate during the interval, in kbit/s.
    pub delta_kbs_out: f64,
    /// Available incoming bandwidth estimate, in kbit/s.
    pub delta_kbs_bandwidth_in: f64,
    /// Available outgoing bandwidth estimate, in kbit/s.
    pub delta_kbs_bandwidth_out: f64,
    /// Connectivity round-trip time measured during the interval, in
    /// milliseconds. Absent until a measurement exists.
    pub delta_rtt_connectivity_ms: Option<f64>,
    /// Sum of all connectivity round-trip time measurements, in milliseconds.
    pub total_rtt_connectivity_ms: f64,
    /// Number of connectivity round-trip time measurements taken.
    pub total_rtt_connectivity_measure: u64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_call_data_metric_wire_names() {
        let data = CallDataMetric {
            total_kbytes_in: 12.5,
            delta_kbs_out: 256.0,
            ..Default::default()
        };

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["total_KBytes_in"], 12.5);
        assert_eq!(json["delta_kbs_out"], 256.0);
        assert_eq!(json["delta_rtt_connectivity_ms"], serde_json::Value::Null);

        let back: CallDataMetric = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }
}
