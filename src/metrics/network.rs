use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const UNSPECIFIED_STR: &str = "Unspecified";

const CANDIDATE_TYPE_HOST_STR: &str = "host";
const CANDIDATE_TYPE_SRFLX_STR: &str = "srflx";
const CANDIDATE_TYPE_PRFLX_STR: &str = "prflx";
const CANDIDATE_TYPE_RELAY_STR: &str = "relay";

/// Indicates how an ICE candidate was obtained and what kind of network path
/// it represents.
///
/// # Specifications
///
/// - [RFC 8445 Section 5.1.1.1](https://datatracker.ietf.org/doc/html/rfc8445#section-5.1.1.1)
/// - [W3C RTCIceCandidateStats.candidateType](https://w3c.github.io/webrtc-stats/#dom-rtcicecandidatestats-candidatetype)
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateType {
    /// Type not specified. This should not occur in normal operation.
    #[default]
    Unspecified,

    /// Host candidate obtained from a local network interface.
    #[serde(rename = "host")]
    Host,

    /// Server reflexive candidate obtained via STUN.
    #[serde(rename = "srflx")]
    Srflx,

    /// Peer reflexive candidate discovered during connectivity checks.
    #[serde(rename = "prflx")]
    Prflx,

    /// Relay candidate obtained from a TURN server. Traffic flows through the
    /// relay, which the path derivation reports as a "turn/" prefix.
    #[serde(rename = "relay")]
    Relay,
}

impl From<&str> for CandidateType {
    fn from(raw: &str) -> Self {
        match raw {
            CANDIDATE_TYPE_HOST_STR => CandidateType::Host,
            CANDIDATE_TYPE_SRFLX_STR => CandidateType::Srflx,
            CANDIDATE_TYPE_PRFLX_STR => CandidateType::Prflx,
            CANDIDATE_TYPE_RELAY_STR => CandidateType::Relay,
            _ => CandidateType::Unspecified,
        }
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CandidateType::Host => write!(f, "{CANDIDATE_TYPE_HOST_STR}"),
            CandidateType::Srflx => write!(f, "{CANDIDATE_TYPE_SRFLX_STR}"),
            CandidateType::Prflx => write!(f, "{CANDIDATE_TYPE_PRFLX_STR}"),
            CandidateType::Relay => write!(f, "{CANDIDATE_TYPE_RELAY_STR}"),
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}

const TRANSPORT_PROTOCOL_UDP_STR: &str = "udp";
const TRANSPORT_PROTOCOL_TCP_STR: &str = "tcp";
const TRANSPORT_PROTOCOL_TLS_STR: &str = "tls";

/// Transport protocol used by an ICE candidate, or to reach a relay.
///
/// # Specification
///
/// See [RTCIceCandidateStats.relayProtocol](https://w3c.github.io/webrtc-stats/#dom-rtcicecandidatestats-relayprotocol)
/// in the W3C WebRTC Statistics specification.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportProtocol {
    /// Protocol not specified. This should not occur in normal operation.
    #[default]
    Unspecified,

    #[serde(rename = "udp")]
    Udp,

    #[serde(rename = "tcp")]
    Tcp,

    /// TLS over TCP, reported for relay allocations only.
    #[serde(rename = "tls")]
    Tls,
}

impl From<&str> for TransportProtocol {
    fn from(raw: &str) -> Self {
        match raw {
            TRANSPORT_PROTOCOL_UDP_STR => TransportProtocol::Udp,
            TRANSPORT_PROTOCOL_TCP_STR => TransportProtocol::Tcp,
            TRANSPORT_PROTOCOL_TLS_STR => TransportProtocol::Tls,
            _ => TransportProtocol::Unspecified,
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TransportProtocol::Udp => write!(f, "{TRANSPORT_PROTOCOL_UDP_STR}"),
            TransportProtocol::Tcp => write!(f, "{TRANSPORT_PROTOCOL_TCP_STR}"),
            TransportProtocol::Tls => write!(f, "{TRANSPORT_PROTOCOL_TLS_STR}"),
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}

/// Access network category the local endpoint reported, ordered by an
/// arbitrary cost weight carried on the wire as a numeric code.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Infrastructure {
    Ethernet,
    Cellular5G,
    #[default]
    Wifi,
    Cellular4G,
    Cellular,
}

impl Infrastructure {
    pub fn code(&self) -> u8 {
        match *self {
            Infrastructure::Ethernet => 0,
            Infrastructure::Cellular5G => 2,
            Infrastructure::Wifi => 3,
            Infrastructure::Cellular4G => 5,
            Infrastructure::Cellular => 10,
        }
    }
}

impl From<u8> for Infrastructure {
    fn from(code: u8) -> Self {
        match code {
            0 => Infrastructure::Ethernet,
            2 => Infrastructure::Cellular5G,
            3 => Infrastructure::Wifi,
            5 => Infrastructure::Cellular4G,
            10 => Infrastructure::Cellular,
            _ => Infrastructure::Wifi,
        }
    }
}

impl Serialize for Infrastructure {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Infrastructure {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = u8::deserialize(deserializer)?;
        Ok(Infrastructure::from(code))
    }
}

/// Connectivity descriptor for the call, taken from the selected ICE
/// candidate pair. Updated by the measuring application on every snapshot;
/// `local_candidate_relay_protocol` only applies when the local candidate is
/// a relay.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetric {
    pub infrastructure: Infrastructure,
    pub local_candidate_id: String,
    pub local_candidate_type: CandidateType,
    pub local_candidate_protocol: TransportProtocol,
    pub local_candidate_relay_protocol: TransportProtocol,
    pub remote_candidate_id: String,
    pub remote_candidate_type: CandidateType,
    pub remote_candidate_protocol: TransportProtocol,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_candidate_type() {
        let tests = vec![
            ("Unspecified", CandidateType::Unspecified),
            ("host", CandidateType::Host),
            ("srflx", CandidateType::Srflx),
            ("prflx", CandidateType::Prflx),
            ("relay", CandidateType::Relay),
        ];

        for (type_string, expected_type) in tests {
            let actual = CandidateType::from(type_string);
            assert_eq!(actual, expected_type);
        }
    }

    #[test]
    fn test_candidate_type_string() {
        let tests = vec![
            (CandidateType::Unspecified, "Unspecified"),
            (CandidateType::Host, "host"),
            (CandidateType::Srflx, "srflx"),
            (CandidateType::Prflx, "prflx"),
            (CandidateType::Relay, "relay"),
        ];

        for (ctype, expected_string) in tests {
            assert_eq!(ctype.to_string(), expected_string);
        }
    }

    #[test]
    fn test_transport_protocol() {
        let tests = vec![
            ("Unspecified", TransportProtocol::Unspecified),
            ("udp", TransportProtocol::Udp),
            ("tcp", TransportProtocol::Tcp),
            ("tls", TransportProtocol::Tls),
        ];

        for (protocol_string, expected_protocol) in tests {
            let actual = TransportProtocol::from(protocol_string);
            assert_eq!(actual, expected_protocol);
        }
    }

    #[test]
    fn test_infrastructure_code() {
        let tests = vec![
            (Infrastructure::Ethernet, 0),
            (Infrastructure::Cellular5G, 2),
            (Infrastructure::Wifi, 3),
            (Infrastructure::Cellular4G, 5),
            (Infrastructure::Cellular, 10),
        ];

        for (infrastructure, expected_code) in tests {
            assert_eq!(infrastructure.code(), expected_code);
            assert_eq!(Infrastructure::from(expected_code), infrastructure);
        }
    }

    #[test]
    fn test_network_metric_serde() {
        let network = NetworkMetric {
            local_candidate_type: CandidateType::Relay,
            local_candidate_relay_protocol: TransportProtocol::Tls,
            ..Default::default()
        };

        let json = serde_json::to_value(&network).unwrap();
        assert_eq!(json["infrastructure"], 3);
        assert_eq!(json["local_candidate_type"], "relay");
        assert_eq!(json["local_candidate_relay_protocol"], "tls");

        let back: NetworkMetric = serde_json::from_value(json).unwrap();
        assert_eq!(back, network);
    }
}
