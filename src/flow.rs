//! Flow Values
//!
//! TigerStyle: Plain data passed through the storage contract untouched.
//!
//! Only backends look inside these values. The selector and the contract
//! carry them as-is.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filters::Getter;

// =============================================================================
// Metrics
// =============================================================================

/// Traffic counters of a flow over a time window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlowMetric {
    /// Packets from endpoint A to B
    #[serde(rename = "ABPackets")]
    pub ab_packets: i64,
    /// Bytes from endpoint A to B
    #[serde(rename = "ABBytes")]
    pub ab_bytes: i64,
    /// Packets from endpoint B to A
    #[serde(rename = "BAPackets")]
    pub ba_packets: i64,
    /// Bytes from endpoint B to A
    #[serde(rename = "BABytes")]
    pub ba_bytes: i64,
    /// Window start (ms since epoch)
    pub start: i64,
    /// Window end (ms since epoch)
    pub last: i64,
}

impl Getter for FlowMetric {
    fn get_field_string(&self, _field: &str) -> Option<String> {
        None
    }

    fn get_field_i64(&self, field: &str) -> Option<i64> {
        match field {
            "ABPackets" => Some(self.ab_packets),
            "ABBytes" => Some(self.ab_bytes),
            "BAPackets" => Some(self.ba_packets),
            "BABytes" => Some(self.ba_bytes),
            "Start" => Some(self.start),
            "Last" => Some(self.last),
            _ => None,
        }
    }
}

// =============================================================================
// Flow
// =============================================================================

/// A single network flow record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Flow {
    /// Unique flow identifier
    #[serde(rename = "UUID")]
    pub uuid: String,
    /// Protocol layers, e.g. `Ethernet/IPv4/TCP`
    pub layers_path: String,
    /// Application protocol
    pub application: String,
    /// Capture node identifier
    #[serde(rename = "NodeTID")]
    pub node_tid: String,
    /// Identifier shared by the same flow seen on several nodes
    #[serde(rename = "TrackingID")]
    pub tracking_id: String,
    /// Encapsulating flow, if any
    #[serde(rename = "ParentUUID", default, skip_serializing_if = "String::is_empty")]
    pub parent_uuid: String,
    /// First packet (ms since epoch)
    pub start: i64,
    /// Last packet (ms since epoch)
    pub last: i64,
    /// Cumulative counters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<FlowMetric>,
    /// Counters since the previous update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_metric: Option<FlowMetric>,
    /// Number of raw packets captured for this flow
    pub raw_packets_captured: i64,
    /// Link layer type of captured packets (pcap `LINKTYPE_*`)
    #[serde(default)]
    pub link_type: u32,
    /// Packets captured since the previous update
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub last_raw_packets: Vec<RawPacket>,
}

impl Flow {
    /// Create a flow with a fresh UUID.
    #[must_use]
    pub fn new(node_tid: impl Into<String>, layers_path: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            layers_path: layers_path.into(),
            node_tid: node_tid.into(),
            ..Self::default()
        }
    }

    /// Set the application protocol.
    #[must_use]
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = application.into();
        self
    }

    /// Set the first and last packet timestamps.
    ///
    /// # Panics
    /// Panics if `last` is before `start`.
    #[must_use]
    pub fn with_times(mut self, start: i64, last: i64) -> Self {
        assert!(last >= start, "flow last ({last}) before start ({start})");
        self.start = start;
        self.last = last;
        self
    }

    /// Set the cumulative metric.
    #[must_use]
    pub fn with_metric(mut self, metric: FlowMetric) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Set the counters since the previous update.
    #[must_use]
    pub fn with_update_metric(mut self, metric: FlowMetric) -> Self {
        self.last_update_metric = Some(metric);
        self
    }

    /// Attach packets captured since the previous update.
    #[must_use]
    pub fn with_raw_packets(mut self, link_type: u32, packets: Vec<RawPacket>) -> Self {
        self.raw_packets_captured += packets.len() as i64;
        self.link_type = link_type;
        self.last_raw_packets = packets;
        self
    }
}

impl Getter for Flow {
    fn get_field_string(&self, field: &str) -> Option<String> {
        match field {
            "UUID" => Some(self.uuid.clone()),
            "LayersPath" => Some(self.layers_path.clone()),
            "Application" => Some(self.application.clone()),
            "NodeTID" => Some(self.node_tid.clone()),
            "TrackingID" => Some(self.tracking_id.clone()),
            "ParentUUID" => Some(self.parent_uuid.clone()),
            _ => None,
        }
    }

    fn get_field_i64(&self, field: &str) -> Option<i64> {
        match field {
            "Start" => Some(self.start),
            "Last" => Some(self.last),
            "RawPacketsCaptured" => Some(self.raw_packets_captured),
            _ => field
                .strip_prefix("Metric.")
                .and_then(|sub| self.metric.as_ref()?.get_field_i64(sub)),
        }
    }
}

/// An ordered set of flows returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlowSet {
    /// Matching flows
    pub flows: Vec<Flow>,
}

impl FlowSet {
    /// Number of flows in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// True if the set holds no flows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Flow UUIDs in set order.
    #[must_use]
    pub fn uuids(&self) -> Vec<&str> {
        self.flows.iter().map(|f| f.uuid.as_str()).collect()
    }
}

// =============================================================================
// Raw Packets
// =============================================================================

/// A captured packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPacket {
    /// Capture time (ms since epoch)
    pub timestamp: i64,
    /// Position of the packet within its flow
    pub index: i64,
    /// Packet bytes
    pub data: Vec<u8>,
}

/// Raw packets of a flow with their link layer type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPackets {
    /// Link layer type (pcap `LINKTYPE_*`)
    pub link_type: u32,
    /// Packets in capture order
    pub raw_packets: Vec<RawPacket>,
}

impl Getter for RawPacket {
    fn get_field_string(&self, _field: &str) -> Option<String> {
        None
    }

    fn get_field_i64(&self, field: &str) -> Option<i64> {
        match field {
            "Timestamp" => Some(self.timestamp),
            "Index" => Some(self.index),
            _ => None,
        }
    }
}

/// Metrics keyed by flow UUID.
pub type MetricsByFlow = HashMap<String, Vec<FlowMetric>>;

/// Raw packets keyed by flow UUID.
pub type RawPacketsByFlow = HashMap<String, RawPackets>;
