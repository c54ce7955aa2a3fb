//! Aggregates shown above each collection.
//!
//! Each summary is a pure function of a snapshot; the synchronizer decides
//! when to recompute.

use serde::Serialize;

use crate::format::{format_bytes, format_mbps};
use crate::model::{HlsMuxer, RtmpConn, RtspSession, SrtConn, WebRtcSession};

/// Labelled metrics for display.
pub trait Summary {
    /// `(label, value)` pairs in display order.
    fn rows(&self) -> Vec<(&'static str, String)>;
}

/// Default summary: just the count.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TotalStats {
    pub total: usize,
}

impl TotalStats {
    pub fn compute<T>(items: &[T]) -> Self {
        Self { total: items.len() }
    }
}

impl Summary for TotalStats {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![("Total", self.total.to_string())]
    }
}

/// RTMP connections: publishers and byte totals.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RtmpStats {
    pub total: usize,
    pub publishing: usize,
    pub total_bytes_sent: String,
    pub total_bytes_received: String,
}

impl RtmpStats {
    /// Byte totals are pre-formatted for display.
    pub fn compute(conns: &[RtmpConn]) -> Self {
        Self {
            total: conns.len(),
            publishing: conns.iter().filter(|c| c.state.is_publishing()).count(),
            total_bytes_sent: format_bytes(conns.iter().map(|c| c.bytes_sent).sum(), 2),
            total_bytes_received: format_bytes(conns.iter().map(|c| c.bytes_received).sum(), 2),
        }
    }
}

impl Summary for RtmpStats {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Connections", self.total.to_string()),
            ("Publishing Connections", self.publishing.to_string()),
            ("Total Bytes Sent", self.total_bytes_sent.clone()),
            ("Total Bytes Received", self.total_bytes_received.clone()),
        ]
    }
}

/// SRT connections, including summed send/receive rates.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SrtStats {
    pub total: usize,
    pub publishing: usize,
    pub total_bytes_sent: String,
    pub total_bytes_received: String,
    pub total_send_rate: String,
    pub total_receive_rate: String,
}

impl SrtStats {
    pub fn compute(conns: &[SrtConn]) -> Self {
        Self {
            total: conns.len(),
            publishing: conns.iter().filter(|c| c.state.is_publishing()).count(),
            total_bytes_sent: format_bytes(conns.iter().map(|c| c.bytes_sent).sum(), 2),
            total_bytes_received: format_bytes(conns.iter().map(|c| c.bytes_received).sum(), 2),
            total_send_rate: format_mbps(conns.iter().map(|c| c.mbps_send_rate).sum()),
            total_receive_rate: format_mbps(conns.iter().map(|c| c.mbps_receive_rate).sum()),
        }
    }
}

impl Summary for SrtStats {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Connections", self.total.to_string()),
            ("Publishing Connections", self.publishing.to_string()),
            ("Total Bytes Sent", self.total_bytes_sent.clone()),
            ("Total Bytes Received", self.total_bytes_received.clone()),
            ("Total Send Rate", self.total_send_rate.clone()),
            ("Total Receive Rate", self.total_receive_rate.clone()),
        ]
    }
}

/// WebRTC sessions with RTP packet counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct WebRtcStats {
    pub total: usize,
    pub publishing: usize,
    pub established: usize,
    pub total_bytes_sent: String,
    pub total_bytes_received: String,
    pub rtp_packets_sent: u64,
    pub rtp_packets_received: u64,
    pub rtp_packets_lost: u64,
}

impl WebRtcStats {
    pub fn compute(sessions: &[WebRtcSession]) -> Self {
        Self {
            total: sessions.len(),
            publishing: sessions.iter().filter(|s| s.state.is_publishing()).count(),
            established: sessions
                .iter()
                .filter(|s| s.peer_connection_established)
                .count(),
            total_bytes_sent: format_bytes(sessions.iter().map(|s| s.bytes_sent).sum(), 2),
            total_bytes_received: format_bytes(sessions.iter().map(|s| s.bytes_received).sum(), 2),
            rtp_packets_sent: sessions.iter().map(|s| s.rtp_packets_sent).sum(),
            rtp_packets_received: sessions.iter().map(|s| s.rtp_packets_received).sum(),
            rtp_packets_lost: sessions.iter().map(|s| s.rtp_packets_lost).sum(),
        }
    }
}

impl Summary for WebRtcStats {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Sessions", self.total.to_string()),
            ("Publishing Sessions", self.publishing.to_string()),
            ("Established Connections", self.established.to_string()),
            ("Total Bytes Sent", self.total_bytes_sent.clone()),
            ("Total Bytes Received", self.total_bytes_received.clone()),
            ("Total RTP Packets Sent", self.rtp_packets_sent.to_string()),
            ("Total RTP Packets Received", self.rtp_packets_received.to_string()),
            ("Total RTP Packets Lost", self.rtp_packets_lost.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RtspSessionStats {
    pub total: usize,
    pub publishing: usize,
    pub total_bytes_sent: String,
    pub total_bytes_received: String,
    pub rtp_packets_lost: u64,
}

impl RtspSessionStats {
    pub fn compute(sessions: &[RtspSession]) -> Self {
        Self {
            total: sessions.len(),
            publishing: sessions.iter().filter(|s| s.state.is_publishing()).count(),
            total_bytes_sent: format_bytes(sessions.iter().map(|s| s.bytes_sent).sum(), 2),
            total_bytes_received: format_bytes(sessions.iter().map(|s| s.bytes_received).sum(), 2),
            rtp_packets_lost: sessions.iter().map(|s| s.rtp_packets_lost).sum(),
        }
    }
}

impl Summary for RtspSessionStats {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Sessions", self.total.to_string()),
            ("Publishing Sessions", self.publishing.to_string()),
            ("Total Bytes Sent", self.total_bytes_sent.clone()),
            ("Total Bytes Received", self.total_bytes_received.clone()),
            ("Total RTP Packets Lost", self.rtp_packets_lost.to_string()),
        ]
    }
}

/// HLS muxers: readiness and segments served.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct HlsStats {
    pub total: usize,
    pub source_ready: usize,
    pub total_segments: u64,
    pub total_bytes_sent: String,
}

impl HlsStats {
    pub fn compute(muxers: &[HlsMuxer]) -> Self {
        Self {
            total: muxers.len(),
            source_ready: muxers.iter().filter(|m| m.source_ready).count(),
            total_segments: muxers.iter().map(|m| m.segment_count).sum(),
            total_bytes_sent: format_bytes(muxers.iter().map(|m| m.bytes_sent).sum(), 2),
        }
    }
}

impl Summary for HlsStats {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Muxers", self.total.to_string()),
            ("Source Ready", self.source_ready.to_string()),
            ("Total Segments", self.total_segments.to_string()),
            ("Total Bytes Sent", self.total_bytes_sent.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SessionState;

    #[test]
    fn rtmp_counts_publishers_and_bytes() {
        let conns = vec![
            RtmpConn {
                id: "a".into(),
                state: SessionState::Publish,
                bytes_sent: 1024,
                bytes_received: 512,
                ..Default::default()
            },
            RtmpConn {
                id: "b".into(),
                state: SessionState::Read,
                bytes_sent: 1024,
                ..Default::default()
            },
        ];
        let s = RtmpStats::compute(&conns);
        assert_eq!(s.total, 2);
        assert_eq!(s.publishing, 1);
        assert_eq!(s.total_bytes_sent, "2 KB");
        assert_eq!(s.total_bytes_received, "512 B");
    }

    #[test]
    fn srt_rates_sum() {
        let conns = vec![
            SrtConn {
                id: "a".into(),
                mbps_send_rate: 1.25,
                mbps_receive_rate: 0.5,
                ..Default::default()
            },
            SrtConn {
                id: "b".into(),
                mbps_send_rate: 0.75,
                ..Default::default()
            },
        ];
        let s = SrtStats::compute(&conns);
        assert_eq!(s.total_send_rate, "2.00 Mbps");
        assert_eq!(s.total_receive_rate, "0.50 Mbps");
        assert_eq!(s.total_bytes_sent, "N/A");
    }

    #[test]
    fn webrtc_established() {
        let sessions = vec![
            WebRtcSession {
                id: "a".into(),
                peer_connection_established: true,
                rtp_packets_lost: 3,
                ..Default::default()
            },
            WebRtcSession {
                id: "b".into(),
                rtp_packets_lost: 2,
                ..Default::default()
            },
        ];
        let s = WebRtcStats::compute(&sessions);
        assert_eq!(s.established, 1);
        assert_eq!(s.rtp_packets_lost, 5);
        assert_eq!(s.rows().len(), 8);
    }

    #[test]
    fn empty_snapshot_totals_zero() {
        assert_eq!(TotalStats::compute::<HlsMuxer>(&[]).total, 0);
        assert_eq!(HlsStats::compute(&[]).total_bytes_sent, "N/A");
    }
}
