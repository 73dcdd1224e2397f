//! ICMP echo packet codec
//!
//! Both directions go through pnet's packet views: requests are written
//! through a mutable echo request view, replies are read after skipping the
//! IPv4 header that raw sockets hand back with every datagram.

use crate::checksum::checksum;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{IcmpCode, IcmpTypes};
use pnet::packet::Packet;
use serde::{Deserialize, Serialize};

/// ICMP echo header length in bytes
pub const ICMP_HEADER_LEN: usize = 8;
/// Size of the echo request payload
pub const ICMP_ECHO_PAYLOAD_SIZE: usize = 192;
/// Byte used to fill the echo request payload
pub const PAYLOAD_FILLER: u8 = b'Q';
/// Sequence number carried by every request
pub const ECHO_SEQUENCE: u16 = 1;
/// Offset of the ICMP header inside a datagram read from a raw socket
pub const IPV4_HEADER_LEN: usize = 20;
/// Total size of an echo request on the wire (without IP header)
pub const ECHO_REQUEST_LEN: usize = ICMP_HEADER_LEN + ICMP_ECHO_PAYLOAD_SIZE;
/// Shortest datagram that still carries a full ICMP header
pub const MIN_REPLY_DATAGRAM_LEN: usize = IPV4_HEADER_LEN + ICMP_HEADER_LEN;

/// Header fields of a received ICMP message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoHeader {
    /// ICMP type (0 for echo reply, 8 for echo request)
    pub icmp_type: u8,
    /// ICMP code
    pub code: u8,
    /// Checksum as found on the wire
    pub checksum: u16,
    /// Identifier used to correlate replies with requests
    pub identifier: u16,
    /// Sequence number
    pub sequence: u16,
}

impl EchoHeader {
    /// Whether this header answers a request sent with `identifier`.
    ///
    /// Only the identifier is compared. Type, code and checksum are not
    /// verified, so anything carrying the same identifier (including a
    /// looped-back copy of our own request) is accepted.
    pub fn matches(&self, identifier: u16) -> bool {
        self.identifier == identifier
    }
}

/// Build an ICMP echo request with the given identifier.
///
/// The result is the 8 byte header followed by a fixed 192 byte filler
/// payload, with the checksum computed over both.
pub fn build_request(identifier: u16) -> Vec<u8> {
    let mut buf = vec![0u8; ECHO_REQUEST_LEN];
    // The buffer always holds a full echo header, so the view exists
    if let Some(mut request) = MutableEchoRequestPacket::new(&mut buf) {
        request.set_icmp_type(IcmpTypes::EchoRequest);
        request.set_icmp_code(IcmpCode(0));
        request.set_identifier(identifier);
        request.set_sequence_number(ECHO_SEQUENCE);
        request.set_payload(&[PAYLOAD_FILLER; ICMP_ECHO_PAYLOAD_SIZE]);

        // Checksum field is still zero here
        let sum = checksum(request.packet());
        request.set_checksum(sum);
    }
    buf
}

/// Parse the ICMP header out of a datagram read from a raw socket.
///
/// Returns `None` when the datagram is too short to hold the IPv4 header
/// plus a full ICMP header.
pub fn parse_reply_header(datagram: &[u8]) -> Option<EchoHeader> {
    if datagram.len() < MIN_REPLY_DATAGRAM_LEN {
        return None;
    }
    let reply = EchoReplyPacket::new(&datagram[IPV4_HEADER_LEN..])?;
    Some(EchoHeader {
        icmp_type: reply.get_icmp_type().0,
        code: reply.get_icmp_code().0,
        checksum: reply.get_checksum(),
        identifier: reply.get_identifier(),
        sequence: reply.get_sequence_number(),
    })
}
