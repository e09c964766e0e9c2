//! Packet dispatch
//!
//! A text frame becomes an ordered list of packets: `Bulk` wrappers are
//! flattened in array order and unknown tags are dropped. Connection packets
//! are consumed by the driver; everything else goes through [`handlers`].

pub mod handlers;
pub mod ready;

use std::collections::VecDeque;

use crate::error::GatewayResult;
use crate::protocol::{decode_packet, parse_frame, Decoded, ServerPacket};

pub use handlers::apply;

/// Decode a text frame into the packets it carries, in delivery order
///
/// A malformed frame yields a single error. A malformed packet inside a
/// `Bulk` yields an error in its position without affecting its siblings.
pub fn decode_frame(text: &str) -> Vec<GatewayResult<ServerPacket>> {
    let root = match parse_frame(text) {
        Ok(value) => value,
        Err(e) => return vec![Err(e)],
    };

    let mut pending = VecDeque::from([root]);
    let mut packets = Vec::new();

    while let Some(value) = pending.pop_front() {
        match decode_packet(value) {
            Ok(Decoded::Packet(ServerPacket::Bulk { v })) => {
                for child in v.into_iter().rev() {
                    pending.push_front(child);
                }
            }
            Ok(Decoded::Packet(packet)) => packets.push(Ok(packet)),
            Ok(Decoded::Unknown(tag)) => {
                tracing::debug!(tag = %tag, "Dropping packet with unknown type");
            }
            Err(e) => packets.push(Err(e)),
        }
    }

    packets
}
