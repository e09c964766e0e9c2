//! Gateway protocol
//!
//! JSON text frames discriminated by a `type` field.

mod client_packet;
mod packet_kind;
mod server_packet;

pub use client_packet::ClientPacket;
pub use packet_kind::PacketKind;
pub use server_packet::{
    decode_packet, parse_frame, Decoded, MessageAppendData, ReadyPayload, ServerPacket,
};
