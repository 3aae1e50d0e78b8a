//! The closed message catalog and payload dispatch.
//!
//! One table row per supported message id, sorted by id. Lookups are a binary
//! search; the table is `'static` and never mutated.

use mavwire_frame::{Frame, FrameConfig, ProtocolVersion, MAX_PAYLOAD_LEN};
use serde::Serialize;

use crate::handler::{MessageHandler, Source};
use crate::messages::*;

/// One catalog row.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub id: u32,
    pub name: &'static str,
    /// Base payload length without extension fields.
    pub payload_len: usize,
    pub crc_extra: u8,
    decode: fn(&mut &[u8]) -> Message,
}

impl CatalogEntry {
    /// Decode `payload` as this entry's record.
    ///
    /// Missing trailing bytes read as zero; bytes past the base length are
    /// ignored.
    pub fn decode(&self, payload: &[u8]) -> Decoded {
        let mut padded = [0u8; MAX_PAYLOAD_LEN];
        let used = payload.len().min(self.payload_len);
        padded[..used].copy_from_slice(&payload[..used]);

        let mut buf = &padded[..self.payload_len];
        let message = (self.decode)(&mut buf);

        let fit = match payload.len() {
            len if len == self.payload_len => PayloadFit::Exact,
            len if len < self.payload_len => PayloadFit::Truncated {
                missing: self.payload_len - len,
            },
            len => PayloadFit::Extended {
                extra: len - self.payload_len,
            },
        };
        Decoded { message, fit }
    }
}

const fn entry<M: MessageRecord>() -> CatalogEntry {
    CatalogEntry {
        id: M::ID,
        name: M::NAME,
        payload_len: M::PAYLOAD_LEN,
        crc_extra: M::CRC_EXTRA,
        decode: decode_as::<M>,
    }
}

fn decode_as<M: MessageRecord>(buf: &mut &[u8]) -> Message {
    M::decode(buf).into()
}

/// How a received payload length compared with the catalog length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFit {
    Exact,
    /// Shorter than the base length; the missing tail was read as zeros.
    Truncated { missing: usize },
    /// Longer than the base length; the extra bytes were not interpreted.
    Extended { extra: usize },
}

impl PayloadFit {
    /// Whether this fit is a protocol error for the given frame version.
    ///
    /// v2 senders strip trailing zero bytes and may append extension fields,
    /// so only v1 frames must match the catalog length exactly.
    pub fn is_error_for(self, version: ProtocolVersion) -> bool {
        version == ProtocolVersion::V1 && self != Self::Exact
    }
}

/// A decoded record plus how its payload length matched the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub message: Message,
    pub fit: PayloadFit,
}

macro_rules! message_catalog {
    ($($(#[$meta:meta])* $variant:ident => $callback:ident,)+) => {
        /// Any record in the catalog.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum Message {
            $($(#[$meta])* $variant($variant),)+
        }

        impl Message {
            /// Wire message id.
            pub fn id(&self) -> u32 {
                match self {
                    $(Self::$variant(_) => <$variant as MessageRecord>::ID,)+
                }
            }

            /// Upper-case protocol name.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$variant as MessageRecord>::NAME,)+
                }
            }

            /// Invoke the one handler method that matches this record.
            pub fn deliver(self, source: Source, handler: &dyn MessageHandler) {
                match self {
                    $(Self::$variant(record) => handler.$callback(source, record),)+
                }
            }
        }

        $(
            impl From<$variant> for Message {
                fn from(record: $variant) -> Self {
                    Self::$variant(record)
                }
            }
        )+

        /// Every supported message, sorted by id.
        pub static CATALOG: &[CatalogEntry] = &[
            $(entry::<$variant>(),)+
        ];
    };
}

message_catalog! {
    Heartbeat => on_heartbeat,
    SysStatus => on_sys_status,
    ParamValue => on_param_value,
    GpsRawInt => on_gps_raw,
    ScaledPressure => on_scaled_pressure,
    Attitude => on_attitude,
    GlobalPositionInt => on_global_position,
    ServoOutputRaw => on_servo_output,
    MissionItem => on_mission_item,
    MissionRequest => on_mission_request,
    MissionCurrent => on_mission_current,
    MissionCount => on_mission_count,
    MissionItemReached => on_mission_item_reached,
    MissionAck => on_mission_ack,
    MissionRequestInt => on_mission_request_int,
    VfrHud => on_vfr_hud,
    CommandAck => on_command_ack,
    ScaledPressure2 => on_scaled_pressure2,
    NamedValueFloat => on_named_value_float,
    #[serde(rename = "STATUSTEXT")]
    StatusText => on_status_text,
}

/// Catalog row for `id`.
pub fn lookup(id: u32) -> Option<&'static CatalogEntry> {
    CATALOG
        .binary_search_by_key(&id, |entry| entry.id)
        .ok()
        .map(|index| &CATALOG[index])
}

/// CRC_EXTRA seed for `id`, in the shape [`FrameConfig::crc_extra`] expects.
pub fn crc_extra(id: u32) -> Option<u8> {
    lookup(id).map(|entry| entry.crc_extra)
}

/// Frame parser configuration seeded from this catalog.
pub fn frame_config() -> FrameConfig {
    FrameConfig {
        crc_extra,
        ..FrameConfig::default()
    }
}

/// Decode a validated frame. `None` for ids outside the catalog.
pub fn decode(frame: &Frame) -> Option<Decoded> {
    lookup(frame.message_id()).map(|entry| entry.decode(&frame.payload))
}

/// Decode `frame` and invoke the single matching method on `handler`.
///
/// Returns how the payload fit its catalog layout, or `None` when the id is
/// not in the catalog and nothing was called.
pub fn dispatch(frame: &Frame, handler: &dyn MessageHandler) -> Option<PayloadFit> {
    let Decoded { message, fit } = decode(frame)?;
    message.deliver(Source::from(&frame.header), handler);
    Some(fit)
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use mavwire_frame::{encode_frame, FrameHeader, FrameParser};

    use super::*;

    const HEARTBEAT_V1: [u8; 17] = [
        0xFE, 0x09, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x03, 0x51, 0x04, 0x03,
        0x97, 0xA3,
    ];

    fn parse(wire: &[u8]) -> Frame {
        let mut parser = FrameParser::with_config(frame_config());
        let mut frames: Vec<Frame> = wire.iter().filter_map(|b| parser.ingest(*b)).collect();
        assert_eq!(frames.len(), 1);
        frames.remove(0)
    }

    #[test]
    fn catalog_is_sorted_and_complete() {
        assert_eq!(CATALOG.len(), 20);
        assert!(CATALOG.windows(2).all(|pair| pair[0].id < pair[1].id));

        let ids: Vec<u32> = CATALOG.iter().map(|entry| entry.id).collect();
        assert_eq!(
            ids,
            vec![0, 1, 22, 24, 29, 30, 33, 36, 39, 40, 42, 44, 46, 47, 51, 74, 77, 137, 251, 253]
        );
    }

    #[test]
    fn lookup_known_and_unknown() {
        let entry = lookup(33).unwrap();
        assert_eq!(entry.name, "GLOBAL_POSITION_INT");
        assert_eq!(entry.payload_len, 28);
        assert_eq!(entry.crc_extra, 104);

        assert!(lookup(2).is_none());
        assert!(lookup(9000).is_none());
        assert_eq!(crc_extra(0), Some(50));
        assert_eq!(crc_extra(254), None);
    }

    #[test]
    fn decodes_known_heartbeat_frame() {
        let decoded = decode(&parse(&HEARTBEAT_V1)).unwrap();
        assert_eq!(decoded.fit, PayloadFit::Exact);
        match decoded.message {
            Message::Heartbeat(hb) => {
                assert_eq!(hb.mav_type, 2);
                assert_eq!(hb.autopilot, 3);
                assert_eq!(hb.base_mode, 0x51);
                assert_eq!(hb.system_status, 4);
                assert_eq!(hb.mavlink_version, 3);
            }
            other => panic!("expected heartbeat, got {other:?}"),
        }
    }

    #[test]
    fn dispatch_calls_one_method() {
        use std::sync::Mutex;

        #[derive(Default)]
        struct Counter {
            heartbeats: Mutex<Vec<Source>>,
        }

        impl MessageHandler for Counter {
            fn on_heartbeat(&self, source: Source, _msg: Heartbeat) {
                self.heartbeats.lock().unwrap().push(source);
            }
        }

        let counter = Counter::default();
        assert_eq!(dispatch(&parse(&HEARTBEAT_V1), &counter), Some(PayloadFit::Exact));
        assert_eq!(*counter.heartbeats.lock().unwrap(), vec![Source::new(1, 1)]);

        let mut wire = BytesMut::new();
        encode_frame(&FrameHeader::v1(0, 1, 1, 200), &[1, 2, 3], 0, &mut wire).unwrap();
        assert_eq!(dispatch(&parse(&wire), &counter), None);
        assert_eq!(counter.heartbeats.lock().unwrap().len(), 1);
    }

    #[test]
    fn wrong_crc_extra_fails_checksum() {
        let mut wire = BytesMut::new();
        encode_frame(&FrameHeader::v1(0, 1, 1, 30), &[0; 28], 40, &mut wire).unwrap();

        let mut parser = FrameParser::with_config(frame_config());
        assert!(wire.iter().all(|b| parser.ingest(*b).is_none()));
    }

    #[test]
    fn truncated_v2_payload_is_zero_padded() {
        let mut wire = BytesMut::new();
        let payload = [0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x3F];
        encode_frame(&FrameHeader::v2(0, 1, 1, 30), &payload, 39, &mut wire).unwrap();

        let decoded = decode(&parse(&wire)).unwrap();
        assert_eq!(decoded.fit, PayloadFit::Truncated { missing: 20 });
        assert!(!decoded.fit.is_error_for(ProtocolVersion::V2));
        assert!(decoded.fit.is_error_for(ProtocolVersion::V1));
        match decoded.message {
            Message::Attitude(att) => {
                assert_eq!(att.time_boot_ms, 10);
                assert_eq!(att.roll, 1.0);
                assert_eq!(att.pitch, 0.0);
                assert_eq!(att.yawspeed, 0.0);
            }
            other => panic!("expected attitude, got {other:?}"),
        }
    }

    #[test]
    fn extended_payload_ignores_extra_bytes() {
        let entry = lookup(42).unwrap();
        let decoded = entry.decode(&[5, 0, 1, 2, 3]);
        assert_eq!(decoded.fit, PayloadFit::Extended { extra: 3 });
        assert_eq!(
            decoded.message,
            Message::MissionCurrent(MissionCurrent { seq: 5 })
        );
    }

    #[test]
    fn unknown_id_decodes_to_none() {
        let mut wire = BytesMut::new();
        encode_frame(&FrameHeader::v1(0, 1, 1, 200), &[1, 2, 3], 0, &mut wire).unwrap();
        assert!(decode(&parse(&wire)).is_none());
    }

    #[test]
    fn every_entry_decodes_zero_payload_to_its_own_id() {
        for entry in CATALOG {
            let decoded = entry.decode(&[]);
            assert_eq!(decoded.message.id(), entry.id);
            assert_eq!(decoded.message.name(), entry.name);
        }
    }

    #[test]
    fn serializes_with_protocol_name_tag() {
        let json = serde_json::to_value(Message::StatusText(StatusText {
            severity: 6,
            text: "ready".into(),
        }))
        .unwrap();
        assert_eq!(json["type"], "STATUSTEXT");
        assert_eq!(json["text"], "ready");

        let json = serde_json::to_value(Message::from(Heartbeat::default())).unwrap();
        assert_eq!(json["type"], "HEARTBEAT");
        assert_eq!(json["mav_type"], 0);

        let json = serde_json::to_value(Message::from(ScaledPressure2::default())).unwrap();
        assert_eq!(json["type"], "SCALED_PRESSURE2");
        assert_eq!(json["temperature"], 0);
    }
}
