//! Consumer-facing callback interface.

use mavwire_frame::FrameHeader;
use serde::Serialize;

use crate::catalog::Message;
use crate::messages::*;

/// Sender of a frame: the (system id, component id) pair from its header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Source {
    pub system_id: u8,
    pub component_id: u8,
}

impl Source {
    pub fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            system_id,
            component_id,
        }
    }
}

impl From<&FrameHeader> for Source {
    fn from(header: &FrameHeader) -> Self {
        Self::new(header.system_id, header.component_id)
    }
}

/// Receives decoded messages, one method per record.
///
/// Every method defaults to a no-op, so consumers implement only what they
/// care about. Calls happen synchronously on the thread that fed the bytes,
/// after the decoder has released its internal lock; implementations may call
/// back into the decoder.
pub trait MessageHandler: Send + Sync {
    // Vehicle state
    fn on_heartbeat(&self, _source: Source, _msg: Heartbeat) {}
    fn on_sys_status(&self, _source: Source, _msg: SysStatus) {}
    fn on_param_value(&self, _source: Source, _msg: ParamValue) {}

    // Navigation
    fn on_gps_raw(&self, _source: Source, _msg: GpsRawInt) {}
    fn on_scaled_pressure(&self, _source: Source, _msg: ScaledPressure) {}
    fn on_scaled_pressure2(&self, _source: Source, _msg: ScaledPressure2) {}
    fn on_attitude(&self, _source: Source, _msg: Attitude) {}
    fn on_global_position(&self, _source: Source, _msg: GlobalPositionInt) {}
    fn on_servo_output(&self, _source: Source, _msg: ServoOutputRaw) {}
    fn on_vfr_hud(&self, _source: Source, _msg: VfrHud) {}

    // Mission protocol
    fn on_mission_item(&self, _source: Source, _msg: MissionItem) {}
    fn on_mission_request(&self, _source: Source, _msg: MissionRequest) {}
    fn on_mission_request_int(&self, _source: Source, _msg: MissionRequestInt) {}
    fn on_mission_current(&self, _source: Source, _msg: MissionCurrent) {}
    fn on_mission_count(&self, _source: Source, _msg: MissionCount) {}
    fn on_mission_item_reached(&self, _source: Source, _msg: MissionItemReached) {}
    fn on_mission_ack(&self, _source: Source, _msg: MissionAck) {}

    // Commands and diagnostics
    fn on_command_ack(&self, _source: Source, _msg: CommandAck) {}
    fn on_named_value_float(&self, _source: Source, _msg: NamedValueFloat) {}
    fn on_status_text(&self, _source: Source, _msg: StatusText) {}
}

/// Handler that forwards every record to one closure as a [`Message`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(Source, Message) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

macro_rules! forward {
    ($($method:ident($record:ty),)+) => {
        $(
            fn $method(&self, source: Source, msg: $record) {
                (self.f)(source, msg.into());
            }
        )+
    };
}

impl<F> MessageHandler for FnHandler<F>
where
    F: Fn(Source, Message) + Send + Sync,
{
    forward! {
        on_heartbeat(Heartbeat),
        on_sys_status(SysStatus),
        on_param_value(ParamValue),
        on_gps_raw(GpsRawInt),
        on_scaled_pressure(ScaledPressure),
        on_scaled_pressure2(ScaledPressure2),
        on_attitude(Attitude),
        on_global_position(GlobalPositionInt),
        on_servo_output(ServoOutputRaw),
        on_vfr_hud(VfrHud),
        on_mission_item(MissionItem),
        on_mission_request(MissionRequest),
        on_mission_request_int(MissionRequestInt),
        on_mission_current(MissionCurrent),
        on_mission_count(MissionCount),
        on_mission_item_reached(MissionItemReached),
        on_mission_ack(MissionAck),
        on_command_ack(CommandAck),
        on_named_value_float(NamedValueFloat),
        on_status_text(StatusText),
    }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::catalog::CATALOG;

    #[derive(Default)]
    struct HeartbeatsOnly {
        seen: Mutex<Vec<(Source, Heartbeat)>>,
    }

    impl MessageHandler for HeartbeatsOnly {
        fn on_heartbeat(&self, source: Source, msg: Heartbeat) {
            self.seen.lock().unwrap().push((source, msg));
        }
    }

    #[test]
    fn deliver_calls_matching_method_only() {
        let handler = HeartbeatsOnly::default();
        let source = Source::new(1, 1);

        Message::from(Heartbeat {
            mav_type: 2,
            ..Heartbeat::default()
        })
        .deliver(source, &handler);
        Message::from(CommandAck::default()).deliver(source, &handler);

        let seen = handler.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, source);
        assert_eq!(seen[0].1.mav_type, 2);
    }

    #[test]
    fn fn_handler_receives_every_record() {
        let received = Mutex::new(Vec::new());
        let handler = FnHandler::new(|source: Source, msg: Message| {
            received.lock().unwrap().push((source.system_id, msg.id()));
        });

        for entry in CATALOG {
            entry.decode(&[]).message.deliver(Source::new(7, 1), &handler);
        }

        drop(handler);
        let received = received.into_inner().unwrap();
        let expected: Vec<(u8, u32)> = CATALOG.iter().map(|entry| (7, entry.id)).collect();
        assert_eq!(received, expected);
    }

    #[test]
    fn source_from_header() {
        let header = FrameHeader::v2(3, 42, 190, 0);
        assert_eq!(Source::from(&header), Source::new(42, 190));
    }
}
