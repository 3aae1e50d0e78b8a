//! Message records.
//!
//! Every record reads its fields little-endian in wire order, largest type
//! first. `decode` is handed a buffer of at least `PAYLOAD_LEN` bytes; the
//! catalog zero-pads truncated payloads before calling it.

use bytes::Buf;
use serde::Serialize;

/// A message type with a fixed slot in the catalog.
pub trait MessageRecord: Sized + Into<crate::catalog::Message> {
    /// Wire message id.
    const ID: u32;
    /// Upper-case protocol name, e.g. `HEARTBEAT`.
    const NAME: &'static str;
    /// Base payload length without extension fields.
    const PAYLOAD_LEN: usize;
    /// Seed byte folded into the frame checksum after the payload.
    const CRC_EXTRA: u8;

    /// Read the record from the front of `buf`.
    ///
    /// `buf` must hold at least [`Self::PAYLOAD_LEN`] bytes.
    fn decode(buf: &mut &[u8]) -> Self;
}

fn read_chars<const N: usize>(buf: &mut &[u8]) -> String {
    let mut raw = [0u8; N];
    buf.copy_to_slice(&mut raw);
    let end = raw.iter().position(|b| *b == 0).unwrap_or(N);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

fn read_u16s<const N: usize>(buf: &mut &[u8]) -> [u16; N] {
    let mut values = [0u16; N];
    for value in &mut values {
        *value = buf.get_u16_le();
    }
    values
}

// -- Vehicle state ----------------------------------------------------------

/// `base_mode` bit: motors armed.
pub const MODE_FLAG_SAFETY_ARMED: u8 = 0x80;
/// `base_mode` bit: manual input enabled.
pub const MODE_FLAG_MANUAL_INPUT_ENABLED: u8 = 0x40;
/// `base_mode` bit: hardware-in-the-loop simulation.
pub const MODE_FLAG_HIL_ENABLED: u8 = 0x20;
/// `base_mode` bit: attitude stabilization.
pub const MODE_FLAG_STABILIZE_ENABLED: u8 = 0x10;
/// `base_mode` bit: guided mode.
pub const MODE_FLAG_GUIDED_ENABLED: u8 = 0x08;
/// `base_mode` bit: autonomous mode.
pub const MODE_FLAG_AUTO_ENABLED: u8 = 0x04;
/// `base_mode` bit: test mode.
pub const MODE_FLAG_TEST_ENABLED: u8 = 0x02;
/// `base_mode` bit: `custom_mode` is meaningful.
pub const MODE_FLAG_CUSTOM_MODE_ENABLED: u8 = 0x01;

/// Periodic liveness message carrying vehicle type and mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Heartbeat {
    pub custom_mode: u32,
    pub mav_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub system_status: u8,
    pub mavlink_version: u8,
}

impl Heartbeat {
    pub fn is_armed(&self) -> bool {
        self.base_mode & MODE_FLAG_SAFETY_ARMED != 0
    }
}

impl MessageRecord for Heartbeat {
    const ID: u32 = 0;
    const NAME: &'static str = "HEARTBEAT";
    const PAYLOAD_LEN: usize = 9;
    const CRC_EXTRA: u8 = 50;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            custom_mode: buf.get_u32_le(),
            mav_type: buf.get_u8(),
            autopilot: buf.get_u8(),
            base_mode: buf.get_u8(),
            system_status: buf.get_u8(),
            mavlink_version: buf.get_u8(),
        }
    }
}

/// Onboard sensor health, battery and link quality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SysStatus {
    pub onboard_control_sensors_present: u32,
    pub onboard_control_sensors_enabled: u32,
    pub onboard_control_sensors_health: u32,
    /// Main loop load in 0.1 % units.
    pub load: u16,
    /// Battery voltage in mV.
    pub voltage_battery: u16,
    /// Battery current in 10 mA units, `-1` when unknown.
    pub current_battery: i16,
    pub drop_rate_comm: u16,
    pub errors_comm: u16,
    pub errors_count: [u16; 4],
    /// Remaining battery in percent, `-1` when unknown.
    pub battery_remaining: i8,
}

impl MessageRecord for SysStatus {
    const ID: u32 = 1;
    const NAME: &'static str = "SYS_STATUS";
    const PAYLOAD_LEN: usize = 31;
    const CRC_EXTRA: u8 = 124;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            onboard_control_sensors_present: buf.get_u32_le(),
            onboard_control_sensors_enabled: buf.get_u32_le(),
            onboard_control_sensors_health: buf.get_u32_le(),
            load: buf.get_u16_le(),
            voltage_battery: buf.get_u16_le(),
            current_battery: buf.get_i16_le(),
            drop_rate_comm: buf.get_u16_le(),
            errors_comm: buf.get_u16_le(),
            errors_count: read_u16s(buf),
            battery_remaining: buf.get_i8(),
        }
    }
}

/// One onboard parameter, sent in response to a parameter read or list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParamValue {
    pub param_value: f32,
    pub param_count: u16,
    pub param_index: u16,
    pub param_id: String,
    pub param_type: u8,
}

impl MessageRecord for ParamValue {
    const ID: u32 = 22;
    const NAME: &'static str = "PARAM_VALUE";
    const PAYLOAD_LEN: usize = 25;
    const CRC_EXTRA: u8 = 220;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            param_value: buf.get_f32_le(),
            param_count: buf.get_u16_le(),
            param_index: buf.get_u16_le(),
            param_id: read_chars::<16>(buf),
            param_type: buf.get_u8(),
        }
    }
}

// -- Navigation -------------------------------------------------------------

/// Raw GNSS fix. Latitude and longitude in 1e-7 degrees, altitude in mm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GpsRawInt {
    pub time_usec: u64,
    pub lat: i32,
    pub lon: i32,
    pub alt: i32,
    pub eph: u16,
    pub epv: u16,
    /// Ground speed in cm/s.
    pub vel: u16,
    /// Course over ground in centidegrees.
    pub cog: u16,
    pub fix_type: u8,
    pub satellites_visible: u8,
}

impl MessageRecord for GpsRawInt {
    const ID: u32 = 24;
    const NAME: &'static str = "GPS_RAW_INT";
    const PAYLOAD_LEN: usize = 30;
    const CRC_EXTRA: u8 = 24;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            time_usec: buf.get_u64_le(),
            lat: buf.get_i32_le(),
            lon: buf.get_i32_le(),
            alt: buf.get_i32_le(),
            eph: buf.get_u16_le(),
            epv: buf.get_u16_le(),
            vel: buf.get_u16_le(),
            cog: buf.get_u16_le(),
            fix_type: buf.get_u8(),
            satellites_visible: buf.get_u8(),
        }
    }
}

/// Barometer reading. Pressures in hPa, temperature in centidegrees Celsius.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScaledPressure {
    pub time_boot_ms: u32,
    pub press_abs: f32,
    pub press_diff: f32,
    pub temperature: i16,
}

impl MessageRecord for ScaledPressure {
    const ID: u32 = 29;
    const NAME: &'static str = "SCALED_PRESSURE";
    const PAYLOAD_LEN: usize = 14;
    const CRC_EXTRA: u8 = 115;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            time_boot_ms: buf.get_u32_le(),
            press_abs: buf.get_f32_le(),
            press_diff: buf.get_f32_le(),
            temperature: buf.get_i16_le(),
        }
    }
}

/// Second barometer, same layout as [`ScaledPressure`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScaledPressure2(pub ScaledPressure);

impl MessageRecord for ScaledPressure2 {
    const ID: u32 = 137;
    const NAME: &'static str = "SCALED_PRESSURE2";
    const PAYLOAD_LEN: usize = 14;
    const CRC_EXTRA: u8 = 195;

    fn decode(buf: &mut &[u8]) -> Self {
        Self(ScaledPressure::decode(buf))
    }
}

/// Vehicle attitude in radians and angular rates in rad/s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attitude {
    pub time_boot_ms: u32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub rollspeed: f32,
    pub pitchspeed: f32,
    pub yawspeed: f32,
}

impl MessageRecord for Attitude {
    const ID: u32 = 30;
    const NAME: &'static str = "ATTITUDE";
    const PAYLOAD_LEN: usize = 28;
    const CRC_EXTRA: u8 = 39;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            time_boot_ms: buf.get_u32_le(),
            roll: buf.get_f32_le(),
            pitch: buf.get_f32_le(),
            yaw: buf.get_f32_le(),
            rollspeed: buf.get_f32_le(),
            pitchspeed: buf.get_f32_le(),
            yawspeed: buf.get_f32_le(),
        }
    }
}

/// Fused position estimate. Altitudes in mm, velocities in cm/s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalPositionInt {
    pub time_boot_ms: u32,
    pub lat: i32,
    pub lon: i32,
    pub alt: i32,
    pub relative_alt: i32,
    pub vx: i16,
    pub vy: i16,
    pub vz: i16,
    /// Heading in centidegrees, `u16::MAX` when unknown.
    pub hdg: u16,
}

impl MessageRecord for GlobalPositionInt {
    const ID: u32 = 33;
    const NAME: &'static str = "GLOBAL_POSITION_INT";
    const PAYLOAD_LEN: usize = 28;
    const CRC_EXTRA: u8 = 104;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            time_boot_ms: buf.get_u32_le(),
            lat: buf.get_i32_le(),
            lon: buf.get_i32_le(),
            alt: buf.get_i32_le(),
            relative_alt: buf.get_i32_le(),
            vx: buf.get_i16_le(),
            vy: buf.get_i16_le(),
            vz: buf.get_i16_le(),
            hdg: buf.get_u16_le(),
        }
    }
}

/// Servo output pulse widths in microseconds for eight outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServoOutputRaw {
    pub time_usec: u32,
    pub servo_raw: [u16; 8],
    pub port: u8,
}

impl MessageRecord for ServoOutputRaw {
    const ID: u32 = 36;
    const NAME: &'static str = "SERVO_OUTPUT_RAW";
    const PAYLOAD_LEN: usize = 21;
    const CRC_EXTRA: u8 = 222;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            time_usec: buf.get_u32_le(),
            servo_raw: read_u16s(buf),
            port: buf.get_u8(),
        }
    }
}

// -- Mission protocol -------------------------------------------------------

/// One mission waypoint or command.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MissionItem {
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub seq: u16,
    pub command: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub frame: u8,
    pub current: u8,
    pub autocontinue: u8,
}

impl MessageRecord for MissionItem {
    const ID: u32 = 39;
    const NAME: &'static str = "MISSION_ITEM";
    const PAYLOAD_LEN: usize = 37;
    const CRC_EXTRA: u8 = 254;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            param1: buf.get_f32_le(),
            param2: buf.get_f32_le(),
            param3: buf.get_f32_le(),
            param4: buf.get_f32_le(),
            x: buf.get_f32_le(),
            y: buf.get_f32_le(),
            z: buf.get_f32_le(),
            seq: buf.get_u16_le(),
            command: buf.get_u16_le(),
            target_system: buf.get_u8(),
            target_component: buf.get_u8(),
            frame: buf.get_u8(),
            current: buf.get_u8(),
            autocontinue: buf.get_u8(),
        }
    }
}

/// Request for the mission item with sequence number `seq`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissionRequest {
    pub seq: u16,
    pub target_system: u8,
    pub target_component: u8,
}

impl MessageRecord for MissionRequest {
    const ID: u32 = 40;
    const NAME: &'static str = "MISSION_REQUEST";
    const PAYLOAD_LEN: usize = 4;
    const CRC_EXTRA: u8 = 230;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            seq: buf.get_u16_le(),
            target_system: buf.get_u8(),
            target_component: buf.get_u8(),
        }
    }
}

/// Sequence number of the active mission item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissionCurrent {
    pub seq: u16,
}

impl MessageRecord for MissionCurrent {
    const ID: u32 = 42;
    const NAME: &'static str = "MISSION_CURRENT";
    const PAYLOAD_LEN: usize = 2;
    const CRC_EXTRA: u8 = 28;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            seq: buf.get_u16_le(),
        }
    }
}

/// Number of items in a mission upload or download.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissionCount {
    pub count: u16,
    pub target_system: u8,
    pub target_component: u8,
}

impl MessageRecord for MissionCount {
    const ID: u32 = 44;
    const NAME: &'static str = "MISSION_COUNT";
    const PAYLOAD_LEN: usize = 4;
    const CRC_EXTRA: u8 = 221;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            count: buf.get_u16_le(),
            target_system: buf.get_u8(),
            target_component: buf.get_u8(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissionItemReached {
    pub seq: u16,
}

impl MessageRecord for MissionItemReached {
    const ID: u32 = 46;
    const NAME: &'static str = "MISSION_ITEM_REACHED";
    const PAYLOAD_LEN: usize = 2;
    const CRC_EXTRA: u8 = 11;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            seq: buf.get_u16_le(),
        }
    }
}

/// End of a mission transaction. `ack_type` is the mission result code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissionAck {
    pub target_system: u8,
    pub target_component: u8,
    pub ack_type: u8,
}

impl MessageRecord for MissionAck {
    const ID: u32 = 47;
    const NAME: &'static str = "MISSION_ACK";
    const PAYLOAD_LEN: usize = 3;
    const CRC_EXTRA: u8 = 153;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            target_system: buf.get_u8(),
            target_component: buf.get_u8(),
            ack_type: buf.get_u8(),
        }
    }
}

/// Like [`MissionRequest`], asking for the integer-coordinate item form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissionRequestInt {
    pub seq: u16,
    pub target_system: u8,
    pub target_component: u8,
}

impl MessageRecord for MissionRequestInt {
    const ID: u32 = 51;
    const NAME: &'static str = "MISSION_REQUEST_INT";
    const PAYLOAD_LEN: usize = 4;
    const CRC_EXTRA: u8 = 196;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            seq: buf.get_u16_le(),
            target_system: buf.get_u8(),
            target_component: buf.get_u8(),
        }
    }
}

// -- HUD and commands -------------------------------------------------------

/// Summary values shown on a head-up display. Speeds in m/s, `alt` in m.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VfrHud {
    pub airspeed: f32,
    pub groundspeed: f32,
    pub alt: f32,
    pub climb: f32,
    /// Compass heading in degrees.
    pub heading: i16,
    /// Throttle in percent.
    pub throttle: u16,
}

impl MessageRecord for VfrHud {
    const ID: u32 = 74;
    const NAME: &'static str = "VFR_HUD";
    const PAYLOAD_LEN: usize = 20;
    const CRC_EXTRA: u8 = 20;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            airspeed: buf.get_f32_le(),
            groundspeed: buf.get_f32_le(),
            alt: buf.get_f32_le(),
            climb: buf.get_f32_le(),
            heading: buf.get_i16_le(),
            throttle: buf.get_u16_le(),
        }
    }
}

/// Result of a previously sent command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandAck {
    pub command: u16,
    pub result: u8,
}

impl MessageRecord for CommandAck {
    const ID: u32 = 77;
    const NAME: &'static str = "COMMAND_ACK";
    const PAYLOAD_LEN: usize = 3;
    const CRC_EXTRA: u8 = 143;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            command: buf.get_u16_le(),
            result: buf.get_u8(),
        }
    }
}

// -- Diagnostics ------------------------------------------------------------

/// Free-form named debug value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NamedValueFloat {
    pub time_boot_ms: u32,
    pub value: f32,
    pub name: String,
}

impl MessageRecord for NamedValueFloat {
    const ID: u32 = 251;
    const NAME: &'static str = "NAMED_VALUE_FLOAT";
    const PAYLOAD_LEN: usize = 18;
    const CRC_EXTRA: u8 = 170;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            time_boot_ms: buf.get_u32_le(),
            value: buf.get_f32_le(),
            name: read_chars::<10>(buf),
        }
    }
}

/// Human-readable status line. `severity` follows syslog levels (0 = emergency).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusText {
    pub severity: u8,
    pub text: String,
}

impl MessageRecord for StatusText {
    const ID: u32 = 253;
    const NAME: &'static str = "STATUSTEXT";
    const PAYLOAD_LEN: usize = 51;
    const CRC_EXTRA: u8 = 83;

    fn decode(buf: &mut &[u8]) -> Self {
        Self {
            severity: buf.get_u8(),
            text: read_chars::<50>(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode<M: MessageRecord>(payload: &[u8]) -> M {
        assert_eq!(payload.len(), M::PAYLOAD_LEN);
        let mut buf = payload;
        let record = M::decode(&mut buf);
        assert!(buf.is_empty(), "{} left {} bytes unread", M::NAME, buf.len());
        record
    }

    #[test]
    fn heartbeat_fields() {
        let hb: Heartbeat = decode(&[0x04, 0x03, 0x02, 0x01, 2, 3, 0x51, 4, 3]);
        assert_eq!(
            hb,
            Heartbeat {
                custom_mode: 0x0102_0304,
                mav_type: 2,
                autopilot: 3,
                base_mode: 0x51,
                system_status: 4,
                mavlink_version: 3,
            }
        );
        assert!(!hb.is_armed());
        assert!(Heartbeat { base_mode: 0xD1, ..hb }.is_armed());
    }

    #[test]
    fn sys_status_signed_fields() {
        let mut payload = vec![0u8; SysStatus::PAYLOAD_LEN];
        payload[12..14].copy_from_slice(&500u16.to_le_bytes());
        payload[14..16].copy_from_slice(&12_600u16.to_le_bytes());
        payload[16..18].copy_from_slice(&(-1i16).to_le_bytes());
        payload[22..24].copy_from_slice(&7u16.to_le_bytes());
        payload[30] = 0xFF;

        let status: SysStatus = decode(&payload);
        assert_eq!(status.load, 500);
        assert_eq!(status.voltage_battery, 12_600);
        assert_eq!(status.current_battery, -1);
        assert_eq!(status.errors_count, [7, 0, 0, 0]);
        assert_eq!(status.battery_remaining, -1);
    }

    #[test]
    fn param_value_id_stops_at_nul() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1.5f32.to_le_bytes());
        payload.extend_from_slice(&300u16.to_le_bytes());
        payload.extend_from_slice(&12u16.to_le_bytes());
        payload.extend_from_slice(b"SYSID_THISMAV\0\0\0");
        payload.push(9);

        let param: ParamValue = decode(&payload);
        assert_eq!(param.param_value, 1.5);
        assert_eq!(param.param_count, 300);
        assert_eq!(param.param_index, 12);
        assert_eq!(param.param_id, "SYSID_THISMAV");
        assert_eq!(param.param_type, 9);
    }

    #[test]
    fn char_array_without_nul_uses_full_width() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&2.0f32.to_le_bytes());
        payload.extend_from_slice(b"abcdefghij");

        let named: NamedValueFloat = decode(&payload);
        assert_eq!(named.name, "abcdefghij");
    }

    #[test]
    fn status_text_is_lossy() {
        let mut payload = vec![0u8; StatusText::PAYLOAD_LEN];
        payload[0] = 2;
        payload[1..4].copy_from_slice(&[b'o', 0xFF, b'k']);

        let text: StatusText = decode(&payload);
        assert_eq!(text.severity, 2);
        assert_eq!(text.text, "o\u{FFFD}k");
    }

    #[test]
    fn gps_raw_int_fields() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1_000_000u64.to_le_bytes());
        payload.extend_from_slice(&473_977_420i32.to_le_bytes());
        payload.extend_from_slice(&85_455_940i32.to_le_bytes());
        payload.extend_from_slice(&(-12_000i32).to_le_bytes());
        for value in [120u16, 150, 530, 9_000] {
            payload.extend_from_slice(&value.to_le_bytes());
        }
        payload.extend_from_slice(&[3, 11]);

        let gps: GpsRawInt = decode(&payload);
        assert_eq!(gps.time_usec, 1_000_000);
        assert_eq!(gps.lat, 473_977_420);
        assert_eq!(gps.lon, 85_455_940);
        assert_eq!(gps.alt, -12_000);
        assert_eq!((gps.eph, gps.epv, gps.vel, gps.cog), (120, 150, 530, 9_000));
        assert_eq!((gps.fix_type, gps.satellites_visible), (3, 11));
    }

    #[test]
    fn attitude_fields() {
        let mut payload = 42u32.to_le_bytes().to_vec();
        for value in [0.1f32, -0.2, 3.0, 0.01, 0.02, -0.03] {
            payload.extend_from_slice(&value.to_le_bytes());
        }

        let attitude: Attitude = decode(&payload);
        assert_eq!(attitude.time_boot_ms, 42);
        assert_eq!(attitude.roll, 0.1);
        assert_eq!(attitude.pitch, -0.2);
        assert_eq!(attitude.yaw, 3.0);
        assert_eq!(attitude.yawspeed, -0.03);
    }

    #[test]
    fn servo_outputs_in_order() {
        let mut payload = 7u32.to_le_bytes().to_vec();
        for value in 1000u16..1008 {
            payload.extend_from_slice(&value.to_le_bytes());
        }
        payload.push(1);

        let servo: ServoOutputRaw = decode(&payload);
        assert_eq!(servo.servo_raw, [1000, 1001, 1002, 1003, 1004, 1005, 1006, 1007]);
        assert_eq!(servo.port, 1);
    }

    #[test]
    fn mission_item_trailing_bytes() {
        let mut payload = Vec::new();
        for value in [0.0f32, 2.0, 0.0, f32::NAN, 47.39, 8.54, 30.0] {
            payload.extend_from_slice(&value.to_le_bytes());
        }
        payload.extend_from_slice(&5u16.to_le_bytes());
        payload.extend_from_slice(&16u16.to_le_bytes());
        payload.extend_from_slice(&[1, 190, 3, 0, 1]);

        let item: MissionItem = decode(&payload);
        assert!(item.param4.is_nan());
        assert_eq!(item.seq, 5);
        assert_eq!(item.command, 16);
        assert_eq!(
            (item.target_system, item.target_component, item.frame, item.current, item.autocontinue),
            (1, 190, 3, 0, 1)
        );
    }

    #[test]
    fn short_mission_records() {
        let request: MissionRequestInt = decode(&[0x02, 0x01, 1, 1]);
        assert_eq!(request.seq, 0x0102);

        let ack: MissionAck = decode(&[255, 0, 4]);
        assert_eq!((ack.target_system, ack.target_component, ack.ack_type), (255, 0, 4));

        let ack: CommandAck = decode(&[0x90, 0x01, 0]);
        assert_eq!(ack.command, 400);
        assert_eq!(ack.result, 0);
    }

    #[test]
    fn scaled_pressure2_shares_layout() {
        let mut payload = 10u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&1013.25f32.to_le_bytes());
        payload.extend_from_slice(&0.5f32.to_le_bytes());
        payload.extend_from_slice(&2150i16.to_le_bytes());

        let first: ScaledPressure = decode(&payload);
        let second: ScaledPressure2 = decode(&payload);
        assert_eq!(second.0, first);
        assert_eq!(first.temperature, 2150);
    }
}
