use {
    std::{
        mem,
        slice
    }
};

/// Highest absolute axis code the kernel knows about.
pub const ABS_MAX: u16 = 0x3f;
/// Size of the per-axis range tables in the device descriptor.
pub const ABS_CNT: usize = ABS_MAX as usize + 1;
/// Highest key or button code the kernel knows about.
pub const KEY_MAX: u16 = 0x2ff;

pub const SYN_REPORT: u16 = 0;

/// The timestamp of an event record.
///
/// Events written into a virtual device carry a zeroed timestamp;
/// the kernel stamps them itself.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[repr(C)]
pub struct Timestamp {
    pub sec: libc::time_t,
    pub usec: libc::suseconds_t
}

/// A single `struct input_event` exactly as the kernel expects it.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[repr(C)]
pub struct RawInputEvent {
    pub timestamp: Timestamp,
    pub kind: u16,
    pub code: u16,
    pub value: i32
}

impl RawInputEvent {
    pub fn new( kind: EventKind, code: u16, value: i32 ) -> Self {
        RawInputEvent {
            timestamp: Timestamp::default(),
            kind: kind.raw(),
            code,
            value
        }
    }

    /// The `SYN_REPORT` record which flushes everything written before it.
    pub fn synchronization() -> Self {
        RawInputEvent::new( EventKind::Synchronization, SYN_REPORT, 0 )
    }

    pub fn as_bytes( &self ) -> &[u8] {
        let bytes = self as *const RawInputEvent as *const u8;
        unsafe { slice::from_raw_parts( bytes, mem::size_of::< RawInputEvent >() ) }
    }
}

define_enum! {
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
    enum EventKind {
        Other( u16 ),
        Synchronization     = 0x00,
        Key                 = 0x01,
        RelativeAxis        = 0x02,
        AbsoluteAxis        = 0x03,
        Misc                = 0x04,
        Switch              = 0x05,
        LED                 = 0x11,
        Sound               = 0x12,
        AutoRepeat          = 0x14,
        ForceFeedback       = 0x15,
        Power               = 0x16,
        ForceFeedbackStatus = 0x17
    }
}

define_enum! {
    // Source: linux/input-event-codes.h
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
    enum AbsoluteAxis {
        Other( u16 ),
        X = 0x00,
        Y = 0x01,
        Z = 0x02,
        RX = 0x03,
        RY = 0x04,
        RZ = 0x05,
        Throttle = 0x06,
        Rudder = 0x07,
        Wheel = 0x08,
        Gas = 0x09,
        Brake = 0x0a,
        Hat0X = 0x10,
        Hat0Y = 0x11,
        Hat1X = 0x12,
        Hat1Y = 0x13,
        Hat2X = 0x14,
        Hat2Y = 0x15,
        Hat3X = 0x16,
        Hat3Y = 0x17,
        Pressure = 0x18,
        Distance = 0x19,
        TiltX = 0x1a,
        TiltY = 0x1b,
        ToolWidth = 0x1c,
        Volume = 0x20,
        Misc = 0x28
    }
}

define_enum! {
    // Joystick and gamepad buttons.
    // https://www.kernel.org/doc/html/v4.15/input/gamepad.html
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
    enum Key {
        Other( u16 ),
        Trigger = 0x120,
        Thumb = 0x121,
        Thumb2 = 0x122,
        Top = 0x123,
        Top2 = 0x124,
        Pinkie = 0x125,
        Base = 0x126,
        Base2 = 0x127,
        Base3 = 0x128,
        Base4 = 0x129,
        Base5 = 0x12a,
        Base6 = 0x12b,
        Dead = 0x12f,

        PadSouth = 0x130,
        PadEast = 0x131,
        ButtonC = 0x132,
        PadNorth = 0x133,
        PadWest = 0x134,
        ButtonZ = 0x135,
        ShoulderLeft = 0x136,
        ShoulderRight = 0x137,
        ShoulderLeftLower = 0x138,
        ShoulderRightLower = 0x139,
        Select = 0x13a,
        Start = 0x13b,
        HomeButton = 0x13c,
        StickLeft = 0x13d,
        StickRight = 0x13e,

        PadUp = 0x220,
        PadDown = 0x221,
        PadLeft = 0x222,
        PadRight = 0x223,

        TriggerHappy = 0x2c0
    }
}

define_enum! {
    // Source: linux/input.h
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
    enum Bus {
        Other( u16 ),
        PCI = 0x01,
        USB = 0x03,
        HIL = 0x04,
        Bluetooth = 0x05,
        Virtual = 0x06,
        ISA = 0x10,
        Host = 0x19
    }
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_raw_input_event_layout() {
    assert_eq!( mem::size_of::< RawInputEvent >(), 24 );

    let event = RawInputEvent::new( EventKind::AbsoluteAxis, 0x01, -2 );
    let bytes = event.as_bytes();
    assert!( bytes[ 0..16 ].iter().all( |&byte| byte == 0 ) );
    assert_eq!( &bytes[ 16..18 ], &3_u16.to_ne_bytes() );
    assert_eq!( &bytes[ 18..20 ], &1_u16.to_ne_bytes() );
    assert_eq!( &bytes[ 20..24 ], &(-2_i32).to_ne_bytes() );
}

#[test]
fn test_synchronization_event() {
    let event = RawInputEvent::synchronization();
    assert_eq!( event.kind, 0 );
    assert_eq!( event.code, SYN_REPORT );
    assert_eq!( event.value, 0 );
    assert_eq!( event.timestamp, Timestamp::default() );
}

#[test]
fn test_code_tables() {
    assert_eq!( u16::from( AbsoluteAxis::Hat0Y ), 0x11 );
    assert_eq!( AbsoluteAxis::from( 0x3f ), AbsoluteAxis::Other( 0x3f ) );
    assert_eq!( Key::from( 0x130 ), Key::PadSouth );
    assert_eq!( Bus::Virtual.raw(), 0x06 );
    assert_eq!( Key::PadSouth.to_string(), "PadSouth" );
    assert_eq!( Key::Other( 0x2c5 ).to_string(), "0x2C5" );
    assert!( AbsoluteAxis::LIST.iter().all( |&(_, axis)| axis.raw() <= ABS_MAX ) );
    assert!( Key::LIST.iter().all( |&(_, key)| key.raw() <= KEY_MAX ) );
}
