use {
    crate::{
        input_sys::{
            ABS_CNT
        }
    },
    std::{
        mem,
        slice
    }
};

/// Width of the name field in the device descriptor.
pub const UINPUT_MAX_NAME_SIZE: usize = 80;

#[derive(Clone, PartialEq, Eq, Debug)]
#[repr(C)]
pub struct RawDeviceId {
    pub bus: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16
}

/// The legacy `struct uinput_user_dev` descriptor, written into
/// the handle right before the device is created.
#[repr(C)]
pub struct RawUserDevice {
    pub name: [u8; UINPUT_MAX_NAME_SIZE],
    pub id: RawDeviceId,
    pub force_feedback_effects_max: u32,
    pub absmax: [i32; ABS_CNT],
    pub absmin: [i32; ABS_CNT],
    pub absfuzz: [i32; ABS_CNT],
    pub absflat: [i32; ABS_CNT]
}

impl RawUserDevice {
    pub fn as_bytes( &self ) -> &[u8] {
        let bytes = self as *const RawUserDevice as *const u8;
        unsafe { slice::from_raw_parts( bytes, mem::size_of::< RawUserDevice >() ) }
    }
}

ioctl_none!( device_create, b'U', 1 );
ioctl_none!( device_destroy, b'U', 2 );

ioctl_write_int!( device_set_event_bit, b'U', 100 );
ioctl_write_int!( device_set_key_bit, b'U', 101 );
ioctl_write_int!( device_set_absolute_axis_bit, b'U', 103 );

/// `UI_GET_SYSNAME` is a variable length read.
pub const UI_GET_SYSNAME: usize = 44;

#[test]
fn test_user_device_layout() {
    assert_eq!( mem::size_of::< RawDeviceId >(), 8 );
    assert_eq!( mem::size_of::< RawUserDevice >(), 80 + 8 + 4 + 4 * 4 * ABS_CNT );

    let mut device = RawUserDevice {
        name: [0; UINPUT_MAX_NAME_SIZE],
        id: RawDeviceId { bus: 0x06, vendor: 0x01, product: 0x02, version: 0x03 },
        force_feedback_effects_max: 0,
        absmax: [0; ABS_CNT],
        absmin: [0; ABS_CNT],
        absfuzz: [0; ABS_CNT],
        absflat: [0; ABS_CNT]
    };
    device.name[ 0 ] = b'J';
    device.absmax[ 1 ] = 7;
    device.absmin[ 1 ] = -7;

    let bytes = device.as_bytes();
    assert_eq!( bytes[ 0 ], b'J' );
    assert_eq!( &bytes[ 80..82 ], &0x06_u16.to_ne_bytes() );
    assert_eq!( &bytes[ 86..88 ], &0x03_u16.to_ne_bytes() );

    let absmax = 92;
    let absmin = absmax + 4 * ABS_CNT;
    assert_eq!( &bytes[ absmax + 4..absmax + 8 ], &7_i32.to_ne_bytes() );
    assert_eq!( &bytes[ absmin + 4..absmin + 8 ], &(-7_i32).to_ne_bytes() );
}
