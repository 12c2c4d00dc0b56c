//! These tests create real devices, so they need write access to `/dev/uinput`
//! and read access to `/dev/input/event*`.

#![cfg(feature = "device-test")]

use {
    std::{
        fs::{
            self,
            File
        },
        io::{
            self,
            Read
        },
        mem,
        os::{
            unix::{
                fs::{
                    OpenOptionsExt
                },
                io::{
                    AsRawFd
                }
            }
        },
        sync::{
            Mutex
        },
        thread::{
            sleep
        },
        time::{
            Duration,
            Instant
        }
    },
    uinput_joystick::{
        AbsoluteAxis,
        Axis,
        Button,
        Capability,
        EventKind,
        JoystickError,
        Key,
        RawInputEvent,
        VirtualJoystick
    }
};

/// `struct input_absinfo`
#[derive(Default)]
#[repr(C)]
pub struct AbsInfo {
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub resolution: i32
}

nix::ioctl_read!( get_abs_info_x, b'E', 0x40, AbsInfo );
nix::ioctl_read!( get_abs_info_y, b'E', 0x41, AbsInfo );

const UINPUT_PATH: &str = "/dev/uinput";

// Descriptor counts are per process, so the tests must not overlap.
static SERIAL: Mutex< () > = Mutex::new( () );

fn open_descriptor_count() -> usize {
    fs::read_dir( "/proc/self/fd" ).unwrap().count()
}

fn test_joystick( name: &str ) -> VirtualJoystick {
    let axes = [
        Axis::new( AbsoluteAxis::X, -32767, 32767 ),
        Axis::new( AbsoluteAxis::Y, 0, 255 ),
    ];
    let buttons = [Button::new( Key::PadSouth ), Button::new( Key::PadEast )];
    VirtualJoystick::create( UINPUT_PATH, name, &axes, &buttons ).unwrap()
}

/// Opens the event node of `joystick`, waiting for udev to hand it over.
fn open_listener( joystick: &VirtualJoystick ) -> File {
    let path = joystick.device_path().unwrap();
    let deadline = Instant::now() + Duration::from_secs( 2 );
    loop {
        match fs::OpenOptions::new().read( true ).custom_flags( libc::O_NONBLOCK ).open( &path ) {
            Ok( fp ) => return fp,
            Err( _ ) if Instant::now() < deadline => sleep( Duration::from_millis( 50 ) ),
            Err( error ) => panic!( "failed to open {}: {}", path.display(), error )
        }
    }
}

/// Reads `count` records as `(kind, code, value)`.
fn read_events( fp: &mut File, count: usize ) -> Vec< (u16, u16, i32) > {
    let size = mem::size_of::< RawInputEvent >();
    let deadline = Instant::now() + Duration::from_secs( 2 );
    let mut output = Vec::new();
    let mut buffer = vec![0; size];
    while output.len() < count {
        match fp.read( &mut buffer ) {
            Ok( length ) => {
                assert_eq!( length, size );
                let body = &buffer[ size - 8.. ];
                output.push((
                    u16::from_ne_bytes( [body[ 0 ], body[ 1 ]] ),
                    u16::from_ne_bytes( [body[ 2 ], body[ 3 ]] ),
                    i32::from_ne_bytes( [body[ 4 ], body[ 5 ], body[ 6 ], body[ 7 ]] )
                ));
            },
            Err( ref error ) if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline => {
                sleep( Duration::from_millis( 10 ) );
            },
            Err( error ) => panic!( "failed to read events: {}", error )
        }
    }

    output
}

#[test]
fn test_create_and_close() {
    let _guard = SERIAL.lock().unwrap_or_else( |error| error.into_inner() );
    let before = open_descriptor_count();
    let mut joystick = test_joystick( "uinput-joystick create-and-close" );
    assert!( joystick.sysname().unwrap().starts_with( "input" ) );
    joystick.close().unwrap();
    assert_eq!( open_descriptor_count(), before );

    match joystick.close() {
        Err( error @ JoystickError::Close( _ ) ) => assert_eq!( error.raw_os_error(), Some( libc::EBADF ) ),
        result => panic!( "unexpected result: {:?}", result )
    }
}

#[test]
fn test_axis_outside_of_kernel_range() {
    let _guard = SERIAL.lock().unwrap_or_else( |error| error.into_inner() );
    let before = open_descriptor_count();
    let axes = [Axis::new( 0x40_u16, 0, 1 )];
    match VirtualJoystick::create( UINPUT_PATH, "uinput-joystick bad-axis", &axes, &[] ) {
        Err( JoystickError::CapabilityRegistration { capability, .. } ) => {
            assert_eq!( capability, Capability::AbsoluteAxis( 0x40 ) );
        },
        Err( error ) => panic!( "unexpected error: {}", error ),
        Ok( _ ) => panic!( "unexpected success" )
    }
    assert_eq!( open_descriptor_count(), before );
}

#[test]
fn test_events_are_observed() {
    let _guard = SERIAL.lock().unwrap_or_else( |error| error.into_inner() );
    let mut joystick = test_joystick( "uinput-joystick events" );
    let mut listener = open_listener( &joystick );

    let mut info = AbsInfo::default();
    unsafe { get_abs_info_x( listener.as_raw_fd(), &mut info ) }.unwrap();
    assert_eq!( (info.minimum, info.maximum), (-32767, 32767) );

    let mut info = AbsInfo::default();
    unsafe { get_abs_info_y( listener.as_raw_fd(), &mut info ) }.unwrap();
    assert_eq!( (info.minimum, info.maximum), (0, 255) );

    let abs = EventKind::AbsoluteAxis.raw();
    let key = EventKind::Key.raw();
    let south = Key::PadSouth.raw();

    joystick.set_axis( AbsoluteAxis::X.raw(), 15000 ).unwrap();
    joystick.set_button( south, true ).unwrap();
    joystick.set_button( south, false ).unwrap();

    assert_eq!( read_events( &mut listener, 6 ), vec![
        (abs, 0, 15000),
        (0, 0, 0),
        (key, south, 1),
        (0, 0, 0),
        (key, south, 0),
        (0, 0, 0)
    ]);

    joystick.close().unwrap();
}
