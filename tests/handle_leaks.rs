//! Every failing construction path has to give its handle back.
//!
//! Kept in its own test binary with a single test, so that no other
//! test opens descriptors while these are being counted.

use {
    std::{
        fs
    },
    uinput_joystick::{
        Axis,
        Button,
        JoystickError,
        VirtualJoystick
    }
};

fn open_descriptor_count() -> usize {
    fs::read_dir( "/proc/self/fd" ).unwrap().count()
}

#[test]
fn test_failed_construction_releases_handle() {
    let axes = [Axis::new( 0_u16, -32767, 32767 )];
    let buttons = [Button::new( 0_u16 )];
    let before = open_descriptor_count();

    match VirtualJoystick::create( "/dev/null", "", &axes, &buttons ) {
        Err( JoystickError::InvalidName { .. } ) => {},
        Err( error ) => panic!( "unexpected error: {}", error ),
        Ok( _ ) => panic!( "unexpected success" )
    }
    assert_eq!( open_descriptor_count(), before );

    match VirtualJoystick::create( "/dev/null", vec![b'x'; 81], &axes, &buttons ) {
        Err( JoystickError::InvalidName { .. } ) => {},
        Err( error ) => panic!( "unexpected error: {}", error ),
        Ok( _ ) => panic!( "unexpected success" )
    }
    assert_eq!( open_descriptor_count(), before );

    match VirtualJoystick::create( "/dev/does-not-exist", "TestPad", &axes, &buttons ) {
        Err( JoystickError::InvalidPath { .. } ) => {},
        Err( error ) => panic!( "unexpected error: {}", error ),
        Ok( _ ) => panic!( "unexpected success" )
    }
    assert_eq!( open_descriptor_count(), before );

    // /dev/null can be opened but refuses every uinput ioctl.
    match VirtualJoystick::create( "/dev/null", "TestPad", &axes, &buttons ) {
        Err( JoystickError::CapabilityRegistration { .. } ) => {},
        Err( error ) => panic!( "unexpected error: {}", error ),
        Ok( _ ) => panic!( "unexpected success" )
    }
    assert_eq!( open_descriptor_count(), before );
}
