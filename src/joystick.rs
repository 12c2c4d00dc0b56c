use {
    std::{
        fs::{
            self,
            File
        },
        io,
        os::{
            unix::{
                fs::{
                    OpenOptionsExt
                },
                io::{
                    AsRawFd,
                    IntoRawFd
                }
            }
        },
        path::{
            Path,
            PathBuf
        }
    },
    crate::{
        error::{
            Capability,
            JoystickError,
            Result
        },
        event::{
            emit_into,
            write_record
        },
        input_sys::{
            ABS_CNT,
            Bus,
            EventKind
        },
        uinput_sys::{
            self,
            RawDeviceId,
            RawUserDevice,
            UI_GET_SYSNAME
        },
        utils::{
            ioctl_get_string,
            to_device_name,
            validate_device_name,
            validate_device_path
        }
    }
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An absolute axis together with the range reported to consumers.
///
/// Values passed to `VirtualJoystick::set_axis` are *not* clamped to this range.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Axis {
    pub id: u16,
    pub min: i32,
    pub max: i32
}

impl Axis {
    pub fn new( id: impl Into< u16 >, min: i32, max: i32 ) -> Self {
        Axis {
            id: id.into(),
            min,
            max
        }
    }
}

/// A button, hat direction or switch.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Button {
    pub id: u16
}

impl Button {
    pub fn new( id: impl Into< u16 > ) -> Self {
        Button {
            id: id.into()
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceId {
    #[cfg_attr(feature = "serde", serde(with = "bus_as_u16"))]
    pub bus: Bus,
    pub vendor: u16,
    pub product: u16,
    pub version: u16
}

impl Default for DeviceId {
    fn default() -> Self {
        DeviceId {
            bus: Bus::Virtual,
            vendor: 0x01,
            product: 0x02,
            version: 0x03
        }
    }
}

impl From< DeviceId > for RawDeviceId {
    fn from( id: DeviceId ) -> Self {
        RawDeviceId {
            bus: id.bus.into(),
            vendor: id.vendor,
            product: id.product,
            version: id.version
        }
    }
}

#[cfg(feature = "serde")]
mod bus_as_u16 {
    use {
        serde::{
            Deserialize,
            Deserializer,
            Serializer
        },
        crate::{
            input_sys::{
                Bus
            }
        }
    };

    pub fn serialize< S >( bus: &Bus, serializer: S ) -> Result< S::Ok, S::Error > where S: Serializer {
        serializer.serialize_u16( bus.raw() )
    }

    pub fn deserialize< 'de, D >( deserializer: D ) -> Result< Bus, D::Error > where D: Deserializer< 'de > {
        u16::deserialize( deserializer ).map( Bus::from )
    }
}

/// A joystick registered with the kernel through uinput.
///
/// Operations on one instance have to be serialized by the caller.
pub struct VirtualJoystick {
    name: Vec< u8 >,
    fp: Option< File >
}

impl VirtualJoystick {
    /// Creates a joystick with the default virtual bus identity.
    pub fn create< P, N >( path: P, name: N, axes: &[Axis], buttons: &[Button] ) -> Result< Self >
        where P: AsRef< Path >, N: AsRef< [u8] >
    {
        VirtualJoystick::create_with_id( path, name, DeviceId::default(), axes, buttons )
    }

    /// Creates a joystick and makes it visible to the rest of the system.
    ///
    /// Either every axis and button gets registered and the device
    /// is activated, or the handle is closed and an error is returned.
    pub fn create_with_id< P, N >( path: P, name: N, id: DeviceId, axes: &[Axis], buttons: &[Button] ) -> Result< Self >
        where P: AsRef< Path >, N: AsRef< [u8] >
    {
        let path = path.as_ref();
        let name = name.as_ref();

        validate_device_path( path )?;
        validate_device_name( name )?;

        let fp = fs::OpenOptions::new()
            .write( true )
            .create( false )
            .custom_flags( libc::O_NONBLOCK )
            .open( path )
            .map_err( JoystickError::DeviceOpen )?;

        // Every early return below drops `fp`, which closes the handle.
        register_event_kind( &fp, EventKind::Key )?;
        for button in buttons {
            log::debug!( "Registering button {}", button.id );
            unsafe {
                uinput_sys::device_set_key_bit( fp.as_raw_fd(), button.id as _ )
            }.map_err( |source| JoystickError::CapabilityRegistration {
                capability: Capability::Button( button.id ),
                source
            })?;
        }

        register_event_kind( &fp, EventKind::AbsoluteAxis )?;
        for axis in axes {
            log::debug!( "Registering absolute axis {} with range {}..={}", axis.id, axis.min, axis.max );
            unsafe {
                uinput_sys::device_set_absolute_axis_bit( fp.as_raw_fd(), axis.id as _ )
            }.map_err( |source| JoystickError::CapabilityRegistration {
                capability: Capability::AbsoluteAxis( axis.id ),
                source
            })?;
        }

        let setup = user_device( name, id, axes )?;
        write_record( &fp, setup.as_bytes(), "the device descriptor" ).map_err( JoystickError::DeviceActivation )?;
        unsafe {
            uinput_sys::device_create( fp.as_raw_fd() )
        }.map_err( |errno| JoystickError::DeviceActivation( errno.into() ) )?;

        log::info!(
            "Created virtual joystick '{}' with {} axes and {} buttons",
            String::from_utf8_lossy( name ),
            axes.len(),
            buttons.len()
        );

        Ok( VirtualJoystick {
            name: name.to_owned(),
            fp: Some( fp )
        })
    }

    #[cfg(test)]
    pub(crate) fn from_file( name: &[u8], fp: File ) -> Self {
        VirtualJoystick {
            name: name.to_owned(),
            fp: Some( fp )
        }
    }

    pub fn name( &self ) -> &[u8] {
        &self.name
    }

    /// Returns whether `close` has already been called.
    pub fn is_closed( &self ) -> bool {
        self.fp.is_none()
    }

    /// Sets the absolute position of an axis.
    ///
    /// The value is passed to the kernel as-is, even when it lies
    /// outside of the range the axis was declared with.
    pub fn set_axis( &self, axis: u16, value: i32 ) -> Result< () > {
        self.emit( EventKind::AbsoluteAxis, axis, value )
    }

    /// Presses or releases a button.
    pub fn set_button( &self, button: u16, pressed: bool ) -> Result< () > {
        let state = if pressed { 1 } else { 0 };
        self.emit( EventKind::Key, button, state )
    }

    fn emit( &self, kind: EventKind, code: u16, value: i32 ) -> Result< () > {
        match self.fp {
            Some( ref fp ) => emit_into( fp, kind, code, value ),
            None => Err( JoystickError::EventWrite {
                kind,
                code,
                source: closed_handle_error()
            })
        }
    }

    /// Destroys the device and closes its handle.
    ///
    /// The handle is released even if the kernel fails to destroy the device.
    /// Calling this again fails with `EBADF`.
    pub fn close( &mut self ) -> Result< () > {
        let fp = self.fp.take().ok_or_else( || JoystickError::Close( closed_handle_error() ) )?;
        let destroyed = unsafe {
            uinput_sys::device_destroy( fp.as_raw_fd() )
        };

        let closed = nix::unistd::close( fp.into_raw_fd() );
        if let Err( errno ) = destroyed {
            if let Err( close_errno ) = closed {
                log::warn!( "Failed to close the handle of virtual joystick '{}': {}", String::from_utf8_lossy( &self.name ), close_errno );
            }

            return Err( JoystickError::Close( errno.into() ) );
        }

        closed.map_err( |errno| JoystickError::Close( errno.into() ) )?;

        log::info!( "Closed virtual joystick '{}'", String::from_utf8_lossy( &self.name ) );
        Ok(())
    }

    fn fp( &self ) -> io::Result< &File > {
        self.fp.as_ref().ok_or_else( closed_handle_error )
    }

    /// The name the kernel gave to the device, e.g. `input17`.
    pub fn sysname( &self ) -> io::Result< String > {
        let fp = self.fp()?;
        let sysname = unsafe {
            ioctl_get_string( fp.as_raw_fd(), b'U', UI_GET_SYSNAME )
        }?;

        Ok( sysname )
    }

    /// The `/dev/input/event*` node through which the device's events can be observed.
    pub fn device_path( &self ) -> io::Result< PathBuf > {
        let sysname = self.sysname()?;
        let dir_path = Path::new( "/sys/devices/virtual/input" ).join( sysname );
        for entry in fs::read_dir( &dir_path )? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let file_name = entry.file_name();
            if file_name.to_string_lossy().starts_with( "event" ) {
                return Ok( Path::new( "/dev/input" ).join( file_name ) );
            }
        }

        Err( io::Error::new(
            io::ErrorKind::NotFound,
            format!( "no event node under {}", dir_path.display() )
        ))
    }
}

impl Drop for VirtualJoystick {
    fn drop( &mut self ) {
        if self.fp.is_none() {
            return;
        }

        if let Err( error ) = self.close() {
            log::warn!( "Failed to release virtual joystick '{}': {}", String::from_utf8_lossy( &self.name ), error );
        }
    }
}

fn register_event_kind( fp: &File, kind: EventKind ) -> Result< () > {
    log::debug!( "Registering event type {}", kind );
    unsafe {
        uinput_sys::device_set_event_bit( fp.as_raw_fd(), kind.raw() as _ )
    }.map_err( |source| JoystickError::CapabilityRegistration {
        capability: Capability::EventKind( kind ),
        source
    })?;

    Ok(())
}

/// Builds the device descriptor.
///
/// The range tables are dense and indexed by axis code;
/// a later duplicate of an axis overwrites the earlier range.
fn user_device( name: &[u8], id: DeviceId, axes: &[Axis] ) -> Result< RawUserDevice > {
    let mut setup = RawUserDevice {
        name: to_device_name( name ),
        id: id.into(),
        force_feedback_effects_max: 0,
        absmax: [0; ABS_CNT],
        absmin: [0; ABS_CNT],
        absfuzz: [0; ABS_CNT],
        absflat: [0; ABS_CNT]
    };

    for axis in axes {
        let index = axis.id as usize;
        if index >= ABS_CNT {
            return Err( JoystickError::CapabilityRegistration {
                capability: Capability::AbsoluteAxis( axis.id ),
                source: nix::errno::Errno::EINVAL
            });
        }

        setup.absmin[ index ] = axis.min;
        setup.absmax[ index ] = axis.max;
    }

    Ok( setup )
}

fn closed_handle_error() -> io::Error {
    io::Error::from_raw_os_error( libc::EBADF )
}

#[cfg(test)]
use crate::event::test_utils::ScratchFile;

#[test]
fn test_default_identity() {
    let id: RawDeviceId = DeviceId::default().into();
    assert_eq!( id, RawDeviceId { bus: 0x06, vendor: 0x01, product: 0x02, version: 0x03 } );
}

#[test]
fn test_axis_and_button_from_codes() {
    use crate::input_sys::{AbsoluteAxis, Key};

    assert_eq!( Axis::new( AbsoluteAxis::RY, -1, 1 ), Axis { id: 4, min: -1, max: 1 } );
    assert_eq!( Button::new( Key::Start ), Button { id: 0x13b } );
    assert_eq!( Button::new( 7_u16 ), Button { id: 7 } );
}

#[test]
fn test_user_device_range_tables() {
    let axes = [
        Axis::new( 0x00_u16, -32767, 32767 ),
        Axis::new( 0x05_u16, 0, 255 ),
        Axis::new( 0x3f_u16, -1, 1 )
    ];
    let setup = user_device( b"TestPad", DeviceId::default(), &axes ).unwrap();

    assert_eq!( &setup.name[ 0..8 ], b"TestPad\0" );
    assert_eq!( setup.id, RawDeviceId { bus: 0x06, vendor: 0x01, product: 0x02, version: 0x03 } );
    assert_eq!( (setup.absmin[ 0x00 ], setup.absmax[ 0x00 ]), (-32767, 32767) );
    assert_eq!( (setup.absmin[ 0x05 ], setup.absmax[ 0x05 ]), (0, 255) );
    assert_eq!( (setup.absmin[ 0x3f ], setup.absmax[ 0x3f ]), (-1, 1) );
    assert_eq!( (setup.absmin[ 0x01 ], setup.absmax[ 0x01 ]), (0, 0) );
    assert!( setup.absfuzz.iter().chain( setup.absflat.iter() ).all( |&value| value == 0 ) );

    // The kernel reads `absmax` before `absmin`.
    let bytes = setup.as_bytes();
    let absmax = 92;
    let absmin = absmax + 4 * ABS_CNT;
    assert_eq!( &bytes[ absmax + 4 * 0x05..absmax + 4 * 0x06 ], &255_i32.to_ne_bytes() );
    assert_eq!( &bytes[ absmin..absmin + 4 ], &(-32767_i32).to_ne_bytes() );
}

#[test]
fn test_user_device_duplicate_axis_overwrites() {
    let axes = [
        Axis::new( 0x02_u16, -100, 100 ),
        Axis::new( 0x02_u16, 10, 20 )
    ];
    let setup = user_device( b"TestPad", DeviceId::default(), &axes ).unwrap();
    assert_eq!( (setup.absmin[ 0x02 ], setup.absmax[ 0x02 ]), (10, 20) );
}

#[test]
fn test_user_device_axis_outside_of_table() {
    let axes = [Axis::new( ABS_CNT as u16, 0, 1 )];
    match user_device( b"TestPad", DeviceId::default(), &axes ) {
        Err( JoystickError::CapabilityRegistration { capability, source } ) => {
            assert_eq!( capability, Capability::AbsoluteAxis( ABS_CNT as u16 ) );
            assert_eq!( source, nix::errno::Errno::EINVAL );
        },
        Err( error ) => panic!( "unexpected error: {}", error ),
        Ok( _ ) => panic!( "unexpected success" )
    }
}

#[test]
fn test_create_rejects_invalid_name_before_opening() {
    for name in &[&b""[..], &[b'x'; 81][..]] {
        match VirtualJoystick::create( "/dev/null", name, &[], &[] ) {
            Err( JoystickError::InvalidName { .. } ) => {},
            Err( error ) => panic!( "unexpected error: {}", error ),
            Ok( _ ) => panic!( "unexpected success" )
        }
    }
}

#[test]
fn test_create_rejects_invalid_path() {
    let scratch = ScratchFile::new( "not-a-device" );
    drop( scratch.open() );

    match VirtualJoystick::create( &scratch.path, "TestPad", &[], &[] ) {
        Err( JoystickError::InvalidPath { path, .. } ) => assert_eq!( path, scratch.path ),
        Err( error ) => panic!( "unexpected error: {}", error ),
        Ok( _ ) => panic!( "unexpected success" )
    }
}

#[test]
fn test_create_on_a_non_uinput_device() {
    let axes = [Axis::new( 0_u16, -32767, 32767 )];
    let buttons = [Button::new( 0_u16 )];
    match VirtualJoystick::create( "/dev/null", "TestPad", &axes, &buttons ) {
        Err( JoystickError::CapabilityRegistration { capability, source } ) => {
            assert_eq!( capability, Capability::EventKind( EventKind::Key ) );
            assert_eq!( source, nix::errno::Errno::ENOTTY );
        },
        Err( error ) => panic!( "unexpected error: {}", error ),
        Ok( _ ) => panic!( "unexpected success" )
    }
}

#[test]
fn test_set_axis_and_button() {
    let scratch = ScratchFile::new( "joystick" );
    let mut joystick = VirtualJoystick::from_file( b"TestPad", scratch.open() );
    assert_eq!( joystick.name(), b"TestPad" );

    joystick.set_axis( 0, 15000 ).unwrap();
    joystick.set_button( 0, true ).unwrap();
    joystick.set_button( 0, true ).unwrap();
    joystick.set_button( 0, false ).unwrap();
    joystick.set_axis( 1, i32::MIN ).unwrap();

    assert_eq!( scratch.events(), vec![
        (3, 0, 15000),
        (0, 0, 0),
        (1, 0, 1),
        (0, 0, 0),
        (1, 0, 1),
        (0, 0, 0),
        (1, 0, 0),
        (0, 0, 0),
        (3, 1, i32::MIN),
        (0, 0, 0)
    ]);

    // A regular file is not a uinput handle, so the destroy ioctl is refused,
    // but the handle is still released.
    match joystick.close() {
        Err( JoystickError::Close( source ) ) => assert_eq!( source.raw_os_error(), Some( libc::ENOTTY ) ),
        result => panic!( "unexpected result: {:?}", result )
    }
    assert!( joystick.is_closed() );
}

#[test]
fn test_operations_after_close() {
    let scratch = ScratchFile::new( "closed" );
    let mut joystick = VirtualJoystick::from_file( b"TestPad", scratch.open() );
    let _ = joystick.close();

    match joystick.set_axis( 0, 1 ) {
        Err( JoystickError::EventWrite { kind: EventKind::AbsoluteAxis, code: 0, source } ) => {
            assert_eq!( source.raw_os_error(), Some( libc::EBADF ) );
        },
        result => panic!( "unexpected result: {:?}", result )
    }

    match joystick.set_button( 0x130, true ) {
        Err( JoystickError::EventWrite { kind: EventKind::Key, code: 0x130, .. } ) => {},
        result => panic!( "unexpected result: {:?}", result )
    }

    match joystick.close() {
        Err( error @ JoystickError::Close( _ ) ) => assert_eq!( error.raw_os_error(), Some( libc::EBADF ) ),
        result => panic!( "unexpected result: {:?}", result )
    }

    assert!( joystick.sysname().is_err() );
    assert!( scratch.events().is_empty() );
}
