use {
    std::{
        fmt,
        io,
        path::{
            PathBuf
        }
    },
    thiserror::{
        Error
    },
    crate::{
        input_sys::{
            AbsoluteAxis,
            EventKind,
            Key
        }
    }
};

/// What was being registered when the kernel refused a capability.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Capability {
    EventKind( EventKind ),
    Button( u16 ),
    AbsoluteAxis( u16 )
}

impl fmt::Display for Capability {
    fn fmt( &self, fmt: &mut fmt::Formatter ) -> fmt::Result {
        match *self {
            Capability::EventKind( kind ) => write!( fmt, "event type {}", kind ),
            Capability::Button( code ) => write!( fmt, "button {}", Key::from( code ) ),
            Capability::AbsoluteAxis( code ) => write!( fmt, "absolute axis {}", AbsoluteAxis::from( code ) )
        }
    }
}

#[derive(Debug, Error)]
pub enum JoystickError {
    /// The device path is empty, missing, or not a character device.
    #[error("invalid device path {path:?}: {source}")]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: io::Error
    },
    /// The device name is empty or does not fit into the descriptor.
    #[error("invalid device name: {length} bytes long, expected between 1 and {maximum}")]
    InvalidName {
        length: usize,
        maximum: usize
    },
    #[error("failed to open the device handle: {0}")]
    DeviceOpen( #[source] io::Error ),
    #[error("failed to register {capability}: {source}")]
    CapabilityRegistration {
        capability: Capability,
        #[source]
        source: nix::Error
    },
    #[error("failed to activate the device: {0}")]
    DeviceActivation( #[source] io::Error ),
    #[error("failed to write a {kind} event with code {code}: {source}")]
    EventWrite {
        kind: EventKind,
        code: u16,
        #[source]
        source: io::Error
    },
    #[error("failed to close the device: {0}")]
    Close( #[source] io::Error )
}

impl JoystickError {
    /// The OS error number behind this error, if there is one.
    pub fn raw_os_error( &self ) -> Option< i32 > {
        match self {
            JoystickError::InvalidPath { source, .. } |
            JoystickError::DeviceOpen( source ) |
            JoystickError::DeviceActivation( source ) |
            JoystickError::EventWrite { source, .. } |
            JoystickError::Close( source ) => source.raw_os_error(),
            JoystickError::CapabilityRegistration { source, .. } => Some( *source as i32 ),
            JoystickError::InvalidName { .. } => None
        }
    }
}

pub type Result< T > = std::result::Result< T, JoystickError >;

#[test]
fn test_error_messages() {
    let error = JoystickError::CapabilityRegistration {
        capability: Capability::AbsoluteAxis( 0 ),
        source: nix::errno::Errno::EINVAL
    };
    assert_eq!( error.raw_os_error(), Some( libc::EINVAL ) );
    assert!( error.to_string().starts_with( "failed to register absolute axis X: " ) );

    let error = JoystickError::EventWrite {
        kind: EventKind::Key,
        code: 0x130,
        source: io::Error::from_raw_os_error( libc::EBADF )
    };
    assert_eq!( error.raw_os_error(), Some( libc::EBADF ) );
    assert!( error.to_string().starts_with( "failed to write a Key event with code 304: " ) );

    let error = JoystickError::InvalidName { length: 0, maximum: 80 };
    assert_eq!( error.raw_os_error(), None );
}
