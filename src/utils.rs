use {
    std::{
        fs,
        io,
        os::{
            unix::{
                fs::{
                    FileTypeExt
                },
                io::{
                    RawFd
                }
            }
        },
        path::{
            Path
        }
    },
    crate::{
        error::{
            JoystickError
        },
        uinput_sys::{
            UINPUT_MAX_NAME_SIZE
        }
    }
};

pub unsafe fn ioctl_get_string( fd: RawFd, ioctl_id: u8, ioctl_seq: usize ) -> Result< String, nix::Error > {
    let mut buffer = [0_u8; 1024];

    let result = libc::ioctl( fd, request_code_read!( ioctl_id, ioctl_seq, buffer.len() ), buffer.as_mut_ptr() );
    let length = nix::errno::Errno::result( result )? as usize;

    // The returned length includes the terminator.
    let length = length.saturating_sub( 1 ).min( buffer.len() );
    let string = String::from_utf8_lossy( &buffer[ 0..length ] );
    Ok( string.into_owned() )
}

/// Checks that `path` names an existing character device without opening it.
pub fn validate_device_path( path: &Path ) -> Result< (), JoystickError > {
    let invalid = |source: io::Error| JoystickError::InvalidPath {
        path: path.to_owned(),
        source
    };

    if path.as_os_str().is_empty() {
        return Err( invalid( io::Error::new( io::ErrorKind::InvalidInput, "device path must not be empty" ) ) );
    }

    let metadata = fs::metadata( path ).map_err( invalid )?;
    if !metadata.file_type().is_char_device() {
        return Err( invalid( io::Error::new( io::ErrorKind::InvalidInput, "not a character device" ) ) );
    }

    Ok(())
}

pub fn validate_device_name( name: &[u8] ) -> Result< (), JoystickError > {
    if name.is_empty() || name.len() > UINPUT_MAX_NAME_SIZE {
        return Err( JoystickError::InvalidName {
            length: name.len(),
            maximum: UINPUT_MAX_NAME_SIZE
        });
    }

    Ok(())
}

/// Copies an already validated name into the fixed width descriptor field.
pub fn to_device_name( name: &[u8] ) -> [u8; UINPUT_MAX_NAME_SIZE] {
    let mut output = [0; UINPUT_MAX_NAME_SIZE];
    let length = name.len().min( UINPUT_MAX_NAME_SIZE );
    output[ 0..length ].copy_from_slice( &name[ 0..length ] );
    output
}

#[test]
fn test_validate_device_name() {
    assert!( validate_device_name( b"TestPad" ).is_ok() );
    assert!( validate_device_name( &[b'x'; UINPUT_MAX_NAME_SIZE] ).is_ok() );

    match validate_device_name( b"" ) {
        Err( JoystickError::InvalidName { length: 0, maximum: UINPUT_MAX_NAME_SIZE } ) => {},
        result => panic!( "unexpected result: {:?}", result )
    }

    match validate_device_name( &[b'x'; UINPUT_MAX_NAME_SIZE + 1] ) {
        Err( JoystickError::InvalidName { length: 81, .. } ) => {},
        result => panic!( "unexpected result: {:?}", result )
    }
}

#[test]
fn test_to_device_name() {
    let name = to_device_name( b"TestPad" );
    assert_eq!( &name[ 0..7 ], b"TestPad" );
    assert!( name[ 7.. ].iter().all( |&byte| byte == 0 ) );

    let name = to_device_name( &[b'x'; UINPUT_MAX_NAME_SIZE] );
    assert!( name.iter().all( |&byte| byte == b'x' ) );
}

#[test]
fn test_validate_device_path() {
    assert!( validate_device_path( Path::new( "/dev/null" ) ).is_ok() );

    for path in &["", "/dev/this-device-does-not-exist", "/", "/proc/self/status"] {
        match validate_device_path( Path::new( path ) ) {
            Err( JoystickError::InvalidPath { .. } ) => {},
            result => panic!( "unexpected result for {:?}: {:?}", path, result )
        }
    }
}
