use {
    std::{
        fs::{
            File
        },
        io::{
            self,
            Write
        }
    },
    crate::{
        error::{
            JoystickError
        },
        input_sys::{
            EventKind,
            RawInputEvent
        }
    }
};

/// Writes a whole structure in one `write` call.
///
/// uinput rejects structures split across several writes,
/// so a short write is an error.
pub(crate) fn write_record( mut fp: &File, bytes: &[u8], what: &str ) -> Result< (), io::Error > {
    let count = fp.write( bytes )?;
    if count != bytes.len() {
        return Err( io::Error::new(
            io::ErrorKind::WriteZero,
            format!( "short write of {}: {} out of {} bytes", what, count, bytes.len() )
        ));
    }

    Ok(())
}

fn write_raw_event( fp: &File, event: &RawInputEvent ) -> Result< (), io::Error > {
    write_record( fp, event.as_bytes(), "an event record" )
}

/// Emits an event and immediately flushes it with a `SYN_REPORT`.
pub(crate) fn emit_into( fp: &File, kind: EventKind, code: u16, value: i32 ) -> Result< (), JoystickError > {
    let into_error = |source| JoystickError::EventWrite { kind, code, source };

    write_raw_event( fp, &RawInputEvent::new( kind, code, value ) ).map_err( into_error )?;
    write_raw_event( fp, &RawInputEvent::synchronization() ).map_err( into_error )?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_utils {
    use {
        std::{
            fs::{
                self,
                File
            },
            mem,
            path::{
                PathBuf
            },
            sync::{
                atomic::{
                    AtomicUsize,
                    Ordering
                }
            }
        },
        crate::{
            input_sys::{
                RawInputEvent
            }
        }
    };

    /// A regular file standing in for the uinput handle.
    pub struct ScratchFile {
        pub path: PathBuf
    }

    impl ScratchFile {
        pub fn new( tag: &str ) -> Self {
            static COUNTER: AtomicUsize = AtomicUsize::new( 0 );
            let path = std::env::temp_dir().join( format!(
                "uinput-joystick-{}-{}-{}",
                std::process::id(),
                tag,
                COUNTER.fetch_add( 1, Ordering::SeqCst )
            ));

            ScratchFile { path }
        }

        pub fn open( &self ) -> File {
            fs::OpenOptions::new()
                .write( true )
                .create( true )
                .truncate( true )
                .open( &self.path )
                .unwrap()
        }

        /// Returns `(kind, code, value)` for every record written so far.
        pub fn events( &self ) -> Vec< (u16, u16, i32) > {
            let bytes = fs::read( &self.path ).unwrap();
            let size = mem::size_of::< RawInputEvent >();
            assert_eq!( bytes.len() % size, 0 );

            bytes.chunks( size ).map( |record| {
                let body = &record[ size - 8.. ];
                assert!( record[ ..size - 8 ].iter().all( |&byte| byte == 0 ), "timestamp is not zeroed" );
                (
                    u16::from_ne_bytes( [body[ 0 ], body[ 1 ]] ),
                    u16::from_ne_bytes( [body[ 2 ], body[ 3 ]] ),
                    i32::from_ne_bytes( [body[ 4 ], body[ 5 ], body[ 6 ], body[ 7 ]] )
                )
            }).collect()
        }
    }

    impl Drop for ScratchFile {
        fn drop( &mut self ) {
            let _ = fs::remove_file( &self.path );
        }
    }
}

#[cfg(test)]
use self::test_utils::ScratchFile;

#[test]
fn test_emit_into_appends_synchronization() {
    let scratch = ScratchFile::new( "emit" );
    let fp = scratch.open();

    emit_into( &fp, EventKind::AbsoluteAxis, 0, 15000 ).unwrap();
    emit_into( &fp, EventKind::Key, 0x130, 1 ).unwrap();
    emit_into( &fp, EventKind::Key, 0x130, 0 ).unwrap();

    assert_eq!( scratch.events(), vec![
        (3, 0, 15000),
        (0, 0, 0),
        (1, 0x130, 1),
        (0, 0, 0),
        (1, 0x130, 0),
        (0, 0, 0)
    ]);
}

#[test]
fn test_emit_into_read_only_handle() {
    let scratch = ScratchFile::new( "read-only" );
    drop( scratch.open() );
    let fp = File::open( &scratch.path ).unwrap();

    match emit_into( &fp, EventKind::AbsoluteAxis, 1, -5 ) {
        Err( JoystickError::EventWrite { kind: EventKind::AbsoluteAxis, code: 1, source } ) => {
            assert_eq!( source.raw_os_error(), Some( libc::EBADF ) );
        },
        result => panic!( "unexpected result: {:?}", result )
    }
}
