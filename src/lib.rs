//! Virtual joysticks for Linux, created through `/dev/uinput`.
//!
//! ```no_run
//! use uinput_joystick::{AbsoluteAxis, Axis, Button, Key, VirtualJoystick};
//!
//! let axes = [Axis::new( AbsoluteAxis::X, -32767, 32767 )];
//! let buttons = [Button::new( Key::PadSouth )];
//! let mut joystick = VirtualJoystick::create( "/dev/uinput", "TestPad", &axes, &buttons )?;
//!
//! joystick.set_axis( AbsoluteAxis::X.raw(), 15000 )?;
//! joystick.set_button( Key::PadSouth.raw(), true )?;
//! joystick.close()?;
//! # Ok::<(), uinput_joystick::JoystickError>(())
//! ```

#[macro_use]
extern crate nix;

#[macro_use]
mod macros;

mod error;
mod event;
mod input_sys;
mod joystick;
mod uinput_sys;
mod utils;

pub use crate::{
    error::{
        Capability,
        JoystickError,
        Result
    },
    input_sys::{
        ABS_MAX,
        AbsoluteAxis,
        Bus,
        EventKind,
        Key,
        KEY_MAX,
        RawInputEvent,
        Timestamp
    },
    joystick::{
        Axis,
        Button,
        DeviceId,
        VirtualJoystick
    },
    uinput_sys::{
        UINPUT_MAX_NAME_SIZE
    }
};
