// Host backend - winit window, pixels surface and gilrs joystick
//
// The only code in the crate that talks to a windowing or graphics API.
// Everything here feeds the platform-independent `Hal`.

pub mod gamepad;
pub mod surface;
pub mod window;

pub use gamepad::JoystickBackend;
pub use surface::PixelsSurface;
pub use window::{run, FingerIds, FrameClient, HostWindow};
