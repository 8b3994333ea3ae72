// padkeys - Linux device adapters for the mapping engine
// Gamepad snapshots via evdev, key injection via uinput

pub mod device;
pub mod keyboard;

pub use device::{list_gamepads, EvdevGamepad, GamepadInfo};
pub use keyboard::{KeyLatch, KeyboardError, LogSink, VirtualKeyboard};
