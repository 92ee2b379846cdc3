//! A CHIP-8 virtual machine.
//!
//! The core is the [`Cpu`](cpu::Cpu), which decodes and executes opcodes
//! against [`Memory`](memory::Memory), and the [`Display`](display::Display),
//! which XORs sprites into a 64x32 framebuffer. [`Platform`] wires both to a
//! keypad ([`KeyInput`]) and a speaker ([`Audio`]); rendering, keyboard
//! polling and pacing are left to the driver.

pub mod audio;
pub mod config;
pub mod cpu;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod memory;
pub mod platform;

pub use audio::{Audio, Silent};
pub use config::Config;
pub use cpu::{CpuSnapshot, RandomSource};
pub use display::{Frame, DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use error::{Error, Result};
pub use input::{key_channel, CancelToken, KeyInput, KeyReceiver, KeySender};
pub use platform::{Platform, Render};
