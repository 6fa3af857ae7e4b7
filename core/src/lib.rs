#![cfg_attr(not(test), no_std)]

pub mod books;
pub mod clock;
pub mod compositor;
pub mod config;
pub mod display;
pub mod font;
pub mod framebuffer;
pub mod fs;
pub mod layout;
pub mod pack;
pub mod refresh;
pub mod slot;
pub mod store;
pub mod version;
