//! CLI Interface: user input, forms and terminal rendering
//!
//! # Components
//! - `input.rs`: Key, mouse and paste capture using crossterm
//! - `form.rs`: The bad/good form a run is performed on
//! - `display.rs`: Terminal rendering of every stage

pub mod display;
pub mod form;
pub mod input;

pub use display::Display;
pub use input::InputHandler;
