#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! # xcompositor-core
//!
//! The core engine of an X11 compositing window manager: the window
//! registry and stack, the per-window state machine and damage accounting,
//! the paint pipeline and region algebra, the redirection lifecycle, and
//! the event-driven main loop that drives all of the above.
//!
//! This crate does not open an X connection, parse a configuration file, or
//! render with XRender/GL on its own. It consumes an already-connected
//! `x11rb` connection and a resolved [`config::CompositorConfig`], and
//! exposes a [`backend::Backend`] trait for the thing that actually puts
//! pixels on screen; a [`backend::pixman_backend::PixmanBackend`] reference
//! implementation is bundled for testing.
//!
//! ## Structure
//!
//! [`session::Session`] is the aggregate root: it owns the window
//! [`registry::Registry`], the [`damage::DamageRing`], the redirection
//! state, and is threaded through every engine operation. [`events`]
//! translates raw X11 protocol events into mutations of the session;
//! [`paint`] walks the resulting stack to decide what to draw and then
//! draws it; [`mainloop`] ties an X connection, timers and the paint cycle
//! together into a single-threaded `calloop` reactor.
//!
//! ## Logging
//!
//! The engine emits `tracing` events; it never installs a subscriber
//! itself. A binary embedding this crate is expected to set one up, e.g.
//! with `tracing_subscriber::fmt` and an `EnvFilter` driven by
//! `RUST_LOG`.

pub mod atoms;
pub mod backend;
pub mod config;
pub mod damage;
pub mod error;
pub mod events;
pub mod ignore;
pub mod mainloop;
pub mod overlay;
pub mod paint;
pub mod pidfile;
pub mod redirect;
pub mod region;
pub mod registry;
pub mod session;
pub mod utils;
pub mod window;

pub use crate::config::CompositorConfig;
pub use crate::error::EngineError;
pub use crate::session::Session;
