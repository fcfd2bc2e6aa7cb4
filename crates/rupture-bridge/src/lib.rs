//! Rupture Bridge - the presentation side of the rupture reverb
//!
//! Observes a [`rupture_core::RuptureProcessor`] through its
//! [`BridgeHandles`](rupture_core::BridgeHandles) and keeps a scriptable
//! presentation surface in sync at a fixed, low rate. Nothing here ever
//! blocks the audio thread: parameters and meters are atomics, and the
//! telemetry block is copied out under a lock the producer only ever
//! `try_lock`s.
//!
//! # Pieces
//!
//! - [`protocol`] - inbound `rupture:reverb:<key>=<value>` parsing and the
//!   three outbound script calls
//! - [`ChangeDetector`] - suppresses parameter pushes below a tolerance
//! - [`ControlInbox`] - thread-safe entry point for inbound text
//! - [`PresentationPoller`] - Loading/Ready state machine, one `tick` per
//!   timer period
//! - [`PollerThread`] - runs a poller at its configured rate
//! - [`PresentationSurface`] - where scripts go
//!
//! # Example
//!
//! ```rust
//! use rupture_bridge::{BridgeConfig, MemorySurface, PresentationPoller};
//! use rupture_core::BridgeHandles;
//!
//! let handles = BridgeHandles::new();
//! let surface = MemorySurface::new();
//! let mut poller = PresentationPoller::new(handles.clone(), surface.clone(), BridgeConfig::default());
//!
//! for _ in 0..10 {
//!     poller.tick();
//! }
//! assert_eq!(surface.scripts(), ["window.setAudioState(0.0, 0.0, 0.0, 0.0)"]);
//!
//! poller.inbox().on_message("rupture:reverb:roomSize=0.8");
//! poller.tick();
//! assert_eq!(handles.params.room_size(), 0.8);
//! ```

pub mod config;
pub mod detector;
pub mod driver;
pub mod error;
pub mod inbox;
pub mod poller;
pub mod protocol;
pub mod surface;

pub use config::BridgeConfig;
pub use detector::{ChangeDetector, DEFAULT_TOLERANCE, LastPushedState};
pub use driver::PollerThread;
pub use error::{ConfigError, Error, Result, SurfaceError};
pub use inbox::ControlInbox;
pub use poller::{PollerState, PresentationPoller};
pub use protocol::{ControlMessage, OutboundUpdate, ParamAssignment, ProtocolError};
pub use surface::{MemorySurface, PresentationSurface, WriterSurface};
