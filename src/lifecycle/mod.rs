//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Connect stores → Load model → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or coordinator trigger → stop accepting → drain → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
