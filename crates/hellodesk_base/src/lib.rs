/* 📖 # Why have hellodesk_base as a core library?
hellodesk_base provides the error type, tracing setup and the platform abstraction layer
(files and HTTP serving). The engine builds the user registry and the API on top of it
without knowing whether requests come from a socket or from a test.
*/

pub mod error;
mod error_tests;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{DeskError, DeskResult, ErrorKind, ResultExt};
pub use pal::{MockPal, Pal, PalHandle, RealPal};
