/* 📖 # What is the Platform Abstraction Layer?

The PAL is the only place that touches the filesystem or opens sockets. Code above it
receives a PalHandle and never cares which implementation sits behind it:
- RealPal reads files under a base directory and serves HTTP with tiny_http
- MockPal keeps files in memory and dispatches requests in-process for tests
*/

pub mod http;
pub mod mock;
pub mod real_pal;
mod traits;

pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle};
