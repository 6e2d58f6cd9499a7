//! Interactive globe engine: orthographic projection, yaw physics with
//! inertia, marker animation, overlay rendering (arcs and heat glows) and
//! pointer hit-testing, driven one frame at a time by a host scheduler.

pub mod animator;
pub mod config;
pub mod controller;
pub mod input;
pub mod model;
pub mod overlay;
pub mod picking;
pub mod projection;
pub mod resize;
pub mod rotation;
pub mod session;
pub mod surface;

pub use animator::*;
pub use config::*;
pub use controller::*;
pub use input::*;
pub use model::*;
pub use overlay::*;
pub use picking::*;
pub use projection::*;
pub use resize::*;
pub use rotation::*;
pub use session::*;
pub use surface::*;
