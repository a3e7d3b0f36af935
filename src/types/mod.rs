//! Value types for light control parameters.

mod brightness;
mod color;
mod modes;
mod temperature;
mod transition;

pub use brightness::{Brightness, Saturation};
pub use color::Xy;
pub use modes::{Alert, ColorMode, Effect};
pub use temperature::{Kelvin, Mired};
pub use transition::TransitionTime;
