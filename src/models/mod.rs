mod catalog;
mod devices;
mod runs;

pub use catalog::*;
pub use devices::*;
pub use runs::*;
