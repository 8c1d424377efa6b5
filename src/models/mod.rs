mod devices;
mod plan;
mod report;
mod templates;
mod topology;

pub use devices::*;
pub use plan::*;
pub use report::*;
pub use templates::*;
pub use topology::*;
