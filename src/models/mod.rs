pub mod outcome;
pub mod profile;
pub mod request;
pub mod stats;

pub use outcome::*;
pub use profile::*;
pub use request::*;
pub use stats::*;
