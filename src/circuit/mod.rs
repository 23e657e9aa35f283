mod error;
pub use error::{CircuitError, Error};

mod instance;
pub use instance::{Circuit, LinkState};

pub mod prototype;
pub use prototype::{CompositeBuilder, Placement, Prototype};

mod scope;
pub use scope::Scope;
