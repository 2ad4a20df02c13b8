pub mod inspect;

pub use inspect::InspectArgs;
pub use inspect::Inspector;
