pub mod probe;

pub use probe::{ExistenceProbe, HttpProbe};
