// Consumers of simulation state while the solver runs

pub mod imgstream;
pub mod stats;
