pub mod agent;
pub mod crew;
pub mod task;

pub use agent::*;
pub use crew::*;
pub use task::*;
