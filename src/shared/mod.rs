pub mod errors;
pub mod money;
pub mod shutdown;

pub use errors::{DomainError, DomainResult};
pub use money::Money;
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
