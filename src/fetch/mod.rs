// Fetch module.
// Decides per call whether to go to the network or the cache, and reports one outcome.

pub mod coordinator;
pub mod reachability;

pub use coordinator::{FetchCoordinator, FollowsCache, ProfileCache};
pub use reachability::{FixedReachability, OfflineSwitch, Reachability, TcpProbe};
