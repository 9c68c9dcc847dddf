// State management module.
// Observable stores and the view model that feeds them.

pub mod observable;
pub mod view_model;

pub use observable::{Listener, ObservableValue};
pub use view_model::{FetchPhase, ProfileViewModel, Update};
