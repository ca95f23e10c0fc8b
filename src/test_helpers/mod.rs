//! A set of helpers for testing

mod notifier;
mod store;
mod target;

pub use notifier::RecordingNotifier;
pub use store::InMemoryStore;
pub use target::TargetBuilder;
