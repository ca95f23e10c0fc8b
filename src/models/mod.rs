//! Data models shared by the fetcher, differ, store and notifiers.

pub mod change_rule;
pub mod notification;
pub mod observed_state;
pub mod status;
pub mod target;

pub use change_rule::ChangeRule;
pub use notification::ChangeNotification;
pub use observed_state::ObservedState;
pub use status::PersistedStatus;
pub use target::{MissingElementPolicy, MonitoredTarget};
