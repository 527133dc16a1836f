pub mod filter;
pub mod notification_service;
pub mod poller;
pub mod scheduler;

pub use filter::{newest_timestamp, select_new_items, MAX_MEDIA_SIZE};
pub use notification_service::{NotificationService, Notifier};
pub use poller::{Poller, TickReport};
pub use scheduler::{Scheduler, SingleFlight};
