pub mod account;
pub mod batch;
pub mod entry;
pub mod error;
pub mod order;
pub mod shard;
pub mod traits;

pub use account::{Account, OwnerType};
pub use batch::{EntryUpdate, LedgerBatch, NewEntry};
pub use entry::{EntryKind, EntryStatus, LedgerEntry};
pub use error::Error;
pub use order::{Order, OrderEvent, OrderStatus, PaymentMethod};
pub use shard::PlatformShard;
pub use traits::{AuditSink, DeadLetterQueue, EventStream, LedgerStore, NotificationSink};
