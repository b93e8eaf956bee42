pub mod blob;
pub mod service;
pub mod store;

pub use blob::{BlobStorage, FileBlobStorage, MemoryBlobStorage};
pub use service::{NotificationEvent, NotificationService, NotificationSink, ToastChannel};
pub use store::{NotificationError, NotificationResult, NotificationStore};
