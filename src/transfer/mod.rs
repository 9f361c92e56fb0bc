//! File-Transfer Module
//!
//! The second protocol variant carried by the same server: a 1-byte kind,
//! a 4-byte data length, then the data (10 MiB ceiling). Used for listing
//! and downloading files from a served directory.

mod codec;
mod message;
mod store;

pub use codec::{encode, TransferDecoder, MAX_TRANSFER_DATA, TRANSFER_HEADER_LENGTH};
pub use message::{FileEntry, TransferKind, TransferMessage};
pub use store::{DirStore, FileStore};
