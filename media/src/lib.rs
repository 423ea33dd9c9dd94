//! Dual-representation image storage.
//!
//! Every image attached to an entity lives twice: embedded as a data URL inside the
//! database document, and as a plain file in a [`store::ContentStore`] that HTTP serves.
//! The database copy is authoritative; the store is a cache rebuilt on demand by
//! [`rehydrate::Rehydrator`].

pub mod codec;
pub mod error;
pub mod fields;
pub mod ingest;
pub mod naming;
pub mod rehydrate;
pub mod store;

use zettanews_utils as utils;

pub use codec::DecodedImage;
pub use error::MediaError;
pub use fields::{sanitize, sanitized, HasImages, ImageRef, ImageSlot};
pub use ingest::ImageIngest;
pub use naming::FilenameGenerator;
pub use rehydrate::{ChainLookup, ImageLookup, Rehydrator};
pub use store::{ContentStore, FsStore, MemoryStore};
