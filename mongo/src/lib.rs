pub mod context;
pub mod test_util;
pub mod withid;
pub use bson;
pub use mongodb;
pub use mongodm;
use zettanews_utils as utils;
