pub mod traits;
pub mod devlife;

pub use traits::FeedSource;
pub use devlife::{decode_page, DevLifeSource};
