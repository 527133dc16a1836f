use crate::errors::FeederResult;

#[cfg_attr(test, mockall::automock)]
pub trait FeedSource: Send + Sync {
    /// Retrieve the latest feed snapshot as raw bytes
    fn fetch(&self) -> FeederResult<Vec<u8>>;
}
