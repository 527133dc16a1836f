use crate::domain::Watermark;
use crate::errors::FeederResult;

#[cfg_attr(test, mockall::automock)]
pub trait WatermarkStore: Send + Sync {
    fn load(&self) -> FeederResult<Watermark>;
    fn save(&self, watermark: Watermark) -> FeederResult<()>;
}
