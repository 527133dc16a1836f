pub mod traits;
pub mod file;

pub use traits::WatermarkStore;
pub use file::FileWatermarkStore;
