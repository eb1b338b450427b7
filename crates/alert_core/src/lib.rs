pub mod analysis;
pub mod analytics;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod raw;
pub mod series;

pub use domain::CanonicalAlert;
pub use normalize::confidence::normalize_confidence;
pub use normalize::timestamps::to_relative;
pub use normalize::RecordNormalizer;
pub use raw::RawAlert;
