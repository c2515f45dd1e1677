pub mod analysis;
pub mod prediction;
pub mod recommendation;

pub use analysis::{SectorSummary, TextSource, WordCloud, WordCount, ALL_SECTORS};
pub use prediction::{
    AreaBounds, FeatureSelection, FormOptions, PriceEstimate, MAX_BUILT_UP_AREA,
    MIN_BUILT_UP_AREA,
};
pub use recommendation::{NearbyProperty, NearbySearch, Recommendation};
