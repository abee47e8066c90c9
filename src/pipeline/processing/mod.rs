// Data processing: canonical names, fusion into views, scoring and output assembly

pub mod fusion;
pub mod normalize;
pub mod output;
pub mod scoring;
