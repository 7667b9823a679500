pub mod dedupe;
pub mod features;
pub mod normalize;
pub mod pipeline;
pub mod quality;
pub mod timestamps;
pub mod writer;
