pub mod dedupe;
pub mod normalize;
pub mod quality_gate;
pub mod similarity;
