//! Per-fragment occlusion test.
//!
//! A probe fragment is hidden when the real-world depth sampled at its
//! screen pixel is at or in front of the fragment's own view depth.

pub mod evaluator;
pub mod uniforms;

pub use evaluator::{
    is_occluded, EvaluationSummary, Fragment, FragmentDecision, FragmentTest, OcclusionEvaluator,
};
pub use uniforms::OcclusionUniforms;
