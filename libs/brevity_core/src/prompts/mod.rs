pub mod refinement_prompt;
pub mod transform_prompt;
