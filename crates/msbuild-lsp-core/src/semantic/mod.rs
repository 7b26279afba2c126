//! Semantic model, position lookup and the evaluator seam.
//!
//! The evaluator owns the meaning of a project; this module only indexes what
//! it returns so queries can ask "which object is under the cursor".

pub mod evaluator;
pub mod index;
pub mod model;

pub use evaluator::{EvaluationRequest, Evaluator, StaticEvaluator};
pub use index::{SemanticIndex, object_at};
pub use model::{SemanticModel, SemanticObject};
