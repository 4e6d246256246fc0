//! Bidirectional search
//!
//! Leaves first: [`step`] holds the per-ball arena, [`queue`] and
//! [`validator`] are the capabilities a [`ball::Ball`] is built from,
//! [`candidates`] and [`result_cache`] sit between the balls and the
//! [`enumerator`], which drives everything.

pub mod ball;
pub mod candidates;
pub mod enumerator;
pub mod queue;
pub mod result_cache;
pub mod step;
pub mod validator;

pub use ball::{Ball, BallLocation};
pub use candidates::{CalculatedCandidate, CandidatesStore};
pub use enumerator::{EnumeratorBuilder, WeightedTwoSidedEnumerator};
pub use queue::{PriorityQueue, QueueEntry, TracedQueue, WeightedQueue};
pub use result_cache::ResultCache;
pub use step::{PathStore, Step, StepIndex};
pub use validator::{
    BasePathValidator, Expression, ForbiddenEdges, ForbiddenVertices, PathExpression,
    PathValidator, PathValidatorOptions, StepContext, TabooValidator, TracedValidator,
    ValidationResult,
};
