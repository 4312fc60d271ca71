//! Bounded text generation with an instruction-driven refinement loop.
//!
//! [`BoundedTransformer`] turns source text plus optional title and
//! call-to-action fragments into a single message that never exceeds the
//! requested number of logical characters. [`RefinementLoop`] keeps editing
//! that message one instruction at a time, and [`Workbench`] ties both to the
//! lifetime of a single artifact.

pub mod artifact;
pub mod error;
pub mod limits;
pub mod policy;
pub mod prompts;
pub mod refinement;
pub mod text;
pub mod transformer;
pub mod workbench;

pub use artifact::{Artifact, ArtifactOrigin};
pub use error::{RefinementError, TransformError, ValidationError, WorkbenchError};
pub use limits::{CharLimit, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};
pub use policy::ContentPolicy;
pub use refinement::{
    HistoryEntry, HistoryRole, RefinementConfig, RefinementLoop, RefinementSession, SessionState,
};
pub use text::length::{logical_len, truncate_logical};
pub use transformer::{BoundedTransformer, FixedFragments, TransformRequest};
pub use workbench::{EditingSession, Workbench};
