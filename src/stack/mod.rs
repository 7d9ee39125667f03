pub mod branch;
pub mod builder;
pub mod restack;
pub mod submit;
pub mod sync;
pub mod validator;

pub use branch::Branch;
pub use builder::{Scope, Stack};
pub use restack::{RestackEngine, RestackSummary};
pub use submit::{SubmitOptions, SubmitOutcome, SubmitPipeline};
