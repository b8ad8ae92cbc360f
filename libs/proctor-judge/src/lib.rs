//! Code-submission judge: runs untrusted JavaScript against a problem's test
//! cases inside a fresh, resource-bounded V8 isolate.

pub mod error;
pub mod evaluator;
pub mod harness;
pub mod sandbox;
pub mod service;
pub mod store;

pub use error::{SandboxError, StoreError};
pub use sandbox::{SandboxConfig, SandboxExecutor};
pub use service::JudgeService;
pub use store::{InMemoryProblemStore, ProblemStore, RedisProblemStore};
