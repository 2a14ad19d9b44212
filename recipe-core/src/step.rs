//! ABOUTME: Step trait — the contract every recipe step implementation satisfies
//! ABOUTME: Constructed from a validated config; executes against a mutable Context

use crate::context::Context;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A single, named, configurable unit of work.
///
/// Implementations are constructed from their (already-validated) `config`
/// value and run a single asynchronous `execute` against the shared
/// `Context`. Errors raised from `execute` propagate to the Executor
/// unchanged — this trait does not catch.
#[async_trait]
pub trait Step: Send + Sync {
    async fn execute(&self, context: &mut Context) -> Result<()>;
}

/// Constructs a `Step` from its raw `config` JSON value, performing whatever
/// per-step config validation is appropriate before the step can run.
pub type StepFactory = Box<dyn Fn(Value) -> Result<Box<dyn Step>> + Send + Sync>;
