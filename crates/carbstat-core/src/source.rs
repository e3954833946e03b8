//! Source trait for treatment loaders
//!
//! This module defines the `TreatmentSource` trait implemented by the
//! `carbstat-source` crate. It is the single asynchronous boundary of a run:
//! the pipeline starts once `fetch` has returned the whole batch.

use crate::error::Result;
use crate::types::{DateWindow, RawTreatment};
use async_trait::async_trait;

/// Trait for anything that can supply raw treatments for a window.
///
/// Implementations may return records outside the window; the pipeline
/// filters locally with exact day semantics.
#[async_trait]
pub trait TreatmentSource: Send + Sync {
    /// Fetch every treatment that may fall inside `window`.
    async fn fetch(&self, window: &DateWindow) -> Result<Vec<RawTreatment>>;

    /// Short human-readable description (URL or path) for logs.
    fn describe(&self) -> String;
}
