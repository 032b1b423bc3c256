//! Pose data provider seam

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use glossa_core::{AnimationPayload, GlossaResult};

/// Future returned by [`PoseProvider::fetch`]
pub type ProviderFuture<'a> = Pin<Box<dyn Future<Output = GlossaResult<AnimationPayload>> + Send + 'a>>;

/// Source of animation payloads, one gloss at a time
///
/// Implementations report transport problems as `FetchFailure` and bad
/// geometry as `MalformedPayload`. A provider may also answer with the
/// `Error` tier when it has nothing to show for a gloss.
pub trait PoseProvider: Send + Sync {
    fn fetch<'a>(&'a self, gloss: &'a str) -> ProviderFuture<'a>;
}

impl<P: PoseProvider + ?Sized> PoseProvider for Arc<P> {
    fn fetch<'a>(&'a self, gloss: &'a str) -> ProviderFuture<'a> {
        (**self).fetch(gloss)
    }
}

impl<P: PoseProvider + ?Sized> PoseProvider for Box<P> {
    fn fetch<'a>(&'a self, gloss: &'a str) -> ProviderFuture<'a> {
        (**self).fetch(gloss)
    }
}
