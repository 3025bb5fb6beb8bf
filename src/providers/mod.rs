/*!
 * Translation engine implementations.
 *
 * This module contains the narrow capability boundary the pipeline is
 * generic over, plus the concrete engines:
 * - Ollama: local LLM inference server
 * - Mock: scripted engine for tests
 */

use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::tei_processor::Segment;

/// Common trait for all translation engines.
///
/// The pipeline holds one prototype and hands every worker thread its own
/// clone, so an engine only ever sees calls from a single thread at a time.
pub trait Translator: Send + Sync + Debug {
    /// Duplicate this translator for isolated per-worker use
    ///
    /// # Returns
    /// * `Result<Box<dyn Translator>, ProviderError>` - An independent instance, or `CloneFailed`
    fn clone_box(&self) -> Result<Box<dyn Translator>, ProviderError>;

    /// Translate one segment's source text
    ///
    /// # Arguments
    /// * `segment` - The unit to translate
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an engine error
    fn translate(&mut self, segment: &Segment) -> Result<String, ProviderError>;
}

pub mod mock;
pub mod ollama;
