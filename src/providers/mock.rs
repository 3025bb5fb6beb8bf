/*!
 * Mock translator implementations for testing.
 *
 * This module provides scripted engines that simulate different behaviors:
 * - `MockTranslator::working()` - Always succeeds with marked-up text
 * - `MockTranslator::failing_at(n)` - Fails when it reaches segment index n
 * - `MockTranslator::reverse_latency(ms)` - Later segments finish first
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Translator;
use crate::tei_processor::Segment;

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a deterministic translation
    Working,
    /// Fails with `RequestFailed` on the segment at this index
    FailingAt(usize),
    /// Always fails with an error
    Failing,
    /// Sleeps a fixed time per call
    Slow { delay_ms: u64 },
    /// Earlier segments sleep longer, forcing out-of-order completion
    ReverseLatency { step_ms: u64 },
    /// Refuses to be cloned
    UnclonableEngine,
}

/// Mock translator for exercising the pipeline without a real engine
#[derive(Debug)]
pub struct MockTranslator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Total translate calls across the prototype and all clones
    call_count: Arc<AtomicUsize>,
    /// Total clones taken from this family of translators
    clone_count: Arc<AtomicUsize>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            clone_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock translator that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock translator that fails at a specific segment index
    pub fn failing_at(index: usize) -> Self {
        Self::new(MockBehavior::FailingAt(index))
    }

    /// Create a failing mock translator that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose per-segment latency decreases with index
    pub fn reverse_latency(step_ms: u64) -> Self {
        Self::new(MockBehavior::ReverseLatency { step_ms })
    }

    /// Create a mock whose clone_box always fails
    pub fn unclonable() -> Self {
        Self::new(MockBehavior::UnclonableEngine)
    }

    /// The deterministic translation this mock produces for a segment
    pub fn expected_translation(segment: &Segment) -> String {
        format!("[en] {}", segment.source_text)
    }

    /// Number of translate calls observed so far
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Number of clones taken so far
    pub fn clones(&self) -> usize {
        self.clone_count.load(Ordering::Relaxed)
    }
}

impl Translator for MockTranslator {
    fn clone_box(&self) -> Result<Box<dyn Translator>, ProviderError> {
        if self.behavior == MockBehavior::UnclonableEngine {
            return Err(ProviderError::CloneFailed("mock engine cannot be duplicated".to_string()));
        }

        self.clone_count.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(MockTranslator {
            behavior: self.behavior,
            call_count: Arc::clone(&self.call_count),
            clone_count: Arc::clone(&self.clone_count),
        }))
    }

    fn translate(&mut self, segment: &Segment) -> Result<String, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        match self.behavior {
            MockBehavior::Working => Ok(Self::expected_translation(segment)),
            MockBehavior::FailingAt(index) if segment.index == index => Err(
                ProviderError::RequestFailed(format!("mock failure at segment {}", index)),
            ),
            MockBehavior::FailingAt(_) => Ok(Self::expected_translation(segment)),
            MockBehavior::Failing => {
                Err(ProviderError::RequestFailed("mock engine always fails".to_string()))
            }
            MockBehavior::Slow { delay_ms } => {
                thread::sleep(Duration::from_millis(delay_ms));
                Ok(Self::expected_translation(segment))
            }
            MockBehavior::ReverseLatency { step_ms } => {
                let rank = 16usize.saturating_sub(segment.index) as u64;
                thread::sleep(Duration::from_millis(rank * step_ms));
                Ok(Self::expected_translation(segment))
            }
            MockBehavior::UnclonableEngine => Ok(Self::expected_translation(segment)),
        }
    }
}
