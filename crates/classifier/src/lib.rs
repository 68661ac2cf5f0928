//! Retrieval-decision classification for ragdecide.
//!
//! A [`ClassificationChain`] runs pluggable strategies in priority order and
//! stops at the first decision. The [`Orchestrator`] wraps the chain with a
//! deadline, caches confident decisions, and turns every failure into a
//! retrieval-favoring fail-safe. [`HybridClassifier`] switches between the
//! orchestrated path and the legacy keyword classifier.
//!
//! ```no_run
//! use ragdecide_classifier::orchestrator_from_config;
//! use ragdecide_config::ClassifierConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClassifierConfig::load()?;
//! let orchestrator = orchestrator_from_config(&config).await?;
//! let decision = orchestrator.classify("我的狗需要打什么疫苗", None).await;
//! assert!(decision.need_retrieval);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod chain;
pub mod fallback;
pub mod hybrid;
pub mod legacy;
pub mod orchestrator;

pub use builder::{BuildError, ChainBuilder, orchestrator_from_config};
pub use chain::{ChainExecutor, ClassificationChain};
pub use fallback::{FALLBACK_NAME, FallbackStrategy};
pub use hybrid::{ClassifierKind, HybridClassifier, HybridDecision};
pub use legacy::KeywordClassifier;
pub use orchestrator::Orchestrator;
