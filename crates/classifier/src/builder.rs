//! Explicit assembly of the chain and orchestrator from configuration.

use crate::chain::ClassificationChain;
use crate::fallback::FallbackStrategy;
use crate::orchestrator::Orchestrator;
use ragdecide_cache::{CacheLayerStrategy, DistributedCache, InMemoryKv, LocalCache, TieredCache};
use ragdecide_config::{
    CacheConfig, ClassifierConfig, ConfigError, DistributedCacheConfig, RuleConfig,
    RuleEngineConfig,
};
use ragdecide_core::{CacheBackend, CacheTier, Strategy, StrategyRef};
use ragdecide_rules::{RuleAction, RuleDefinition, RuleEffect, RuleEngine};
use std::sync::Arc;
use tracing::{info, warn};

/// Errors raised while assembling a classifier.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },
}

/// Collects strategies and an optional cache tier, then builds a chain
/// or an orchestrator.
#[derive(Default)]
pub struct ChainBuilder {
    strategies: Vec<StrategyRef>,
    cache: Option<Arc<dyn CacheTier>>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy.
    pub fn strategy(self, strategy: impl Strategy + 'static) -> Self {
        self.strategy_ref(Arc::new(strategy))
    }

    /// Register an already shared strategy.
    pub fn strategy_ref(mut self, strategy: StrategyRef) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Serve lookups from `tier` ahead of every other strategy and let the
    /// orchestrator write confident decisions to it.
    pub fn cache(mut self, tier: Arc<dyn CacheTier>) -> Self {
        self.strategies
            .push(Arc::new(CacheLayerStrategy::new(Arc::clone(&tier))));
        self.cache = Some(tier);
        self
    }

    /// Assemble the configured strategies: cache, rules, fallback.
    ///
    /// Spawns the local cache janitor, so this must run inside a tokio
    /// runtime.
    pub async fn from_config(config: &ClassifierConfig) -> Result<Self, BuildError> {
        config.validate()?;

        let mut builder = Self::new();

        if let Some(tier) = build_cache(&config.cache).await {
            builder = builder.cache(tier);
        }

        builder = builder.strategy(build_rule_engine(&config.rule)?);
        builder = builder.strategy(
            FallbackStrategy::new(config.fallback.default_retrieval)
                .with_enabled(config.fallback.enabled),
        );

        Ok(builder)
    }

    pub fn build(self) -> ClassificationChain {
        ClassificationChain::new(self.strategies)
    }

    /// Build an orchestrator with default settings around the chain.
    pub fn into_orchestrator(self) -> Orchestrator {
        let cache = self.cache.clone();
        let orchestrator = Orchestrator::new(Arc::new(self.build()));
        match cache {
            Some(tier) => orchestrator.with_cache(tier),
            None => orchestrator,
        }
    }
}

/// Build a ready-to-use orchestrator from configuration.
pub async fn orchestrator_from_config(config: &ClassifierConfig) -> Result<Orchestrator, BuildError> {
    let orchestrator = ChainBuilder::from_config(config)
        .await?
        .into_orchestrator()
        .with_timeout(config.orchestrator.timeout())
        .with_cache_min_confidence(config.orchestrator.cache_min_confidence)
        .with_default_retrieval(config.fallback.default_retrieval);
    Ok(orchestrator)
}

/// The rule engine for `config`; an empty rule list selects the defaults.
pub fn build_rule_engine(config: &RuleEngineConfig) -> Result<RuleEngine, BuildError> {
    let engine = if config.rules.is_empty() {
        info!("No rules configured, using built-in defaults");
        RuleEngine::with_defaults()
    } else {
        let definitions = config
            .rules
            .iter()
            .map(rule_definition)
            .collect::<Result<Vec<_>, _>>()?;
        RuleEngine::new(definitions)
    };
    Ok(engine.with_enabled(config.enabled))
}

/// Convert a configured rule into its model form.
pub fn rule_definition(config: &RuleConfig) -> Result<RuleDefinition, BuildError> {
    let effect: RuleEffect = config
        .action
        .effect
        .parse()
        .map_err(|reason| BuildError::InvalidRule {
            name: config.name.clone(),
            reason,
        })?;

    let action = RuleAction {
        effect,
        confidence: config.action.confidence,
        reason: config.action.reason.clone(),
    };

    let mut definition =
        RuleDefinition::new(&config.name, config.priority, &config.expression, action)
            .with_description(&config.description);
    definition.enabled = config.enabled;
    Ok(definition)
}

async fn build_cache(config: &CacheConfig) -> Option<Arc<dyn CacheTier>> {
    if !config.enabled {
        info!("Decision cache disabled");
        return None;
    }

    let local = Arc::new(LocalCache::new(config.max_size, config.ttl()));
    local.spawn_janitor(config.janitor_interval());

    let distributed = if config.distributed.enabled {
        connect_backend(&config.distributed).await.map(|backend| {
            Arc::new(
                DistributedCache::new(backend, config.distributed_ttl())
                    .with_key_prefix(&config.distributed.key_prefix)
                    .with_op_timeout(config.distributed.timeout())
                    .with_retry_after(config.distributed.retry_after()),
            )
        })
    } else {
        None
    };

    info!(
        max_size = config.max_size,
        ttl_secs = config.ttl().as_secs(),
        distributed = distributed.is_some(),
        "Decision cache ready"
    );
    Some(Arc::new(TieredCache::new(local, distributed)))
}

async fn connect_backend(config: &DistributedCacheConfig) -> Option<Arc<dyn CacheBackend>> {
    match config.backend.as_str() {
        "memory" => Some(Arc::new(InMemoryKv::new())),
        "redis" => connect_redis(config).await,
        other => {
            warn!(backend = other, "Unknown distributed cache backend, using local tier only");
            None
        }
    }
}

#[cfg(feature = "redis")]
async fn connect_redis(config: &DistributedCacheConfig) -> Option<Arc<dyn CacheBackend>> {
    use ragdecide_cache::RedisBackend;

    let Some(url) = config.url.as_deref() else {
        warn!("cache.distributed.url not set, using local tier only");
        return None;
    };

    // Connecting is allowed longer than a single operation.
    let connect_timeout = config.timeout() * 20;
    match tokio::time::timeout(connect_timeout, RedisBackend::connect(url)).await {
        Ok(Ok(backend)) => Some(Arc::new(backend)),
        Ok(Err(e)) => {
            warn!(url, error = %e, "Redis unreachable, using local tier only");
            None
        }
        Err(_) => {
            warn!(url, "Redis connection timed out, using local tier only");
            None
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn connect_redis(_config: &DistributedCacheConfig) -> Option<Arc<dyn CacheBackend>> {
    warn!("Built without the `redis` feature, using local tier only");
    None
}
