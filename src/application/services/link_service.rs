//! Short URL allocation and retrieval service.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::entities::{NewShortUrl, OwnerId, ShortUrl};
use crate::domain::repositories::{OwnerRepository, ShortUrlRepository};
use crate::error::AppError;
use crate::utils::code_generator::{
    CodeGenerator, DEFAULT_CODE_LENGTH, ESCALATION_STEP, build_candidate, validate_prefix,
};

/// Produces a fresh random generator for each allocation.
pub type RngFactory = Arc<dyn Fn() -> StdRng + Send + Sync>;

/// Limits applied to a single allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPolicy {
    /// Length of the base candidate before prefixing or escalation.
    pub code_length: usize,
    /// Attempts (probe or insert collisions included) before giving up.
    pub max_attempts: u32,
    /// Wall-clock budget, checked between attempts.
    pub timeout: Duration,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            max_attempts: 30,
            timeout: Duration::from_secs(5),
        }
    }
}

impl AllocationPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            code_length: config.short_id_length,
            max_attempts: config.allocation_max_attempts,
            timeout: Duration::from_millis(config.allocation_timeout_ms),
        }
    }
}

/// Service for allocating, resolving and removing short URLs.
///
/// Allocation is generate → probe → insert with escalation: every third
/// collision adds one character to the random part. The store's uniqueness
/// constraint is authoritative; a duplicate reported at insert time is
/// handled exactly like a probe collision.
pub struct LinkService<S: ShortUrlRepository, O: OwnerRepository> {
    short_url_repository: Arc<S>,
    owner_repository: Arc<O>,
    generator: CodeGenerator,
    policy: AllocationPolicy,
    rng_factory: RngFactory,
}

impl<S: ShortUrlRepository, O: OwnerRepository> LinkService<S, O> {
    /// Creates a new link service drawing randomness from the OS.
    pub fn new(
        short_url_repository: Arc<S>,
        owner_repository: Arc<O>,
        policy: AllocationPolicy,
    ) -> Self {
        Self {
            short_url_repository,
            owner_repository,
            generator: CodeGenerator::new(policy.code_length),
            policy,
            rng_factory: Arc::new(StdRng::from_os_rng),
        }
    }

    /// Replaces the random source, e.g. with a seeded generator in tests.
    pub fn with_rng_factory(mut self, rng_factory: RngFactory) -> Self {
        self.rng_factory = rng_factory;
        self
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// Allocates a unique short code for `url` and persists it under `owner`.
    ///
    /// # Arguments
    ///
    /// - `prefix` - Optional owner-supplied prefix; empty means none
    /// - `url` - Redirect target, stored as given
    /// - `owner` - Owner the mapping belongs to; must exist
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidPrefix`] before touching the store if the
    /// prefix is malformed.
    /// Returns [`AppError::NotFound`] if the owner does not exist.
    /// Returns [`AppError::ExhaustedNamespace`] after `max_attempts` collisions.
    /// Returns [`AppError::DeadlineExceeded`] if the timeout elapses between attempts.
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    pub async fn create_short_url(
        &self,
        prefix: &str,
        url: &str,
        owner: OwnerId,
    ) -> Result<String, AppError> {
        let prefix = validate_prefix(prefix)?;

        if !self.owner_repository.exists(owner).await? {
            return Err(AppError::not_found(
                "Owner not found",
                json!({ "owner": owner.to_string() }),
            ));
        }

        let result = self.allocate(prefix, url, owner).await;

        let outcome = match &result {
            Ok(_) => "created",
            Err(e) => e.code(),
        };
        metrics::counter!("shortener_allocations_total", "outcome" => outcome).increment(1);

        result
    }

    async fn allocate(&self, prefix: &str, url: &str, owner: OwnerId) -> Result<String, AppError> {
        let deadline = Instant::now() + self.policy.timeout;
        let mut rng = (self.rng_factory)();
        let mut retries: u32 = 0;

        loop {
            if retries >= self.policy.max_attempts {
                warn!(retries, prefix, "Short id namespace exhausted");
                return Err(AppError::exhausted_namespace(
                    "Failed to allocate a unique short id",
                    json!({ "attempts": retries, "prefix": prefix }),
                ));
            }

            if retries > 0 && Instant::now() >= deadline {
                warn!(retries, prefix, "Short id allocation deadline exceeded");
                return Err(AppError::deadline_exceeded(
                    "Short id allocation timed out",
                    json!({
                        "attempts": retries,
                        "timeout_ms": self.policy.timeout.as_millis() as u64,
                    }),
                ));
            }

            if retries == ESCALATION_STEP {
                warn!(prefix, "Repeated short id collisions, growing candidate length");
            }

            let candidate = build_candidate(&self.generator, &mut rng, prefix, retries);

            if self
                .short_url_repository
                .count_by_short_id(&candidate)
                .await?
                > 0
            {
                debug!(candidate = %candidate, retries, "Short id collision on probe");
                metrics::counter!("shortener_allocation_collisions_total").increment(1);
                retries += 1;
                continue;
            }

            let new_short_url = NewShortUrl {
                short_id: candidate.clone(),
                owner,
                url: url.to_string(),
            };

            match self.short_url_repository.insert(new_short_url).await {
                Ok(created) => {
                    info!(short_id = %created.short_id, owner = %owner, retries, "Short URL created");
                    return Ok(created.short_id);
                }
                Err(AppError::Conflict { .. }) => {
                    debug!(candidate = %candidate, retries, "Short id collision on insert");
                    metrics::counter!("shortener_allocation_collisions_total").increment(1);
                    retries += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Removes one short URL of an owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the owner has no such short URL.
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    pub async fn remove_short_url(&self, short_id: &str, owner: OwnerId) -> Result<(), AppError> {
        let deleted = self
            .short_url_repository
            .delete_by_short_id_and_owner(short_id, owner)
            .await?;

        if !deleted {
            return Err(AppError::not_found(
                "Short URL not found",
                json!({ "short_id": short_id, "owner": owner.to_string() }),
            ));
        }

        info!(short_id, owner = %owner, "Short URL removed");
        Ok(())
    }

    /// Removes every short URL of an owner, keeping the owner itself.
    ///
    /// Returns the number of removed records.
    pub async fn remove_short_urls(&self, owner: OwnerId) -> Result<u64, AppError> {
        let removed = self.short_url_repository.delete_all_by_owner(owner).await?;
        info!(owner = %owner, removed, "Short URLs purged");
        Ok(removed)
    }

    /// Retrieves one short URL scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record matches both code and owner.
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    pub async fn get_short_url(&self, short_id: &str, owner: OwnerId) -> Result<ShortUrl, AppError> {
        self.short_url_repository
            .find_by_short_id_and_owner(short_id, owner)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Short URL not found",
                    json!({ "short_id": short_id, "owner": owner.to_string() }),
                )
            })
    }

    /// Lists every short URL of an owner, newest first.
    pub async fn get_short_urls(&self, owner: OwnerId) -> Result<Vec<ShortUrl>, AppError> {
        self.short_url_repository.find_all_by_owner(owner).await
    }

    /// Resolves a code to its redirect target without owner scoping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code does not exist.
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    pub async fn get_full_url(&self, short_id: &str) -> Result<String, AppError> {
        self.short_url_repository
            .find_by_short_id(short_id)
            .await?
            .map(|short_url| short_url.url)
            .ok_or_else(|| {
                AppError::not_found("Short URL not found", json!({ "short_id": short_id }))
            })
    }
}
