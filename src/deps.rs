//! Capability bundle handed to the application services.
//!
//! Every external collaborator a service needs is a trait object here.
//! [`crate::server`] fills it with Postgres, Redis and the configured
//! optimizer; tests fill it with in-memory fakes. Services never reach for a
//! global.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{FileRepository, ZoneRepository};
use crate::infrastructure::clock::{Clock, SystemClock};
use crate::infrastructure::kv::KvStore;
use crate::infrastructure::optimizer::ImageOptimizer;
use crate::infrastructure::persistence::{PgFileRepository, PgZoneRepository};

/// External capabilities of the site.
#[derive(Clone)]
pub struct Deps {
    /// Key-value store for cached variants and upload locks.
    pub kv: Arc<dyn KvStore>,
    pub files: Arc<dyn FileRepository>,
    pub zones: Arc<dyn ZoneRepository>,
    pub optimizer: Arc<dyn ImageOptimizer>,
    pub clock: Arc<dyn Clock>,
}

impl Deps {
    /// Postgres-backed repositories with the system clock.
    pub fn postgres(
        pool: Arc<PgPool>,
        kv: Arc<dyn KvStore>,
        optimizer: Arc<dyn ImageOptimizer>,
    ) -> Self {
        Self {
            kv,
            files: Arc::new(PgFileRepository::new(pool.clone())),
            zones: Arc::new(PgZoneRepository::new(pool)),
            optimizer,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
