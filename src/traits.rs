//! Traits for master data access

use async_trait::async_trait;

use crate::masters::{City, Client, RawRateRecord};
use crate::types::*;

/// Source of the masters the calculation engine reads
///
/// Persistence (browser storage, REST API, database) lives outside this
/// crate; adapters implement this trait and the engine loads everything
/// into a [`crate::masters::RateBook`] before any calculation runs.
#[async_trait]
pub trait MasterDataSource: Send + Sync {
    /// All clients
    async fn list_clients(&self) -> FreightResult<Vec<Client>>;

    /// All cities
    async fn list_cities(&self) -> FreightResult<Vec<City>>;

    /// All rate master records, in persisted order
    async fn list_rates(&self) -> FreightResult<Vec<RawRateRecord>>;
}
