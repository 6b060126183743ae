//! In-memory master data source for testing

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::masters::{City, Client, RawRateRecord};
use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct Masters {
    clients: Vec<Client>,
    cities: Vec<City>,
    rates: Vec<RawRateRecord>,
}

/// In-memory master data implementation for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemoryMasterData {
    masters: Arc<RwLock<Masters>>,
}

fn poisoned<T>(_: T) -> FreightError {
    FreightError::MasterData("master data lock poisoned".to_string())
}

fn parse<T: serde::de::DeserializeOwned>(label: &str, json: &str) -> FreightResult<T> {
    serde_json::from_str(json)
        .map_err(|e| FreightError::MasterData(format!("Invalid {} JSON: {}", label, e)))
}

impl MemoryMasterData {
    /// Create an empty master data store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from JSON arrays as exported by the application
    pub fn from_json(clients: &str, cities: &str, rates: &str) -> FreightResult<Self> {
        let store = Self::new();
        {
            let mut masters = store.masters.write().map_err(poisoned)?;
            masters.clients = parse("clients", clients)?;
            masters.cities = parse("cities", cities)?;
            masters.rates = parse("rates", rates)?;
        }
        Ok(store)
    }

    pub fn add_client(&self, client: Client) -> FreightResult<()> {
        self.masters.write().map_err(poisoned)?.clients.push(client);
        Ok(())
    }

    pub fn add_city(&self, city: City) -> FreightResult<()> {
        self.masters.write().map_err(poisoned)?.cities.push(city);
        Ok(())
    }

    pub fn add_rate(&self, rate: RawRateRecord) -> FreightResult<()> {
        self.masters.write().map_err(poisoned)?.rates.push(rate);
        Ok(())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> FreightResult<()> {
        let mut masters = self.masters.write().map_err(poisoned)?;
        *masters = Masters::default();
        Ok(())
    }
}

#[async_trait]
impl MasterDataSource for MemoryMasterData {
    async fn list_clients(&self) -> FreightResult<Vec<Client>> {
        Ok(self.masters.read().map_err(poisoned)?.clients.clone())
    }

    async fn list_cities(&self) -> FreightResult<Vec<City>> {
        Ok(self.masters.read().map_err(poisoned)?.cities.clone())
    }

    async fn list_rates(&self) -> FreightResult<Vec<RawRateRecord>> {
        Ok(self.masters.read().map_err(poisoned)?.rates.clone())
    }
}
