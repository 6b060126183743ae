//! Pre-loaded, normalized master data used by every calculation

use crate::masters::city::{City, CityIndex, Client};
use crate::masters::rate_record::{RateRecord, RawRateRecord};
use crate::traits::MasterDataSource;
use crate::types::*;

/// Clients, cities and rate records, normalized once at load time
#[derive(Debug, Clone, Default)]
pub struct RateBook {
    clients: Vec<Client>,
    cities: CityIndex,
    rates: Vec<RateRecord>,
}

impl RateBook {
    /// Normalize raw masters into a rate book
    pub fn load(clients: Vec<Client>, cities: Vec<City>, raw_rates: Vec<RawRateRecord>) -> Self {
        let cities = CityIndex::new(cities);
        let rates: Vec<RateRecord> = raw_rates
            .into_iter()
            .map(|raw| RateRecord::from_raw(raw, &cities))
            .collect();

        tracing::debug!(
            clients = clients.len(),
            cities = cities.len(),
            rates = rates.len(),
            "Rate book loaded"
        );

        Self {
            clients,
            cities,
            rates,
        }
    }

    /// Load through an external master data source
    pub async fn from_source<S: MasterDataSource + ?Sized>(source: &S) -> FreightResult<Self> {
        let clients = source.list_clients().await?;
        let cities = source.list_cities().await?;
        let rates = source.list_rates().await?;
        Ok(Self::load(clients, cities, rates))
    }

    /// Find a client by id or code
    pub fn client(&self, reference: &str) -> Option<&Client> {
        self.clients
            .iter()
            .find(|client| client.is_addressed_by(reference))
    }

    /// Find a city by id or code
    pub fn city(&self, reference: &str) -> Option<&City> {
        self.cities.get(reference)
    }

    pub fn cities(&self) -> &CityIndex {
        &self.cities
    }

    pub fn rates(&self) -> &[RateRecord] {
        &self.rates
    }

    /// Active records belonging to a client, in persisted order
    pub fn client_rates<'a>(&'a self, client: &'a Client) -> impl Iterator<Item = &'a RateRecord> {
        self.rates
            .iter()
            .filter(move |record| record.active && record.belongs_to(client))
    }
}
