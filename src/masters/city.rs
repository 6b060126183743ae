//! City and client masters with id-or-code addressing

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::numeric::lenient;

/// City master record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub state: Option<String>,
}

impl City {
    pub fn new(id: &str, code: &str, name: &str, state: &str) -> Self {
        Self {
            id: id.to_string(),
            code: Some(code.to_string()),
            name: name.to_string(),
            state: Some(state.to_string()),
        }
    }
}

/// Client master record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub gstin: Option<String>,
}

impl Client {
    pub fn new(id: &str, code: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            code: Some(code.to_string()),
            name: name.to_string(),
            gstin: None,
        }
    }

    /// Whether this client is addressed by `reference` (id or code)
    pub fn is_addressed_by(&self, reference: &str) -> bool {
        same_key(&self.id, reference)
            || self
                .code
                .as_deref()
                .is_some_and(|code| same_key(code, reference))
    }
}

/// Keys compare trimmed and case-insensitively
pub(crate) fn same_key(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

fn index_key(reference: &str) -> String {
    reference.trim().to_ascii_lowercase()
}

/// Resolves city references given as id or code to the city's id
#[derive(Debug, Clone, Default)]
pub struct CityIndex {
    cities: Vec<City>,
    by_key: HashMap<String, usize>,
}

impl CityIndex {
    /// Build the index. Ids take precedence over codes on collision.
    pub fn new(cities: Vec<City>) -> Self {
        let mut by_key = HashMap::new();
        for (position, city) in cities.iter().enumerate() {
            if let Some(code) = &city.code {
                by_key.entry(index_key(code)).or_insert(position);
            }
        }
        for (position, city) in cities.iter().enumerate() {
            by_key.insert(index_key(&city.id), position);
        }
        Self { cities, by_key }
    }

    /// Look up a city by id or code
    pub fn get(&self, reference: &str) -> Option<&City> {
        if reference.trim().is_empty() {
            return None;
        }
        self.by_key
            .get(&index_key(reference))
            .map(|position| &self.cities[*position])
    }

    /// Canonical key (the city id) for a reference
    pub fn canonical(&self, reference: &str) -> Option<String> {
        self.get(reference).map(|city| city.id.clone())
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> CityIndex {
        CityIndex::new(vec![
            City::new("1", "MUM", "Mumbai", "Maharashtra"),
            City::new("2", "PUN", "Pune", "Maharashtra"),
            City::new("3", "AMD", "Ahmedabad", "Gujarat"),
        ])
    }

    #[test]
    fn test_resolve_by_id_or_code() {
        let index = index();
        assert_eq!(index.canonical("1"), Some("1".to_string()));
        assert_eq!(index.canonical("MUM"), Some("1".to_string()));
        assert_eq!(index.canonical(" pun "), Some("2".to_string()));
        assert_eq!(index.canonical("DEL"), None);
        assert_eq!(index.canonical(""), None);
    }

    #[test]
    fn test_id_wins_over_code() {
        let index = CityIndex::new(vec![
            City::new("10", "2", "Nagpur", "Maharashtra"),
            City::new("2", "SUR", "Surat", "Gujarat"),
        ]);
        assert_eq!(index.get("2").unwrap().name, "Surat");
    }

    #[test]
    fn test_city_deserializes_numeric_id() {
        let city: City =
            serde_json::from_str(r#"{"id": 7, "code": "NGP", "name": "Nagpur"}"#).unwrap();
        assert_eq!(city.id, "7");
        assert_eq!(city.state, None);
    }

    #[test]
    fn test_client_addressing() {
        let client = Client::new("42", "ACME", "Acme Traders");
        assert!(client.is_addressed_by("42"));
        assert!(client.is_addressed_by("acme"));
        assert!(!client.is_addressed_by(""));
        assert!(!client.is_addressed_by("43"));
    }
}
