use std::collections::HashMap;

use crate::error::ReconError;

/// Known customers: address → display name, plus the order names are
/// reported in. Immutable once built and safe to share across threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerRoster {
    by_address: HashMap<String, String>,
    names: Vec<String>,
}

impl CustomerRoster {
    /// Build from `(name, address)` pairs in report order.
    ///
    /// Each customer has exactly one address and each address belongs to one
    /// customer; anything else is rejected.
    pub fn new<I, N, A>(entries: I) -> Result<Self, ReconError>
    where
        I: IntoIterator<Item = (N, A)>,
        N: Into<String>,
        A: Into<String>,
    {
        let mut roster = Self::default();
        for (name, address) in entries {
            let name = name.into();
            let address = address.into();

            if name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "customer for address '{address}' has an empty name"
                )));
            }
            if address.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "customer '{name}' has an empty address"
                )));
            }
            if roster.names.contains(&name) {
                return Err(ReconError::DuplicateCustomer(name));
            }
            if let Some(first) = roster.by_address.get(&address) {
                return Err(ReconError::DuplicateAddress {
                    address,
                    first: first.clone(),
                    second: name,
                });
            }

            roster.by_address.insert(address, name.clone());
            roster.names.push(name);
        }
        Ok(roster)
    }

    pub fn name_for(&self, address: &str) -> Option<&str> {
        self.by_address.get(address).map(String::as_str)
    }

    /// Customer names in report order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
