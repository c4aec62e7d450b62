use serde::Deserialize;

use crate::error::ReconError;
use crate::filter::DepositPolicy;
use crate::roster::CustomerRoster;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub policy: DepositPolicy,
    #[serde(default)]
    pub customers: Vec<CustomerEntry>,
}

fn default_name() -> String {
    "deposits".into()
}

/// One known customer. Entry order is report order.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerEntry {
    pub name: String,
    pub address: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        if self.policy.receive_category.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "policy.receive_category must not be empty".into(),
            ));
        }

        self.roster().map(|_| ())
    }

    /// The customer roster described by `[[customers]]`.
    pub fn roster(&self) -> Result<CustomerRoster, ReconError> {
        CustomerRoster::new(
            self.customers
                .iter()
                .map(|c| (c.name.as_str(), c.address.as_str())),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
