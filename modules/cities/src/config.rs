use serde::{Deserialize, Serialize};

/// Configuration for the cities module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CitiesConfig {
    /// Upper bound applied to `limit` on the REST listing.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for CitiesConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_max_page_size() -> u32 {
    1000
}
