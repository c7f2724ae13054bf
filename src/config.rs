use crate::detector::SearchConfig;
use crate::error::Error;
use crate::fusion::FusionConfig;
use crate::scene::TrackerConfig;

use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct FinderConfig {
    pub fusion: FusionConfig,
    pub tracking: TrackerConfig,
    pub search: SearchConfig,
}

impl FinderConfig {
    /// Parses and validates a JSON config; missing fields keep their defaults.
    pub fn from_json(src: &str) -> Result<Self, Error> {
        let config: FinderConfig = serde_json::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.fusion.validate()?;
        self.tracking.validate()?;
        self.search.validate()
    }
}
