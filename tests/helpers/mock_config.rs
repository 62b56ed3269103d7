// ==========================================
// Mock configuration for integration tests
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use ncip_import::config::{config_defaults, ConfigResult, ImportConfigReader};

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub default_collection: String,
    pub partition_prefix: String,
    pub allow_partition_collections: bool,
    pub ongoing_status_keywords: Vec<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_collection: config_defaults::DEFAULT_COLLECTION.to_string(),
            partition_prefix: config_defaults::PARTITION_PREFIX.to_string(),
            allow_partition_collections: true,
            ongoing_status_keywords: config_defaults::ONGOING_STATUS_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
    async fn get_default_collection(&self) -> ConfigResult<String> {
        Ok(self.default_collection.clone())
    }

    async fn get_partition_prefix(&self) -> ConfigResult<String> {
        Ok(self.partition_prefix.clone())
    }

    async fn get_allow_partition_collections(&self) -> ConfigResult<bool> {
        Ok(self.allow_partition_collections)
    }

    async fn get_ongoing_status_keywords(&self) -> ConfigResult<Vec<String>> {
        Ok(self.ongoing_status_keywords.clone())
    }
}
