#![forbid(unsafe_code)]

use crate::error::CatalogError;
use crate::lifecycle::Catalog;
use serde_json::Value;
use sq_core::fields::{self, NumberRule};
use sq_core::model::GlobalConfig;
use sq_storage::CONFIG_KEY;

impl Catalog {
    /// Reads the config singleton, falling back to defaults when it has
    /// never been written.
    pub fn config(&self) -> Result<GlobalConfig, CatalogError> {
        match self.store.read_singleton(CONFIG_KEY)? {
            Some(doc) => Ok(serde_json::from_value(doc)?),
            None => Ok(GlobalConfig::default()),
        }
    }

    /// Validates a partial payload field-by-field and overlays it on the
    /// current config before writing the singleton back.
    pub fn update_config(&mut self, raw: &Value) -> Result<GlobalConfig, CatalogError> {
        let args = fields::require_object(raw, "payload").map_err(CatalogError::Validation)?;
        let mut config = self.config()?;

        if let Some(v) = fields::optional_bool(args, "chaosModeDefault")? {
            config.chaos_mode_default = v;
        }
        if let Some(v) = fields::optional_number(args, "maxRerolls", NumberRule::int_range(0, 10))? {
            config.max_rerolls = v as i64;
        }
        if let Some(v) = fields::optional_bool(args, "allowChaosFallback")? {
            config.allow_chaos_fallback = v;
        }
        if let Some(v) =
            fields::optional_number(args, "targetChaosRatio", NumberRule::unit_interval())?
        {
            config.target_chaos_ratio = v;
        }
        if let Some(v) =
            fields::optional_number(args, "baselineAcceptanceRate", NumberRule::unit_interval())?
        {
            config.baseline_acceptance_rate = v;
        }
        if let Some(v) = fields::optional_string(args, "generationPromptTemplate")? {
            config.generation_prompt_template = v;
        }
        if let Some(v) = fields::optional_bool(args, "generationEnabled")? {
            config.generation_enabled = v;
        }

        let doc = serde_json::to_value(&config)?;
        self.store.write_singleton(CONFIG_KEY, &doc)?;
        Ok(config)
    }
}
