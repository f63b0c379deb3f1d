mod defaults;
mod types;

pub use types::*;

use crate::engine::state::CaseType;
use crate::engine::Step;
use crate::error::ConfigError;
use defaults::*;
use std::path::Path;
use std::str::FromStr;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            data_dir: default_data_dir(),
            provider: Provider::default(),
            providers: ProvidersConfig::default(),
            concurrency: default_concurrency(),
            launch_delay_ms: default_launch_delay_ms(),
            timeout_sec: default_timeout_sec(),
            dispatch_timeout_sec: default_dispatch_timeout_sec(),
            max_revisions: default_max_revisions(),
            retry: RetryConfig::default(),
            human_review: HumanReviewConfig::default(),
            specialists: default_specialists(),
            routes: default_routes(),
            fallback_specialist: default_fallback_specialist(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.specialists.is_empty() {
            return Err(ConfigError::NoSpecialists);
        }

        // Route keys must be known case types, route targets known specialists
        for (case_type, specialist_ids) in &self.routes {
            if CaseType::from_str(case_type).is_err() {
                return Err(ConfigError::UnknownCaseType(case_type.clone()));
            }
            for id in specialist_ids {
                if self.specialist(id).is_none() {
                    return Err(ConfigError::UnknownSpecialist(id.clone()));
                }
            }
        }

        if self.specialist(&self.fallback_specialist).is_none() {
            return Err(ConfigError::UnknownFallback(
                self.fallback_specialist.clone(),
            ));
        }

        for gate in &self.human_review.gates {
            if !Step::ALL.iter().any(|s| s.name() == gate) {
                return Err(ConfigError::UnknownGateStep(gate.clone()));
            }
        }

        Ok(())
    }

    /// Look up a specialist by id
    pub fn specialist(&self, id: &str) -> Option<&Specialist> {
        self.specialists.iter().find(|s| s.id == id)
    }

    /// Specialists routed for a case type, in routing-table order
    pub fn route(&self, case_type: CaseType) -> Option<Vec<&Specialist>> {
        let ids = self.routes.get(case_type.as_str())?;
        let mut routed = Vec::with_capacity(ids.len());
        for id in ids {
            routed.push(self.specialist(id)?);
        }
        Some(routed)
    }
}
