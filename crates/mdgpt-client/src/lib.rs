mod types;
mod provider;
mod completions;
mod mock;

pub use types::*;
pub use provider::ChatProvider;
pub use completions::CompletionsProvider;
pub use mock::{MockProvider, ScriptedMockProvider};

use mdgpt_config::ModelConfig;

/// Construct a boxed [`ChatProvider`] from configuration.
pub fn from_config(cfg: &ModelConfig) -> anyhow::Result<Box<dyn ChatProvider>> {
    let key = resolve_api_key(cfg);
    Ok(Box::new(CompletionsProvider::new(
        cfg.name.clone(),
        key,
        &cfg.base_url,
        cfg.max_tokens,
        cfg.temperature,
    )))
}

fn resolve_api_key(cfg: &ModelConfig) -> Option<String> {
    if let Some(k) = &cfg.api_key {
        return Some(k.clone());
    }
    if let Some(env) = &cfg.api_key_env {
        return std::env::var(env).ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_api_key_wins_over_env() {
        let cfg = ModelConfig {
            api_key: Some("inline".into()),
            api_key_env: Some("MDGPT_TEST_KEY_UNSET".into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&cfg).as_deref(), Some("inline"));
    }

    #[test]
    fn missing_key_resolves_to_none() {
        let cfg = ModelConfig {
            api_key: None,
            api_key_env: Some("MDGPT_TEST_KEY_DEFINITELY_UNSET".into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&cfg), None);
    }

    #[test]
    fn from_config_builds_provider() {
        let cfg = ModelConfig::default();
        let p = from_config(&cfg).unwrap();
        assert_eq!(p.model_name(), "gpt-4o-mini");
    }
}
