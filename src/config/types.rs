use serde::Deserialize;

/// Values accepted from `thor.toml` / `thor.json`.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    #[serde(alias = "workers")]
    pub processes: Option<usize>,
    pub requests: Option<u64>,
    pub verbose: Option<bool>,
}
