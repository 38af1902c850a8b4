use serde::Deserialize;
use std::env;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub storage_type: StorageType,
    pub github_token: Option<String>,
    pub github_repo: Option<String>,
    pub github_api_url: String,
    pub local_storage_path: Option<String>,
    /// Prefix of public links; derived from the request when unset.
    pub base_url: Option<String>,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub enum StorageType {
    GitHub,
    Local,
}

impl std::str::FromStr for StorageType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(StorageType::GitHub),
            "local" => Ok(StorageType::Local),
            _ => Err(anyhow::anyhow!("Invalid storage type: {}", s)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_port: 3000,
            storage_type: StorageType::GitHub,
            github_token: None,
            github_repo: None,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            local_storage_path: None,
            base_url: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Unset and blank variables are both treated as absent.
fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SERVER_PORT: {}", e))?,
            storage_type: env::var("STORAGE_TYPE")
                .unwrap_or_else(|_| "github".to_string())
                .parse()?,
            github_token: non_empty("GITHUB_TOKEN"),
            github_repo: non_empty("GITHUB_REPO"),
            github_api_url: non_empty("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            local_storage_path: non_empty("LOCAL_STORAGE_PATH"),
            base_url: non_empty("BASE_URL"),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_FETCH_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid FETCH_TIMEOUT_SECS: {}", e))?,
            user_agent: non_empty("USER_AGENT").unwrap_or_else(default_user_agent),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage_type == StorageType::Local && self.local_storage_path.is_none() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set for local storage"
            ));
        }
        if let Some(repo) = &self.github_repo {
            if repo.split('/').filter(|part| !part.is_empty()).count() != 2 {
                return Err(anyhow::anyhow!(
                    "GITHUB_REPO must look like owner/name, got {}",
                    repo
                ));
            }
        }
        if self.fetch_timeout_secs == 0 {
            return Err(anyhow::anyhow!("FETCH_TIMEOUT_SECS must be positive"));
        }
        Ok(())
    }
}
