use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL of the plot/title recommendation service
    #[serde(default = "default_recommender_url")]
    pub recommender_url: String,

    /// Location of the persisted preference blob
    #[serde(default = "default_preferences_path")]
    pub preferences_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_recommender_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_preferences_path() -> String {
    "movie_prefs.json".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = envy::from_iter(vars(&[("TMDB_API_KEY", "secret")])).unwrap();

        assert_eq!(config.tmdb_api_key, "secret");
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.recommender_url, "http://localhost:8000");
        assert_eq!(config.preferences_path, "movie_prefs.json");
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides() {
        let config: Config = envy::from_iter(vars(&[
            ("TMDB_API_KEY", "secret"),
            ("RECOMMENDER_URL", "http://recommender:9000"),
            ("PORT", "8080"),
            ("HOST", "0.0.0.0"),
        ]))
        .unwrap();

        assert_eq!(config.recommender_url, "http://recommender:9000");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_api_key_fails() {
        let result = envy::from_iter::<_, Config>(vars(&[("PORT", "8080")]));
        assert!(result.is_err());
    }
}
