use std::env;

/// Process-level configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64 * 1024 * 1024),
        }
    }
}

/// Detection thresholds and score weights.
///
/// The defaults are the production values; tests construct modified copies to
/// exercise edge behavior without giant fixtures.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Minimum cycle length reported (inclusive).
    pub cycle_min_len: usize,
    /// Maximum cycle length reported (inclusive).
    pub cycle_max_len: usize,
    /// Distinct counterparties inside one window required for a smurf flag.
    pub smurf_min_counterparties: usize,
    /// Sliding window width in hours.
    pub smurf_window_hours: i64,
    /// Minimum shell-chain length in hops (edges); 3 hops means two interiors.
    pub shell_min_hops: usize,
    /// Interior accounts above this transaction count disqualify a chain.
    pub shell_max_tx_per_node: u64,
    /// Depth cap for the shell-chain walk, in nodes on the path.
    pub shell_max_depth: usize,
    /// Percentile of the transaction-count distribution for the whitelist.
    pub merchant_percentile: f64,
    /// Floor on the whitelist threshold.
    pub merchant_min_tx: u64,
    pub weight_cycle: f64,
    pub weight_smurf: f64,
    pub weight_shell: f64,
    pub weight_volume: f64,
    /// Volume at which the log-scaled volume component saturates.
    pub volume_log_scale: f64,
    /// Aggregated volume above which the `high_volume` label is attached.
    pub high_volume_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            cycle_min_len: 3,
            cycle_max_len: 5,
            smurf_min_counterparties: 10,
            smurf_window_hours: 72,
            shell_min_hops: 3,
            shell_max_tx_per_node: 3,
            shell_max_depth: 8,
            merchant_percentile: 97.0,
            merchant_min_tx: 50,
            weight_cycle: 0.40,
            weight_smurf: 0.30,
            weight_shell: 0.15,
            weight_volume: 0.15,
            volume_log_scale: 1_000_000.0,
            high_volume_threshold: 500_000.0,
        }
    }
}

impl DetectionConfig {
    /// The four score weights must partition the full 100-point scale.
    pub fn validate(&self) -> super::errors::Result<()> {
        let sum = self.weight_cycle + self.weight_smurf + self.weight_shell + self.weight_volume;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(super::errors::EngineError::ConfigError(format!(
                "score weights must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(())
    }
}
