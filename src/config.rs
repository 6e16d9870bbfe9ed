use anyhow::{Context, Result, anyhow, bail};
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::reconcile::ReportMode;
use crate::reconcile::slots::SlotStrategyKind;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,

    // Device gateway
    pub device_url: String,
    pub device_timeout: Duration,

    // Delivery
    pub webhook_url: String,
    pub webhook_timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,

    // Reconciliation
    pub time_zone: Tz,
    pub slot_strategy: SlotStrategyKind,
    pub report_mode: ReportMode,
    pub device_name: String,
    pub event_point: String,

    // Logging
    pub audit_log_path: String,
    pub log_dir: String,
    pub log_level: tracing::Level,

    // Rate limiting
    pub rate_sync_per_min: u32,
    pub rate_read_per_min: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let ms = |key: &str, default: &str| -> Result<Duration> {
            Ok(Duration::from_millis(parse(&get(key, default), key)?))
        };

        let slot_strategy: SlotStrategyKind =
            parse(&get("SLOT_STRATEGY", "ordinal"), "SLOT_STRATEGY")?;
        let report_mode = ReportMode::for_strategy(slot_strategy);
        if let Some(raw) = lookup("REPORT_MODE") {
            let requested: ReportMode = parse(&raw, "REPORT_MODE")?;
            if requested != report_mode {
                bail!(
                    "REPORT_MODE={requested} cannot be used with SLOT_STRATEGY={slot_strategy}; \
                     that strategy reports {report_mode}"
                );
            }
        }

        Ok(Self {
            server_addr: get("SERVER_ADDR", "0.0.0.0:4300"),
            api_prefix: get("API_PREFIX", "/api"),

            device_url: required("DEVICE_GATEWAY_URL")?,
            device_timeout: ms("DEVICE_TIMEOUT_MS", "10000")?,

            webhook_url: required("WEBHOOK_URL")?,
            webhook_timeout: ms("WEBHOOK_TIMEOUT_MS", "30000")?,
            retry_attempts: parse(&get("RETRY_ATTEMPTS", "5"), "RETRY_ATTEMPTS")?,
            retry_delay: Duration::from_secs(parse(
                &get("RETRY_DELAY_SECS", "60"),
                "RETRY_DELAY_SECS",
            )?),

            time_zone: parse(&get("TIME_ZONE", "Asia/Manila"), "TIME_ZONE")?,
            slot_strategy,
            report_mode,
            device_name: get("DEVICE_NAME", "ZKTeco Device"),
            event_point: get("EVENT_POINT", "Main Door"),

            audit_log_path: get("AUDIT_LOG_PATH", "upload_log.txt"),
            log_dir: get("LOG_DIR", "logs"),
            log_level: parse(&get("LOG_LEVEL", "debug"), "LOG_LEVEL")?,

            rate_sync_per_min: parse(&get("RATE_SYNC_PER_MIN", "6"), "RATE_SYNC_PER_MIN")?,
            rate_read_per_min: parse(&get("RATE_READ_PER_MIN", "60"), "RATE_READ_PER_MIN")?,
        })
    }
}

fn parse<T>(raw: &str, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("invalid value {raw:?} for {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DEVICE_GATEWAY_URL", "http://192.168.1.252:4370"),
        ("WEBHOOK_URL", "http://sink.local/webhook/attendance?area=HO"),
    ];

    #[test]
    fn defaults_match_office_setup() {
        let cfg = config(&REQUIRED).unwrap();
        assert_eq!(cfg.time_zone, chrono_tz::Asia::Manila);
        assert_eq!(cfg.retry_attempts, 5);
        assert_eq!(cfg.retry_delay, Duration::from_secs(60));
        assert_eq!(cfg.device_timeout, Duration::from_millis(10_000));
        assert_eq!(cfg.webhook_timeout, Duration::from_millis(30_000));
        assert_eq!(cfg.slot_strategy, SlotStrategyKind::Ordinal);
        assert_eq!(cfg.report_mode, ReportMode::Rows);
        assert_eq!(cfg.server_addr, "0.0.0.0:4300");
        assert_eq!(cfg.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn report_mode_follows_strategy() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SLOT_STRATEGY", "time-window"));
        assert_eq!(config(&vars).unwrap().report_mode, ReportMode::Days);

        vars.push(("REPORT_MODE", "days"));
        assert_eq!(config(&vars).unwrap().report_mode, ReportMode::Days);
    }

    #[test]
    fn mismatched_report_mode_is_rejected() {
        for (strategy, mode) in [("ordinal", "days"), ("time-window", "rows")] {
            let mut vars = REQUIRED.to_vec();
            vars.push(("SLOT_STRATEGY", strategy));
            vars.push(("REPORT_MODE", mode));

            let err = config(&vars).unwrap_err().to_string();
            assert!(err.contains("REPORT_MODE"), "{strategy} + {mode}: {err}");
        }
    }

    #[test]
    fn webhook_timeout_is_separate_from_device_timeout() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("DEVICE_TIMEOUT_MS", "2500"));
        vars.push(("WEBHOOK_TIMEOUT_MS", "45000"));

        let cfg = config(&vars).unwrap();
        assert_eq!(cfg.device_timeout, Duration::from_millis(2_500));
        assert_eq!(cfg.webhook_timeout, Duration::from_millis(45_000));
    }

    #[test]
    fn missing_webhook_is_an_error() {
        let err = config(&REQUIRED[..1]).unwrap_err();
        assert!(err.to_string().contains("WEBHOOK_URL"));
    }

    #[test]
    fn bad_values_name_the_variable() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("TIME_ZONE", "Mars/Olympus"));
        let err = config(&vars).unwrap_err();
        assert!(err.to_string().contains("TIME_ZONE"));
    }
}
