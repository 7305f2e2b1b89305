pub mod codec;
pub mod domain;
pub mod ingest;
pub mod ledger;
pub mod storage;

pub mod config {
    use crate::codec::{ColumnLabels, JsonCodec, LedgerCodec, MarkdownCodec};
    use crate::ingest::mdm::DEFAULT_SOURCE_URL;
    use anyhow::Context;
    use std::path::PathBuf;

    const DEFAULT_LEDGER_PATH: &str = "recommendations.md";
    const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_FETCH_RETRIES: u32 = 1;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub source_url: String,
        pub ledger_path: PathBuf,
        pub ledger_format: String,
        pub ledger_labels: String,
        pub sentry_dsn: Option<String>,
        pub fetch_timeout_secs: u64,
        /// Fetch attempts, including the first one.
        pub fetch_retries: u32,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                source_url: std::env::var("MDM_SOURCE_URL")
                    .unwrap_or_else(|_| DEFAULT_SOURCE_URL.to_string()),
                ledger_path: std::env::var("LEDGER_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_LEDGER_PATH)),
                ledger_format: std::env::var("LEDGER_FORMAT")
                    .unwrap_or_else(|_| "markdown".to_string()),
                ledger_labels: std::env::var("LEDGER_LABELS").unwrap_or_else(|_| "en".to_string()),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                fetch_timeout_secs: parse_var("MDM_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?,
                fetch_retries: parse_var("MDM_FETCH_RETRIES", DEFAULT_FETCH_RETRIES)?,
            })
        }

        pub fn codec(&self) -> anyhow::Result<Box<dyn LedgerCodec>> {
            match self.ledger_format.trim().to_ascii_lowercase().as_str() {
                "markdown" | "md" => {
                    let labels = ColumnLabels::from_code(&self.ledger_labels)
                        .with_context(|| {
                            format!("LEDGER_LABELS must be en or pl (got {:?})", self.ledger_labels)
                        })?;
                    Ok(Box::new(MarkdownCodec::with_labels(labels)))
                }
                "json" => Ok(Box::new(JsonCodec)),
                other => anyhow::bail!("LEDGER_FORMAT must be markdown or json (got {other:?})"),
            }
        }
    }

    fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match std::env::var(name) {
            Ok(raw) => parse_value(name, &raw),
            Err(_) => Ok(default),
        }
    }

    fn parse_value<T>(name: &str, raw: &str) -> anyhow::Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        raw.trim()
            .parse::<T>()
            .with_context(|| format!("{name} must be a non-negative integer (got {raw:?})"))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn settings(format: &str, labels: &str) -> Settings {
            Settings {
                source_url: DEFAULT_SOURCE_URL.to_string(),
                ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
                ledger_format: format.to_string(),
                ledger_labels: labels.to_string(),
                sentry_dsn: None,
                fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
                fetch_retries: DEFAULT_FETCH_RETRIES,
            }
        }

        #[test]
        fn selects_codec_by_format() {
            assert_eq!(settings("markdown", "en").codec().unwrap().format_name(), "markdown");
            assert_eq!(settings(" MD ", "pl").codec().unwrap().format_name(), "markdown");
            assert_eq!(settings("json", "xx").codec().unwrap().format_name(), "json");
        }

        #[test]
        fn rejects_unknown_values() {
            assert!(settings("yaml", "en").codec().is_err());
            assert!(settings("markdown", "de").codec().is_err());
        }

        #[test]
        fn numeric_values_are_parsed_strictly() {
            assert_eq!(parse_value::<u64>("MDM_TIMEOUT_SECS", " 45 ").unwrap(), 45);
            assert_eq!(parse_value::<u32>("MDM_FETCH_RETRIES", "3").unwrap(), 3);

            let err = parse_value::<u64>("MDM_TIMEOUT_SECS", "30s").unwrap_err();
            assert!(err.to_string().contains("MDM_TIMEOUT_SECS"), "{err}");
            assert!(parse_value::<u32>("MDM_FETCH_RETRIES", "-1").is_err());
        }
    }
}
