use mdm_core::config::Settings;
use mdm_core::ingest::provider::RecommendationSource;
use mdm_core::ingest::reconcile_page;
use mdm_core::ledger::MergeSummary;
use mdm_core::storage::LedgerFile;

/// One scheduled run: load, merge the current page, write the ledger back.
///
/// Any failure aborts before the ledger file is touched.
pub async fn reconcile(
    settings: &Settings,
    source: &dyn RecommendationSource,
    dry_run: bool,
) -> anyhow::Result<MergeSummary> {
    let codec = settings.codec()?;
    let store = LedgerFile::new(&settings.ledger_path);

    let mut ledger = store.load(codec.as_ref())?;
    let before = ledger.fingerprint();
    tracing::info!(
        format = codec.format_name(),
        records = ledger.len(),
        header_date = ledger.header_date(),
        fingerprint = %before,
        "ledger loaded"
    );

    let page = source.fetch_page().await?;
    let summary = reconcile_page(&mut ledger, &page)?;
    let after = ledger.fingerprint();

    tracing::info!(
        appended = summary.appended,
        updated = summary.updated,
        unchanged = summary.unchanged,
        records = ledger.len(),
        header_date = ledger.header_date(),
        fingerprint_before = %before,
        fingerprint_after = %after,
        "ledger reconciled"
    );

    if dry_run {
        print!("{}", codec.serialize(&ledger)?);
        tracing::info!(dry_run = true, "ledger not written");
        return Ok(summary);
    }

    store.save(&ledger, codec.as_ref())?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct StaticPage(String);

    #[async_trait::async_trait]
    impl RecommendationSource for StaticPage {
        fn source_name(&self) -> &'static str {
            "static"
        }

        async fn fetch_page(&self) -> anyhow::Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl RecommendationSource for FailingSource {
        fn source_name(&self) -> &'static str {
            "failing"
        }

        async fn fetch_page(&self) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    fn page(rows: &[[&str; 6]]) -> StaticPage {
        let body: String = rows
            .iter()
            .map(|cells| {
                let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
                format!("<tr>{tds}</tr>")
            })
            .collect();
        StaticPage(format!(
            r#"<table class="content-rekomendacja"><tbody>{body}</tbody></table>"#
        ))
    }

    fn settings_in(dir: &std::path::Path) -> Settings {
        Settings {
            source_url: "http://localhost/unused".to_string(),
            ledger_path: dir.join("recommendations.md"),
            ledger_format: "markdown".to_string(),
            ledger_labels: "en".to_string(),
            sentry_dsn: None,
            fetch_timeout_secs: 30,
            fetch_retries: 1,
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mdm-worker-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn first_run_creates_ledger_and_rerun_is_byte_identical() {
        let dir = temp_dir();
        let settings = settings_in(&dir);
        let source = page(&[
            ["ACME", "kupuj", "2024-01-10", "10,00", "12M", "12,00"],
            ["BETA", "kupuj", "2024-02-01", "20,00", "12M", "30,00"],
        ]);

        let first = reconcile(&settings, &source, false).await.unwrap();
        assert_eq!(first.appended, 2);
        let written = std::fs::read_to_string(&settings.ledger_path).unwrap();
        assert!(written.starts_with("# 2024-02-01\n"));

        let second = reconcile(&settings, &source, false).await.unwrap();
        assert!(!second.changed());
        assert_eq!(std::fs::read_to_string(&settings.ledger_path).unwrap(), written);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn dry_run_leaves_disk_untouched() {
        let dir = temp_dir();
        let settings = settings_in(&dir);
        let source = page(&[["ACME", "kupuj", "2024-01-10", "10,00", "12M", "12,00"]]);

        let summary = reconcile(&settings, &source, true).await.unwrap();
        assert_eq!(summary.appended, 1);
        assert!(!settings.ledger_path.exists());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn failures_keep_previous_ledger() {
        let dir = temp_dir();
        let settings = settings_in(&dir);
        let good = page(&[["ACME", "kupuj", "2024-01-10", "10,00", "12M", "12,00"]]);
        reconcile(&settings, &good, false).await.unwrap();
        let before = std::fs::read_to_string(&settings.ledger_path).unwrap();

        assert!(reconcile(&settings, &FailingSource, false).await.is_err());

        let broken = page(&[
            ["ACME", "kupuj", "2024-01-10", "10,00", "12M", "20,00"],
            ["BETA", "kupuj", "soon", "20,00", "12M", "30,00"],
        ]);
        assert!(reconcile(&settings, &broken, false).await.is_err());

        assert_eq!(std::fs::read_to_string(&settings.ledger_path).unwrap(), before);
        std::fs::remove_dir_all(dir).unwrap();
    }
}
