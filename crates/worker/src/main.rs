use clap::Parser;
use mdm_core::ingest::provider::RecommendationSource;
use std::path::PathBuf;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod run;

#[derive(Debug, Parser)]
#[command(name = "mdm_worker")]
struct Args {
    /// Ledger file to update. Defaults to LEDGER_PATH or ./recommendations.md.
    #[arg(long)]
    ledger_path: Option<PathBuf>,

    /// Recommendations page URL. Defaults to MDM_SOURCE_URL or the mdm.pl page.
    #[arg(long)]
    source_url: Option<String>,

    /// Print the reconciled ledger instead of writing it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = mdm_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(path) = args.ledger_path {
        settings.ledger_path = path;
    }
    if let Some(url) = args.source_url {
        settings.source_url = url;
    }

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("reconcile_run", %run_id);

    let result = async {
        let source = mdm_core::ingest::provider::MdmHttpSource::from_settings(&settings)?;
        tracing::info!(
            source = source.source_name(),
            url = %settings.source_url,
            ledger = %settings.ledger_path.display(),
            "starting reconcile run"
        );
        run::reconcile(&settings, &source, args.dry_run)
            .await
            .map(|_| ())
    }
    .instrument(span)
    .await;

    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(%run_id, error = %format!("{err:#}"), "reconcile run failed");
    }
    result
}

fn init_sentry(settings: &mdm_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
