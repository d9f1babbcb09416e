use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ptv_companion::cache::{CacheConfig, CachedProvider};
use ptv_companion::config::{
    ConfigStore, FileConfigStore, apply_response, configuration_url,
};
use ptv_companion::device::DeviceInbox;
use ptv_companion::domain::{Departure, DisplayZone, Query};
use ptv_companion::pipeline::{
    DepartureProvider, Pipeline, PipelineConfig, PipelineError, RunSupervisor,
};
use ptv_companion::ptv::{MockPtvClient, PtvClient, PtvConfig, PtvError};
use ptv_companion::web::{AppState, create_router};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "ptv-companion")]
#[command(about = "Next departures for your favourite stops, delivered to the watch", long_about = None)]
struct Cli {
    /// Configuration document location
    #[arg(long, env = "PTV_COMPANION_CONFIG", default_value = "ptv-companion.json", global = true)]
    config: PathBuf,

    /// Departures endpoint of the timetable service
    #[arg(long, env = "PTV_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Serve departures from `<routeType>-<stopID>.json` files instead of the network
    #[arg(long, global = true)]
    mock_dir: Option<PathBuf>,

    /// Zone for displayed clock times ("local" or an IANA name)
    #[arg(long, default_value = "local", global = true)]
    timezone: DisplayZone,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and print the watch screen
    Run,
    /// Re-run the pipeline periodically; each run replaces the previous one
    Watch {
        /// Seconds between runs
        #[arg(short, long, default_value_t = 60)]
        interval: u64,
    },
    /// Store the response returned by the configuration page
    Configure {
        #[arg(value_name = "RESPONSE")]
        response: String,
    },
    /// Print the configuration page URL for the current document
    ConfigUrl {
        #[arg(long, default_value = "http://127.0.0.1:3000/")]
        page: String,
    },
    /// Serve the configuration page
    ServeConfig {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

/// Live or file-backed upstream.
enum Provider {
    Live(PtvClient),
    Mock(MockPtvClient),
}

impl Provider {
    fn from_cli(cli: &Cli) -> Result<Self, BoxError> {
        if let Some(dir) = &cli.mock_dir {
            let mock = MockPtvClient::load(dir)?;
            info!(queries = mock.available_queries().len(), dir = %dir.display(), "Loaded mock departures");
            return Ok(Provider::Mock(mock));
        }
        let Some(endpoint) = &cli.endpoint else {
            return Err("either --endpoint or --mock-dir is required".into());
        };
        Ok(Provider::Live(PtvClient::new(PtvConfig::new(endpoint.as_str()))?))
    }
}

impl DepartureProvider for Provider {
    async fn departures(&self, token: &str, query: &Query) -> Result<Vec<Departure>, PtvError> {
        match self {
            Provider::Live(client) => client.departures(token, query).await,
            Provider::Mock(mock) => mock.departures(token, query).await,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<(), BoxError> {
    let file_store = Arc::new(FileConfigStore::new(&cli.config));
    let store: Arc<dyn ConfigStore> = file_store.clone();
    let pipeline_config = PipelineConfig::default().with_zone(cli.timezone);

    match &cli.command {
        Commands::Run => {
            let pipeline = Pipeline::new(Provider::from_cli(&cli)?, store, pipeline_config);
            let inbox = Arc::new(DeviceInbox::new());
            let outcome = pipeline.run(inbox.clone(), Utc::now()).await;
            print!("{}", inbox.screen().render());
            report_run(outcome)?;
        }
        Commands::Watch { interval } => {
            let provider = CachedProvider::new(Provider::from_cli(&cli)?, &CacheConfig::default());
            let pipeline = Arc::new(Pipeline::new(provider, store, pipeline_config));
            watch(pipeline, Duration::from_secs((*interval).max(1))).await;
        }
        Commands::Configure { response } => match apply_response(store.as_ref(), response)? {
            Some(config) => println!(
                "Saved {} favourite(s) to {}",
                config.favourites.len(),
                file_store.path().display()
            ),
            None => println!("Configuration unchanged"),
        },
        Commands::ConfigUrl { page } => {
            let current = store.get()?;
            println!("{}", configuration_url(page, current.as_ref())?);
        }
        Commands::ServeConfig { addr } => {
            let app = create_router(AppState::default());
            let listener = tokio::net::TcpListener::bind(*addr).await?;
            info!(%addr, "Configuration page listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

/// Run the pipeline every `period`, letting each tick supersede the last.
async fn watch<P>(pipeline: Arc<Pipeline<P>>, period: Duration)
where
    P: DepartureProvider + 'static,
{
    let supervisor = Arc::new(RunSupervisor::new());
    let inbox = Arc::new(DeviceInbox::new());
    let mut ticker = tokio::time::interval(period);
    let worst_case = pipeline.config().fetch.worst_case();
    info!(
        period_secs = period.as_secs(),
        fetch_worst_case_ms = worst_case.as_millis() as u64,
        "Watching departures"
    );
    if worst_case >= period {
        warn!("Slow upstream queries can outlast the interval and will be superseded");
    }

    loop {
        ticker.tick().await;

        let pipeline = pipeline.clone();
        let supervisor = supervisor.clone();
        let inbox = inbox.clone();
        tokio::spawn(async move {
            let outcome = supervisor
                .run_latest(async {
                    inbox.clear();
                    pipeline.run(inbox.clone(), Utc::now()).await
                })
                .await;

            match outcome {
                Err(PipelineError::Superseded) => {
                    warn!("Run superseded before it finished");
                }
                outcome => {
                    print!("{}", inbox.screen().render());
                    if let Err(e) = report_run(outcome) {
                        error!("{e}");
                    }
                }
            }
        });
    }
}

fn report_run(
    outcome: Result<ptv_companion::pipeline::RunReport, PipelineError>,
) -> Result<(), BoxError> {
    match outcome {
        Ok(report) => {
            for failure in &report.plan.failures {
                warn!(query = %failure.query, error = %failure.error, "Query contributed no departures");
            }
            info!(
                delivered = report.delivery.delivered,
                retries = report.delivery.retries,
                "Run complete"
            );
            Ok(())
        }
        Err(PipelineError::Delivery(e)) => {
            for message in e.undelivered() {
                warn!(message = %message.describe(), "Not delivered");
            }
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
