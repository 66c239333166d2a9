//! Mindwatch CLI
//!
//! Usage:
//!   mindwatch                        # Run the monitoring pipeline + API
//!   mindwatch --once                 # One pass of each stage, then exit
//!   mindwatch --seed 42              # Reproducible simulation
//!   mindwatch --addr 0.0.0.0:8080    # API address

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mindwatch::core::classifier::CLASSIFIER_TASK;
use mindwatch::core::selector::SELECTOR_TASK;
use mindwatch::core::simulator::COLLECTOR_TASK;
use mindwatch::core::{
    create_router, run_server, HealthStore, MemoryStore, ObservationSimulator,
    RecommendationSelector, RiskClassifier, Scheduler, TaskSpec,
};
use mindwatch::types::{RiskLevel, StoreError};
use mindwatch::{
    ASSESS_INITIAL_DELAY_MS, COLLECT_INITIAL_DELAY_MS, DEFAULT_ASSESS_INTERVAL_SECS,
    DEFAULT_COLLECT_INTERVAL_SECS, DEFAULT_RECOMMEND_INTERVAL_SECS, RECOMMEND_INITIAL_DELAY_MS,
    VERSION,
};

/// Subjects registered at startup when the store is empty
const SAMPLE_SUBJECTS: [(&str, u32, char); 5] = [
    ("Alice Monroe", 72, 'F'),
    ("Arthur Bennett", 70, 'M'),
    ("Clara Whitfield", 75, 'F'),
    ("Edwin Marsh", 68, 'M'),
    ("Pearl Hastings", 77, 'F'),
];

#[derive(Parser, Debug)]
#[command(
    name = "mindwatch",
    version = VERSION,
    about = "Mindwatch - periodic emotional-risk monitoring pipeline",
    long_about = "Mindwatch periodically simulates health signals for registered subjects,\n\
                  scores each subject's emotional risk from the trailing observation\n\
                  window, and issues intervention recommendations.\n\n\
                  Three periodic tasks run concurrently against one shared store:\n  \
                  observation-collector     - synthesizes one reading per subject\n  \
                  risk-classifier           - deterministic threshold + trend scoring\n  \
                  recommendation-selector   - picks an intervention for the risk level\n\n\
                  A read-only HTTP API serves the collected data."
)]
struct Args {
    /// API server address
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Observation collection interval in seconds
    #[arg(long, default_value_t = DEFAULT_COLLECT_INTERVAL_SECS)]
    collect_interval: u64,

    /// Risk assessment interval in seconds
    #[arg(long, default_value_t = DEFAULT_ASSESS_INTERVAL_SECS)]
    assess_interval: u64,

    /// Recommendation interval in seconds
    #[arg(long, default_value_t = DEFAULT_RECOMMEND_INTERVAL_SECS)]
    recommend_interval: u64,

    /// RNG seed for reproducible simulation (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Run one tick of each pipeline stage, print the results and exit
    #[arg(long)]
    once: bool,

    /// Output --once results as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in --once output
    #[arg(long)]
    no_color: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    info!("======================================");
    info!("  Mindwatch v{} - emotional-risk monitor", VERSION);
    info!("======================================");

    let store = Arc::new(MemoryStore::new());
    if let Err(err) = seed_subjects(store.as_ref()).await {
        error!(%err, "could not seed subject registry");
        std::process::exit(1);
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "simulation seed");

    let shared: Arc<dyn HealthStore> = store.clone();
    let simulator = Arc::new(ObservationSimulator::new(shared.clone(), seed));
    let classifier = Arc::new(RiskClassifier::new(shared.clone()));
    let selector = Arc::new(RecommendationSelector::new(shared.clone(), seed.wrapping_add(1)));

    if args.once {
        run_once(
            &simulator,
            &classifier,
            &selector,
            shared.as_ref(),
            args.json,
            args.no_color,
        )
        .await;
        return;
    }

    // Schedule the three periodic tasks. A bad cadence is fatal at startup.
    let mut scheduler = Scheduler::new();

    let sim = simulator.clone();
    must_spawn(
        &mut scheduler,
        TaskSpec::new(
            COLLECTOR_TASK,
            Duration::from_millis(COLLECT_INITIAL_DELAY_MS),
            Duration::from_secs(args.collect_interval),
        ),
        move || {
            let sim = sim.clone();
            async move { sim.run_tick().await }
        },
    );

    let cls = classifier.clone();
    must_spawn(
        &mut scheduler,
        TaskSpec::new(
            CLASSIFIER_TASK,
            Duration::from_millis(ASSESS_INITIAL_DELAY_MS),
            Duration::from_secs(args.assess_interval),
        ),
        move || {
            let cls = cls.clone();
            async move { cls.run_tick().await }
        },
    );

    let sel = selector.clone();
    must_spawn(
        &mut scheduler,
        TaskSpec::new(
            SELECTOR_TASK,
            Duration::from_millis(RECOMMEND_INITIAL_DELAY_MS),
            Duration::from_secs(args.recommend_interval),
        ),
        move || {
            let sel = sel.clone();
            async move { sel.run_tick().await }
        },
    );

    // Serve the read API until shutdown is signalled.
    let router = create_router(shared.clone(), scheduler.statuses());
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let addr = args.addr.clone();
    let server = tokio::spawn(async move {
        let shutdown = async move {
            let _ = shutdown_rx.changed().await;
        };
        if let Err(err) = run_server(&addr, router, shutdown).await {
            error!(%err, "server error");
            std::process::exit(1);
        }
    });

    info!("monitoring started, press Ctrl+C to stop");
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => error!(%err, "failed to listen for shutdown signal"),
    }

    // Stop issuing ticks, let in-flight work finish, then release the store.
    let _ = shutdown_tx.send(true);
    scheduler.shutdown().await;
    if let Err(err) = shared.close().await {
        error!(%err, "store close failed");
    }
    let _ = server.await;
    info!("mindwatch stopped");
}

/// Initialize tracing from RUST_LOG, falling back to the CLI log level
fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mindwatch={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Register the sample subjects and log the registry
async fn seed_subjects(store: &MemoryStore) -> Result<(), StoreError> {
    for (name, age, sex) in SAMPLE_SUBJECTS {
        store.register_subject(name, age, sex).await?;
    }
    info!("registered subjects:");
    for subject in store.list_subjects().await? {
        info!(id = subject.id, name = %subject.name, age = subject.age, "  subject");
    }
    Ok(())
}

/// Spawn a periodic task or exit: a configuration error is fatal at startup
fn must_spawn<F, Fut>(scheduler: &mut Scheduler, spec: TaskSpec, work: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = mindwatch::types::TickReport> + Send + 'static,
{
    let name = spec.name;
    if let Err(err) = scheduler.spawn(spec, work) {
        error!(task = name, %err, "task failed to start");
        std::process::exit(1);
    }
}

/// Run one tick of each stage in pipeline order and print the results
async fn run_once(
    simulator: &ObservationSimulator,
    classifier: &RiskClassifier,
    selector: &RecommendationSelector,
    store: &dyn HealthStore,
    json: bool,
    no_color: bool,
) {
    let collected = simulator.run_tick().await;
    let assessed = classifier.run_tick().await;
    let recommended = selector.run_tick().await;

    let subjects = match store.list_subjects().await {
        Ok(subjects) => subjects,
        Err(err) => {
            error!(%err, "could not read subjects");
            std::process::exit(1);
        }
    };

    let mut summaries = Vec::new();
    for subject in subjects {
        let assessment = store.latest_assessment(subject.id).await.ok().flatten();
        let recommendation = store
            .recent_recommendations(subject.id, 1)
            .await
            .ok()
            .and_then(|mut r| r.pop());
        summaries.push((subject, assessment, recommendation));
    }

    if json {
        #[derive(serde::Serialize)]
        struct SubjectSummary {
            subject: mindwatch::types::Subject,
            assessment: Option<mindwatch::types::Assessment>,
            recommendation: Option<mindwatch::types::Recommendation>,
        }

        let output: Vec<SubjectSummary> = summaries
            .into_iter()
            .map(|(subject, assessment, recommendation)| SubjectSummary {
                subject,
                assessment,
                recommendation,
            })
            .collect();
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(err) => error!(%err, "could not serialize summary"),
        }
        return;
    }

    println!();
    println!("collection:     {}", collected);
    println!("assessment:     {}", assessed);
    println!("recommendation: {}", recommended);
    println!();

    for (subject, assessment, recommendation) in summaries {
        let level = assessment
            .as_ref()
            .map(|a| a.risk_level)
            .unwrap_or(RiskLevel::Low);
        let (color, reset) = if no_color {
            ("", "")
        } else {
            (level.color_code(), RiskLevel::color_reset())
        };

        println!("{}[{}] {}{}", color, level, subject.name, reset);
        if let Some(assessment) = &assessment {
            println!("  {}", assessment.rationale);
        }
        if let Some(recommendation) = &recommendation {
            println!("  suggestion: {}", recommendation.text);
        }
    }
}
