//! berth - command-line surface over berth-core.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use berth_core::app::{
    InMemStoresModule, RefreshSettings, RequirementsRefresh, Storage, StorageBuilder,
};
use berth_core::config::{Config, ConfigLoader};
use berth_core::domain::{
    AssignedTask, CronCollisionPolicy, JobConfiguration, JobKey, Resources, ScheduleStatus,
    ScheduledTask, TaskConfig, TaskQuery,
};
use berth_core::impls::SystemCommandRunner;
use berth_core::ports::{Clock, IdGenerator, SystemClock, UlidGenerator};

/// berth CLI.
#[derive(Parser)]
#[command(name = "berth")]
#[command(about = "In-memory scheduler stores and requirements pinning")]
#[command(version)]
struct Cli {
    /// Configuration file path. Defaults apply when the file is absent.
    #[arg(short, long, default_value = "berth.toml", global = true, env = "BERTH_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the store registration table
    Bindings,

    /// Seed a cron job and its tasks into fresh stores, print the active tasks
    Demo {
        /// Force the first task into this state (e.g. RUNNING, FAILED)
        #[arg(long)]
        force_state: Option<String>,
    },

    /// Re-pin the packaging tool's dependency closure
    RefreshRequirements {
        #[arg(long)]
        package: Option<String>,

        #[arg(long)]
        version_file: Option<PathBuf>,

        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn build_storage(config: &Config) -> Result<Storage> {
    let module = InMemStoresModule::builder()
        .key_factory(config.storage.key_factory())
        .slow_query_threshold(config.storage.slow_query_threshold())
        .build()?;
    let storage = StorageBuilder::new()
        .install(module)
        .expect_bindings(Storage::primary_keys())
        .build()?;
    Ok(storage)
}

fn print_bindings(storage: &Storage) {
    for registration in storage.registrations() {
        let key = registration.key.to_string();
        println!("{key:<32} {}", registration.implementation);
    }
}

fn demo_job(key: &JobKey) -> JobConfiguration {
    let task_config = TaskConfig {
        job: key.clone(),
        owner_user: key.role().to_string(),
        is_service: false,
        production: false,
        priority: 0,
        max_task_failures: 3,
        resources: Resources {
            cpus: 0.5,
            ram_mb: 128,
            disk_mb: 256,
        },
        metadata: BTreeMap::new(),
    };
    JobConfiguration {
        key: key.clone(),
        owner: key.role().to_string(),
        cron_schedule: Some("*/5 * * * *".to_string()),
        cron_collision_policy: CronCollisionPolicy::KillExisting,
        task_config,
        instance_count: 3,
    }
}

fn parse_force_state(force_state: Option<&str>) -> Result<Option<ScheduleStatus>> {
    force_state
        .map(str::parse::<ScheduleStatus>)
        .transpose()
        .context("invalid --force-state")
}

async fn run_demo(storage: &Storage, force_state: Option<&str>) -> Result<()> {
    // Parse first so a bad name fails before anything is seeded.
    let forced = parse_force_state(force_state)?;

    let clock = SystemClock;
    let ids = UlidGenerator::new(SystemClock);
    let jobs = storage.cron_job_store()?;
    let tasks = storage.task_store()?;

    let key = JobKey::new("www-data", "devel", "hello")?;
    let job = demo_job(&key);
    jobs.save_accepted_job(job.clone()).await?;
    info!(job = %key, cron = ?job.cron_schedule, "saved cron job");

    let seeded: Vec<ScheduledTask> = (0..job.instance_count)
        .map(|instance| {
            let assigned = AssignedTask::unassigned(
                ids.generate_task_id(&key, instance),
                instance,
                job.task_config.clone(),
            );
            ScheduledTask::pending(assigned, clock.now())
        })
        .collect();
    let first = seeded
        .first()
        .map(|task| task.task_id().clone())
        .context("demo job has no instances")?;
    tasks.save_tasks(seeded).await?;

    let at = clock.now();
    tasks
        .mutate_task(
            &first,
            Box::new(move |task: &ScheduledTask| {
                let mut task = task.clone();
                task.assign("slave-1", "host-1.example.com", at);
                task
            }),
        )
        .await?;

    if let Some(status) = forced {
        let at = clock.now();
        tasks
            .mutate_task(
                &first,
                Box::new(move |task: &ScheduledTask| {
                    let mut task = task.clone();
                    task.transition(status, Some("forced from the command line".to_string()), at);
                    task
                }),
            )
            .await?;
        info!(task = %first, %status, "forced state");
    }

    info!(jobs = jobs.fetch_jobs().await.len(), "cron jobs stored");
    let active = tasks
        .fetch_tasks(&TaskQuery::job_scoped(&key).active())
        .await;
    println!("{}", serde_json::to_string_pretty(&active)?);
    Ok(())
}

/// Config values, with any command-line flags taking precedence.
fn refresh_settings(
    config: &Config,
    package: Option<String>,
    version_file: Option<PathBuf>,
    output: Option<PathBuf>,
) -> RefreshSettings {
    let mut settings = RefreshSettings::from(&config.requirements);
    if let Some(package) = package {
        settings.package = package;
    }
    if let Some(version_file) = version_file {
        settings.version_file = version_file;
    }
    if let Some(output) = output {
        settings.output = output;
    }
    settings
}

async fn run_refresh(settings: RefreshSettings) -> Result<()> {
    let report = RequirementsRefresh::new(SystemCommandRunner, settings)
        .run()
        .await
        .context("requirements refresh failed")?;
    println!(
        "pinned {} packages for version {} into {}",
        report.pinned,
        report.version,
        report.output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = ConfigLoader::load_or_default(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Bindings => {
            let storage = build_storage(&config)?;
            print_bindings(&storage);
        }
        Commands::Demo { force_state } => {
            let storage = build_storage(&config)?;
            run_demo(&storage, force_state.as_deref()).await?;
        }
        Commands::RefreshRequirements {
            package,
            version_file,
            output,
        } => {
            run_refresh(refresh_settings(&config, package, version_file, output)).await?;
        }
    }
    Ok(())
}
