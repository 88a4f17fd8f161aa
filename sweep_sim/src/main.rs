//! Sweep Scenario Generator CLI
//!
//! Expand an experiment plan into scenario files and a batch job script.

use clap::Parser;
use std::path::PathBuf;
use sweep_env::XmlScenarioWriter;
use sweep_sim::{preview_scenarios, ExperimentPlan, GenerateError, GenerationService, GridMap};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Parameter-sweep scenario generator
#[derive(Parser, Debug)]
#[command(name = "sweep-gen")]
#[command(about = "Generate simulation scenarios and a job script from an experiment plan", long_about = None)]
struct Args {
    /// Experiment plan (JSON)
    #[arg(short, long)]
    plan: PathBuf,
    
    /// Series to generate (required when the plan defines several)
    #[arg(short = 'S', long)]
    series: Option<String>,
    
    /// Directory receiving the run directory
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
    
    /// Replicas per job (overrides the plan)
    #[arg(short, long)]
    replicas: Option<usize>,
    
    /// RNG seed (overrides the plan; random when neither is set)
    #[arg(long)]
    seed: Option<u64>,
    
    /// List scenario names without writing anything
    #[arg(long)]
    dry_run: bool,
    
    /// JSON output for scripting
    #[arg(long)]
    json: bool,
    
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    
    // Initialize logging; RUST_LOG takes precedence over --verbose
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    
    if let Err(e) = run(args).await {
        error!("✗ {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), GenerateError> {
    let mut plan = ExperimentPlan::load(&args.plan)?;
    if let Some(replicas) = args.replicas {
        plan.replicas = replicas;
    }
    if args.seed.is_some() {
        plan.seed = args.seed;
    }
    
    let series = plan.select_series(args.series.as_deref())?;
    
    if args.dry_run {
        let names = preview_scenarios(
            series,
            &plan.map.name,
            plan.replicas,
            plan.population_value_rule,
        )?;
        if args.json {
            let listing = serde_json::json!({
                "series": series.name,
                "scenarios": names,
            });
            println!("{}", serde_json::to_string_pretty(&listing).unwrap_or_default());
        } else {
            info!("Series '{}' expands to {} scenarios:", series.name, names.len());
            for name in &names {
                info!("  {}", name);
            }
        }
        return Ok(());
    }
    
    if !args.json {
        info!("Sweep scenario generator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
    
    let request = plan.request(series, args.out.clone());
    let service = GenerationService::new(GridMap::new(plan.map.clone()), XmlScenarioWriter::new());
    let report = service.start(request)?.join().await?;
    
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!(
            "✅ {} scenarios ({} jobs x {} replicas) in {}",
            report.scenarios.len(),
            report.job_count,
            report.replicas,
            report.run_dir.display()
        );
        info!("Job script: {}", report.job_script.display());
        info!("Replay with: --seed {}", report.seed);
        for shortfall in &report.shortfalls {
            info!(
                "  - {}: '{}' {}/{} vehicles",
                shortfall.scenario,
                shortfall.outcome.population,
                shortfall.outcome.produced,
                shortfall.outcome.requested
            );
        }
    }
    Ok(())
}
