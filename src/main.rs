use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use prflow_rs::engine::platforms::github::GitHubPlatform;
use prflow_rs::engine::platforms::memory::MemoryPlatform;
use prflow_rs::engine::rules::loader::RulesetLoader;
use prflow_rs::engine::{server, Engine, PassSummary};
use prflow_rs::kit::snapshot::PullRequestSnapshot;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a ruleset and list actions whose configuration is invalid
    Check {
        /// Path to the ruleset file
        #[arg(short, long)]
        file: String,
    },
    /// Evaluate a ruleset against a pull request JSON file, without side effects
    Evaluate {
        /// Path to the ruleset file
        #[arg(short, long)]
        file: String,

        /// Path to the pull request snapshot (JSON)
        #[arg(short, long)]
        pull_request: String,

        /// Login the automation acts as
        #[arg(short, long, default_value = "prflow-bot")]
        identity: String,
    },
    /// Run one evaluation pass against a GitHub pull request
    Run {
        /// Path to the ruleset file
        #[arg(short, long)]
        file: String,

        /// Pull request number
        #[arg(long)]
        pr: u64,
    },
    /// Start the dry-run HTTP server
    Serve {
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

fn load_engine(file: &str) -> anyhow::Result<Engine> {
    let ruleset = RulesetLoader::new()
        .load_ruleset(file)
        .with_context(|| format!("failed to load ruleset {}", file))?;
    log::info!("Loaded {} rules from {}", ruleset.len(), file);
    Ok(Engine::new(ruleset))
}

fn print_summary(summary: &PassSummary) {
    for report in &summary.reports {
        println!(
            "[{:?}] {}: {}",
            report.conclusion, report.name, report.title
        );
        if !report.summary.is_empty() {
            println!("    {}", report.summary.replace('\n', "\n    "));
        }
    }
    for name in &summary.publish_failures {
        println!("failed to publish: {}", name);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Check { file } => {
            let engine = load_engine(&file)?;
            let errors = engine.validate();
            if errors.is_empty() {
                println!("{}: {} rules, no errors", file, engine.ruleset().len());
            } else {
                for report in &errors {
                    println!("{}: {}: {}", report.name, report.title, report.summary);
                }
                anyhow::bail!("{} invalid actions in {}", errors.len(), file);
            }
        }
        Commands::Evaluate {
            file,
            pull_request,
            identity,
        } => {
            let engine = load_engine(&file)?;
            let content = tokio::fs::read_to_string(&pull_request)
                .await
                .with_context(|| format!("failed to read {}", pull_request))?;
            let snapshot: PullRequestSnapshot = serde_json::from_str(&content)?;

            let platform = MemoryPlatform::new(identity, snapshot.clone());
            let summary = engine.run_pass(&snapshot, &platform).await;
            print_summary(&summary);
            println!("{}", serde_json::to_string_pretty(&platform.snapshot_now())?);
        }
        Commands::Run { file, pr } => {
            let engine = load_engine(&file)?;
            let platform = GitHubPlatform::from_env().await?;
            let summary = engine.run_for(pr, &platform, &platform).await?;
            print_summary(&summary);
        }
        Commands::Serve { port } => {
            server::serve(port)
                .await
                .map_err(|e| anyhow::anyhow!("server failed: {}", e))?;
        }
    }

    Ok(())
}
