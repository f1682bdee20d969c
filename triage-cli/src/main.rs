use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use triage_core::{detect_circular_dependencies, Factor, ScoredTask, Strategy, TaskScorer};

mod config;
mod input;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "triage",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TRIAGE_BUILD_SHA"), ")"),
    about = "Score and order task lists by urgency, importance, effort and dependencies"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score every task in a JSON or CSV file and print them in priority order
    Analyze {
        /// Task file (.json array, or .csv with a header row)
        file: PathBuf,

        /// smart_balance | fastest_wins | high_impact | deadline_driven
        #[arg(long)]
        strategy: Option<String>,

        /// Count raw calendar days instead of business days
        #[arg(long)]
        calendar_days: bool,

        /// Apply weights learned from recorded feedback
        #[arg(long)]
        personalized: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Suggest the top tasks to work on today
    Suggest {
        file: PathBuf,

        /// Number of suggestions (default from config, else 3)
        #[arg(long)]
        count: Option<usize>,

        #[arg(long)]
        strategy: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// List tasks caught in circular dependencies
    Cycles { file: PathBuf },

    /// Record and inspect feedback on suggestions
    Feedback {
        #[command(subcommand)]
        command: FeedbackCommand,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum FeedbackCommand {
    /// Mark a suggestion as helpful or not
    #[command(group(ArgGroup::new("verdict").required(true).args(["helpful", "not_helpful"])))]
    Record {
        #[arg(long)]
        title: String,

        #[arg(long)]
        strategy: String,

        #[arg(long)]
        helpful: bool,

        #[arg(long)]
        not_helpful: bool,
    },

    /// Feedback totals, recommended strategy and learned adjustments
    Summary {
        #[arg(long)]
        json: bool,
    },

    /// Personalized weights for a strategy
    Weights {
        #[arg(long, default_value = "smart_balance")]
        strategy: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.triage/config.toml
    Init,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            file,
            strategy,
            calendar_days,
            personalized,
            json,
        } => {
            let cfg = Config::load()?;
            let strategy = resolve_strategy(strategy.as_deref(), &cfg)?;
            let tasks = input::load_tasks(&file)?;

            let mut scorer = build_scorer(strategy, &cfg);
            if calendar_days {
                scorer = scorer.with_business_days(false);
            }
            if personalized {
                let store = state::load_feedback_store()?;
                scorer = scorer.with_weights(store.personalized_weights(strategy));
            }

            let scored = scorer.score_tasks(&tasks);
            if json {
                let out = serde_json::json!({ "tasks": scored, "strategy_used": strategy });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let tag = if personalized { " (personalized)" } else { "" };
                println!("Strategy: {strategy}{tag}\n");
                print_scored(&scored);
            }
        }

        Command::Suggest {
            file,
            count,
            strategy,
            json,
        } => {
            let cfg = Config::load()?;
            let strategy = resolve_strategy(strategy.as_deref(), &cfg)?;
            let count = count.unwrap_or(cfg.scoring.suggest_count);
            let tasks = input::load_tasks(&file)?;

            let suggested = build_scorer(strategy, &cfg).suggest_top(&tasks, count);
            if json {
                let out = serde_json::json!({
                    "suggested_tasks": suggested,
                    "total_tasks_analyzed": tasks.len(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Top {} of {} tasks ({strategy}):\n", suggested.len(), tasks.len());
                print_scored(&suggested);
            }
        }

        Command::Cycles { file } => {
            let tasks = input::load_tasks(&file)?;
            let circular = detect_circular_dependencies(&tasks);
            if circular.is_empty() {
                println!("No circular dependencies among {} tasks", tasks.len());
            } else {
                println!("{} tasks involved in circular dependencies:\n", circular.len());
                for idx in circular {
                    println!("- [{idx}] {}", tasks[idx].title);
                }
            }
        }

        Command::Feedback { command } => match command {
            FeedbackCommand::Record {
                title,
                strategy,
                helpful,
                not_helpful: _,
            } => {
                let strategy: Strategy = strategy.parse()?;
                let store = state::load_feedback_store()?;
                store.record_feedback(title.as_str(), helpful, strategy);
                state::save_feedback_store(&store)?;

                let summary = store.summary();
                println!(
                    "Recorded {} feedback for '{}' ({strategy}). Total: {}",
                    if helpful { "helpful" } else { "not helpful" },
                    title,
                    summary.total_feedback
                );
            }

            FeedbackCommand::Summary { json } => {
                let summary = state::load_feedback_store()?.summary();
                if json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                } else {
                    println!(
                        "Feedback: {} total, {} helpful ({:.1}%)",
                        summary.total_feedback, summary.helpful_count, summary.helpful_percentage
                    );
                    println!("Recommended strategy: {}\n", summary.recommended_strategy);
                    println!("Weight adjustments:");
                    for f in Factor::ALL {
                        println!("  {:<12} {:+.3}", f.as_str(), summary.weight_adjustments.get(f));
                    }
                    println!("\nStrategy preferences:");
                    for (s, c) in &summary.strategy_preferences {
                        println!("  {:<16} {:+}", s.as_str(), c);
                    }
                }
            }

            FeedbackCommand::Weights { strategy } => {
                let strategy: Strategy = strategy.parse()?;
                let store = state::load_feedback_store()?;
                let base = strategy.base_weights();
                let tuned = store.personalized_weights(strategy);

                println!("{:<12} {:>6} {:>12}", strategy.as_str(), "base", "personalized");
                for f in Factor::ALL {
                    println!("{:<12} {:>6.3} {:>12.3}", f.as_str(), base.get(f), tuned.get(f));
                }
            }
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                let path = Config::path()?;
                if Config::init_at(&path)? {
                    println!("Wrote {}", path.display());
                } else {
                    println!("Config already exists: {}", path.display());
                }
            }
        },
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TRIAGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// CLI flag wins over config; both are validated strictly.
fn resolve_strategy(flag: Option<&str>, cfg: &Config) -> Result<Strategy> {
    match flag {
        Some(s) => Ok(s.parse()?),
        None => cfg
            .scoring
            .strategy
            .parse()
            .context("invalid scoring.strategy in config.toml"),
    }
}

fn build_scorer(strategy: Strategy, cfg: &Config) -> TaskScorer {
    TaskScorer::new(strategy)
        .with_business_days(cfg.scoring.business_days)
        .with_calendar(cfg.calendar())
}

fn print_scored(tasks: &[ScoredTask]) {
    if tasks.is_empty() {
        println!("(nothing to suggest)");
        return;
    }
    for (rank, t) in tasks.iter().enumerate() {
        println!(
            "{:>2}. [{:>6.2}] {} (due {}, {}h, importance {}/10)",
            rank + 1,
            t.score_or_zero(),
            t.title,
            t.due_date,
            t.estimated_hours,
            t.importance
        );
        println!("      {}", t.explanation);
    }
}
