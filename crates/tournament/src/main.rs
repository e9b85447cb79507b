//! Bandit arena CLI
//!
//! Schedule matches between uploaded agents and track their ratings.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use arena_core::{stats, Agent, AgentStore, InMemoryStore};
use tracing_subscriber::EnvFilter;

use tournament::{CommandHarness, Runner, RunnerConfig};

fn print_usage() {
    println!("Bandit Arena Tournament Runner");
    println!();
    println!("Usage:");
    println!("  tournament run [-n N] [--config FILE]");
    println!("  tournament leaderboard [--config FILE]");
    println!();
    println!("Options:");
    println!("  -n, --matches N    Number of matches to play (default: run until stopped)");
    println!("  -c, --config FILE  TOML configuration file (default: arena.toml if present)");
    println!();
    println!("Examples:");
    println!("  tournament run -n 50 --config arena.toml");
    println!("  tournament leaderboard");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("run") => cmd_run(&args[1..]),
        Some("leaderboard") => cmd_leaderboard(&args[1..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn parse_config_path(args: &[String]) -> PathBuf {
    let mut i = 0;
    while i < args.len() {
        if matches!(args[i].as_str(), "--config" | "-c") && i + 1 < args.len() {
            return PathBuf::from(&args[i + 1]);
        }
        i += 1;
    }
    PathBuf::from("arena.toml")
}

fn load_config(path: &Path) -> anyhow::Result<RunnerConfig> {
    if path.exists() {
        Ok(RunnerConfig::load(path)?)
    } else {
        Ok(RunnerConfig::default())
    }
}

fn cmd_run(args: &[String]) -> anyhow::Result<()> {
    let mut num_matches: Option<u64> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--matches" | "-n" => {
                if i + 1 < args.len() {
                    num_matches = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let config = load_config(&parse_config_path(args))?;
    let store = InMemoryStore::new();
    register_agents(&store, &config)?;

    let harness = CommandHarness::new(
        config.harness_command.clone(),
        config.harness_args.clone(),
        config.num_bandits,
    );
    let mut runner = Runner::new(&store, harness, config.k_factor, rand::thread_rng());

    match runner.run(num_matches) {
        Ok(played) => tracing::info!(played, "run complete"),
        Err(e) => tracing::error!("run stopped: {e}"),
    }

    save_agents(&config.ratings_path, &store.agents())?;
    print_leaderboard(&store.agents());
    Ok(())
}

fn cmd_leaderboard(args: &[String]) -> anyhow::Result<()> {
    let config = load_config(&parse_config_path(args))?;
    if !config.ratings_path.exists() {
        println!("No ratings recorded yet.");
        return Ok(());
    }
    let agents = load_agents(&config.ratings_path)?;
    print_leaderboard(&agents);
    Ok(())
}

/// Seed the store from the ratings dump if one exists, then register any
/// configured agents not seen before.
fn register_agents(store: &InMemoryStore, config: &RunnerConfig) -> anyhow::Result<()> {
    let mut known = Vec::new();
    if config.ratings_path.exists() {
        for agent in load_agents(&config.ratings_path)? {
            known.push(agent.name.clone());
            store.insert_agent(agent)?;
        }
    }
    for spec in &config.agents {
        if known.contains(&spec.name) {
            continue;
        }
        let mut agent = Agent::with_executable(&spec.name, spec.executable.clone());
        agent.description = spec.description.clone();
        store.insert_agent(agent)?;
    }
    Ok(())
}

fn load_agents(path: &Path) -> anyhow::Result<Vec<Agent>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn save_agents(path: &Path, agents: &[Agent]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(agents)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

fn print_leaderboard(agents: &[Agent]) {
    println!("\n=== Agent Leaderboard ===");
    println!("{:<6} {:<30} {:>8} {:>8}", "Rank", "Agent", "Rating", "Active");
    println!("{}", "-".repeat(56));
    for (i, agent) in stats::leaderboard(agents).iter().enumerate() {
        println!(
            "{:<6} {:<30} {:>8.1} {:>8}",
            i + 1,
            agent.name,
            agent.rating,
            if agent.is_eligible() { "yes" } else { "no" }
        );
    }
    println!();
}
