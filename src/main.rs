use std::path::Path;

use anyhow::{bail, Context, Result};
use bout::components::FighterAction;
use bout::config::BoutConfig;
use bout::scene::{Scenario, ScenarioOutcome};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "bout", about = "Run a scripted bout headless and print what happened")]
struct Args {
    /// Built-in scenario name, or path to a scenario JSON file
    #[arg(long, default_value = "exchange")]
    scenario: String,

    /// Bout configuration JSON replacing the scenario's own
    #[arg(long)]
    config: Option<String>,

    /// Override the number of ticks to simulate
    #[arg(long)]
    ticks: Option<u32>,

    /// Print the full report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log every state transition
    #[arg(long, short)]
    verbose: bool,

    /// List the built-in scenarios and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    if args.list {
        for name in Scenario::builtin_names() {
            if let Some(scenario) = Scenario::builtin(name) {
                println!("{name:<10} {}", scenario.description);
            }
        }
        return Ok(());
    }

    let mut scenario = load_scenario(&args.scenario)?;
    if let Some(path) = &args.config {
        scenario.config = BoutConfig::load(path)
            .with_context(|| format!("loading bout config `{path}`"))?;
    }
    if let Some(ticks) = args.ticks {
        scenario.ticks = ticks;
    }

    let outcome = scenario
        .run()
        .with_context(|| format!("running scenario `{}`", scenario.name))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_text(&outcome);
    }

    if !outcome.passed() {
        bail!(
            "scenario `{}`: {} expectation(s) failed",
            outcome.scenario,
            outcome.mismatches.len()
        );
    }
    Ok(())
}

fn load_scenario(arg: &str) -> Result<Scenario> {
    if let Some(scenario) = Scenario::builtin(arg) {
        return Ok(scenario);
    }
    if Path::new(arg).exists() {
        return Scenario::load(arg).with_context(|| format!("loading scenario `{arg}`"));
    }
    bail!(
        "`{arg}` is neither a built-in scenario ({}) nor a file",
        Scenario::builtin_names().join(", ")
    )
}

fn print_text(outcome: &ScenarioOutcome) {
    let report = &outcome.report;
    println!("== {} ({} ticks)", outcome.scenario, report.ticks);

    for entry in &report.log {
        // Transitions are the bulk of the log; the markers read better alone.
        if let FighterAction::Transition { fighter, from, to } = &entry.action {
            println!("{:>5}  {fighter}  {from} -> {to}", entry.tick);
        } else {
            println!("{:>5}  {:?}", entry.tick, entry.action);
        }
    }

    println!();
    for fighter in &report.fighters {
        let s = &fighter.stats;
        println!(
            "{} ({}): {} hp, {} at x={:.2}, dealt {}, landed {}, blocked {}, floored {}x, momentum {}",
            fighter.name,
            fighter.id,
            fighter.health,
            fighter.state,
            fighter.position_x,
            s.damage_dealt,
            s.hits_landed,
            s.hits_blocked,
            s.knockdowns_suffered,
            s.momentum,
        );
    }

    for m in &outcome.mismatches {
        println!(
            "FAILED tick {} fighter {}: expected {}, observed {}",
            m.tick, m.fighter, m.expected, m.observed
        );
    }
}
