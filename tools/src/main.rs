//! sim-runner: headless simulation runner for the transit engine.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 240 --db run.db
//!   sim-runner --seed 12345 --data-dir ./data --ipc-mode

use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use transit_core::{
    command::{CommandOutcome, PlayerCommand},
    config::SimConfig,
    engine::SimEngine,
    snapshot::SimSnapshot,
    store::SimStore,
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick {
        count: u64,
    },
    Command {
        command: PlayerCommand,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct IpcReply<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<String>,
    snapshot: &'a SimSnapshot,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 240u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let config = match SimConfig::load(data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}; falling back to built-in defaults");
            SimConfig::default()
        }
    };

    if !ipc_mode {
        println!("Transit sim-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let store = if db == ":memory:" { SimStore::in_memory()? } else { SimStore::open(db)? };
    store.migrate()?;

    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4().simple());
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;

    let mut engine = SimEngine::build(run_id, seed, store, config)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        let ran = engine.run_ticks(ticks)?;
        print_summary(&engine, ran)?;
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let outcome = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => None,
            IpcCommand::Tick { count } => {
                let ran = engine.run_ticks(count)?;
                Some(format!("ran {ran} ticks"))
            }
            IpcCommand::Command { command } => match engine.apply_command(command)? {
                CommandOutcome::Applied => Some("applied".to_string()),
                CommandOutcome::Rejected(reason) => {
                    log::warn!("command rejected: {reason}");
                    Some(format!("rejected: {reason}"))
                }
                CommandOutcome::Ignored => Some("ignored: game over".to_string()),
            },
        };

        let snapshot = engine.snapshot();
        let reply = IpcReply { outcome, snapshot: &snapshot };
        writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(engine: &SimEngine, ran: u64) -> Result<()> {
    let snapshot = engine.snapshot();
    let state = &snapshot.state;
    let journeys = engine.store_event_count("journey_completed")?;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", snapshot.run_id);
    println!("  ticks run:      {ran}");
    println!("  final tick:     {}", snapshot.tick);
    println!("  day / hour:     {} / {:02}:00", snapshot.day(), snapshot.time());
    println!("  points:         {}", state.points.len());
    println!("  routes:         {}", state.routes.len());
    println!("  citizens:       {}", state.citizens.len());
    println!("  satisfaction:   {}%", state.satisfaction);
    println!("  resources:      {}", state.resources);
    println!("  score:          {}", state.score);
    println!("  journeys:       {journeys}");
    if let Some(totals) = engine.movement_totals() {
        println!("  hops / waits:   {} / {}", totals.hops, totals.stranded_ticks);
    }

    println!();
    println!("=== CHALLENGES ({}/{}) ===", state.challenges.completed_count(), state.challenges.all().len());
    for challenge in state.challenges.all() {
        let mark = if challenge.completed { "x" } else { " " };
        println!(
            "  [{mark}] {:<40} {:>6.0}/{:<6.0} ({:.0}%)",
            challenge.description,
            challenge.current,
            challenge.target,
            challenge.progress() * 100.0
        );
    }

    if state.game_over {
        println!();
        println!("=== GAME OVER ===");
        println!("  survived:       {} days", snapshot.day());
        println!("  co2 saved:      {:.1} kg", snapshot.co2_saved_kg());
        println!("  citizens:       {}", state.citizens.len());
        println!("  final score:    {}", state.score);
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
