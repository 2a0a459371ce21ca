//! sim-runner: headless runner for the warfield simulation.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 300
//!   sim-runner --seed 12345 --ticks 60 --realtime --config data/sim_config.json
//!   sim-runner --seed 12345 --ipc-mode

use anyhow::{Context, Result};
use std::env;
use std::io::{self, BufRead, Write};
use warfield_core::{
    clock::SystemClock, command::SimCommand, config::SimConfig, engine::SimEngine,
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    Tick {
        count: u64,
    },
    Command {
        command: SimCommand,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 300u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let realtime = args.iter().any(|a| a == "--realtime");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if !ipc_mode {
        println!("warfield sim-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  world:     {}x{}", config.world.width, config.world.height);
        println!("  realtime:  {realtime}");
        println!("  config:    {}", config_path.unwrap_or("(defaults)"));
        println!();
    }

    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4());
    let mut engine = SimEngine::build(run_id, seed, config, Box::new(SystemClock))
        .context("building engine")?;

    let started = chrono::Utc::now();
    if ipc_mode {
        log::info!("sim-runner listening on stdin, run {}", engine.run_id);
        run_ipc_loop(&mut engine)?;
    } else if realtime {
        run_realtime(&mut engine, ticks)?;
        print_summary(&engine, ticks, started);
    } else {
        engine.run_ticks(ticks)?;
        print_summary(&engine, ticks, started);
    }

    Ok(())
}

/// Pace ticks by the clock's tick interval so the wall-clock flag
/// schedule fires as it would interactively.
fn run_realtime(engine: &mut SimEngine, ticks: u64) -> Result<()> {
    for _ in 0..ticks {
        engine.advance()?;
        std::thread::sleep(engine.clock.tick_interval());
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

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => {}
            IpcRequest::Tick { count } => {
                if let Err(e) = engine.run_ticks(count) {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            }
            IpcRequest::Command { command } => {
                if let Err(e) = engine.apply_command(command) {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            }
        }
        writeln!(stdout, "{}", serde_json::to_string(&engine.snapshot())?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(engine: &SimEngine, ticks: u64, started: chrono::DateTime<chrono::Utc>) {
    let standings = engine.standings();
    let snapshot = engine.snapshot();
    let elapsed = chrono::Utc::now() - started;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:       {}", engine.run_id);
    println!("  ticks run:    {ticks}");
    println!("  final tick:   {}", engine.clock.current_tick);
    println!("  resources:    {}", snapshot.resources.len());
    println!("  collectables: {}", snapshot.collectables.len());
    println!("  events kept:  {}", engine.event_log().len());
    println!("  wall time:    {}.{:03}s", elapsed.num_seconds(), elapsed.num_milliseconds() % 1000);

    println!();
    println!("=== STANDINGS ===");
    for s in [&standings.north, &standings.south] {
        println!(
            "  {:<6} | Wood: {:>5} | Ore: {:>5} | Units: {:>3} (L{} M{} S{} A{})",
            s.faction.display_name(),
            s.wood,
            s.ore,
            s.living_units(),
            s.lumberjacks,
            s.miners,
            s.sowers,
            s.assassins,
        );
    }
    println!("  Combat: {}", engine.combat_stats());
    println!("  Winner: {}", standings.outcome());
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
