//! tracker-runner: hosts the RFID presence simulation.
//!
//! Usage:
//!   tracker-runner                               # live: tick every period, print counts
//!   tracker-runner --seed 12345 --ticks 20       # batch: apply 20 ticks, print summary
//!   tracker-runner --ipc-mode                    # JSON commands on stdin, state on stdout
//!   tracker-runner --config tracker.json --relay ws://localhost:8081
//!   tracker-runner --no-relay
//!   tracker-runner --students 120                # synthetic class of 120

use anyhow::Result;
use rfid_tracker_core::{
    clock::local_time_of_day,
    event::{event_type_name, TrackerEvent},
    types::Tick,
    ChannelState, ControlCommand, LocationCounts, RelayChannel, Roster, SimulationController,
    TrackerConfig,
};
use std::env;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(serde::Serialize)]
struct UiState<'a> {
    run_id:             &'a str,
    running:            bool,
    tick:               Tick,
    last_system_update: String,
    counts:             LocationCounts,
    students:           &'a Roster,
    relay:              ChannelState,
    received_messages:  &'a [String],
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let no_relay = has_flag(&args, "--no-relay");
    let ticks = parse_opt::<u64>(&args, "--ticks");

    let mut config = match find_arg(&args, "--config") {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(seed) = parse_opt::<u64>(&args, "--seed") {
        config.seed = Some(seed);
    }
    if let Some(n) = parse_opt::<usize>(&args, "--students") {
        config.synthetic_students = Some(n);
    }
    if let Some(url) = find_arg(&args, "--relay") {
        config.relay_url = url.to_string();
    }

    let mut controller = SimulationController::build(&config)?;

    if !ipc_mode {
        println!("RFID presence tracker: tracker-runner");
        println!("  seed:      {}", controller.seed());
        println!("  students:  {}", controller.roster().len());
        println!("  period:    {} ms", config.tick_period_ms);
        println!("  move p:    {}", config.move_probability);
        println!("  relay:     {}", if no_relay { "disabled" } else { config.relay_url.as_str() });
        println!();
    }

    let mut relay = if no_relay {
        RelayChannel::offline(config.relay_url.clone())
    } else {
        RelayChannel::connect(config.relay_url.clone()).await
    };

    let outcome = if ipc_mode {
        run_ipc_loop(&mut controller, &mut relay, config.relay_on_tick).await
    } else if let Some(n) = ticks {
        run_batch(&mut controller, &mut relay, n).await
    } else {
        run_live(&mut controller, &mut relay, config.relay_on_tick).await
    };

    // Teardown runs even when the loop failed.
    controller.stop();
    relay.close().await;
    outcome
}

async fn run_ipc_loop(
    controller: &mut SimulationController,
    relay: &mut RelayChannel,
    relay_on_tick: bool,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break; // EOF
                };
                if line.trim().is_empty() {
                    continue;
                }

                let cmd: ControlCommand = match serde_json::from_str(&line) {
                    Ok(c) => c,
                    Err(e) => {
                        let err_json = serde_json::json!({ "error": e.to_string() });
                        writeln!(stdout, "{}", err_json)?;
                        stdout.flush()?;
                        continue;
                    }
                };

                if !handle_command(controller, relay, cmd).await {
                    break;
                }
            }
            events = controller.next_tick() => {
                log_events(&events);
                if relay_on_tick {
                    relay.send(controller.roster());
                }
            }
            message = relay.recv() => match message {
                Some(text) => log::info!("relay message: {text}"),
                None => log::warn!("relay closed; continuing without it"),
            },
            _ = tokio::signal::ctrl_c() => break,
        }

        let state = build_ui_state(controller, relay);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Apply one operator command. Returns false on quit.
async fn handle_command(
    controller: &mut SimulationController,
    relay: &mut RelayChannel,
    cmd: ControlCommand,
) -> bool {
    let events: Vec<TrackerEvent> = match cmd {
        ControlCommand::Start => controller.start().into_iter().collect(),
        ControlCommand::Stop => controller.stop().into_iter().collect(),
        ControlCommand::Toggle => controller.toggle().into_iter().collect(),
        ControlCommand::Reset => controller.reset(),
        ControlCommand::Send => {
            relay.send(controller.roster());
            Vec::new()
        }
        ControlCommand::GetState => Vec::new(),
        ControlCommand::Quit => return false,
    };
    log_events(&events);
    true
}

async fn run_live(
    controller: &mut SimulationController,
    relay: &mut RelayChannel,
    relay_on_tick: bool,
) -> Result<()> {
    log_events(&controller.start().into_iter().collect::<Vec<_>>());
    print_counts(controller);

    loop {
        tokio::select! {
            events = controller.next_tick() => {
                log_events(&events);
                print_counts(controller);
                if relay_on_tick {
                    relay.send(controller.roster());
                }
            }
            message = relay.recv() => match message {
                Some(text) => println!("  relay <- {text}"),
                None => log::warn!("relay closed; continuing without it"),
            },
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupt received, shutting down");
                break;
            }
        }
    }
    Ok(())
}

async fn run_batch(
    controller: &mut SimulationController,
    relay: &mut RelayChannel,
    ticks: u64,
) -> Result<()> {
    let events = controller.run_ticks(ticks);
    log_events(&events);

    if relay.is_open() {
        relay.send(controller.roster());
    }

    let changes = events
        .iter()
        .filter(|e| matches!(e, TrackerEvent::LocationChanged { .. }))
        .count();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", controller.run_id());
    println!("  ticks run:      {ticks}");
    println!("  final tick:     {}", controller.current_tick());
    println!("  moves observed: {changes}");
    println!();
    println!("=== LOCATIONS ===");
    for (location, count) in controller.counts().iter() {
        println!("  {} {:<13} {count}", location.icon(), location.label());
    }
    println!();
    println!("=== STUDENTS ===");
    for student in controller.roster().entities() {
        println!("  {}  {:<16} {}", student.badge(), student.name, student.location);
    }
    Ok(())
}

fn build_ui_state<'a>(controller: &'a SimulationController, relay: &'a RelayChannel) -> UiState<'a> {
    UiState {
        run_id:             controller.run_id(),
        running:            controller.is_running(),
        tick:               controller.current_tick(),
        last_system_update: local_time_of_day(controller.last_update()),
        counts:             controller.counts(),
        students:           controller.roster(),
        relay:              relay.state(),
        received_messages:  relay.received(),
    }
}

fn print_counts(controller: &SimulationController) {
    let line: Vec<String> = controller
        .counts()
        .iter()
        .map(|(location, count)| format!("{} {count}", location.icon()))
        .collect();
    println!(
        "[{}] tick {:>4}  {}",
        local_time_of_day(controller.last_update()),
        controller.current_tick(),
        line.join("  ")
    );
}

fn log_events(events: &[TrackerEvent]) {
    for event in events {
        log::debug!(
            "{}: {}",
            event_type_name(event),
            serde_json::to_string(event).unwrap_or_default()
        );
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_opt<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    find_arg(args, flag).and_then(|v| v.parse().ok())
}
