//! Horse Derby - Entry Point
//!
//! Sets up the async runtime, opens a session against the on-disk balance
//! store, and runs a line-based front end that forwards commands to the race
//! driver and prints snapshots as the race unfolds.

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;
use tokio::sync::watch;

use horse_derby::core::config::GameConfig;
use horse_derby::core::error::Result;
use horse_derby::core::types::{HorseId, Mode};
use horse_derby::driver::{DriverHandle, RaceDriver};
use horse_derby::race::constants::FINISH_LINE;
use horse_derby::race::speed::RngSpeeds;
use horse_derby::session::{Intent, Session, Snapshot};
use horse_derby::store::FileStore;

/// Ticks between track redraws while racing
const REDRAW_EVERY: u64 = 10;
const TRACK_WIDTH: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "horse-derby")]
#[command(about = "Pick a horse, place a bet, watch the race")]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Balance store file (overrides the config)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Random seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("horse_derby=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(store) = args.store {
        config.store_path = store;
    }

    tracing::info!(store = %config.store_path.display(), tick_ms = config.tick_ms, "Horse Derby starting...");

    let rt = Runtime::new()?;
    rt.block_on(run(config, args.seed))
}

async fn run(config: GameConfig, seed: Option<u64>) -> Result<()> {
    let store = FileStore::open(&config.store_path)?;
    let speeds = match seed {
        Some(seed) => RngSpeeds::seeded(seed),
        None => RngSpeeds::from_entropy(),
    };
    let session = Session::new(speeds, store, &config);
    let (handle, driver) = RaceDriver::spawn(session);

    let printer = tokio::spawn(print_snapshots(handle.subscribe()));

    print_help();
    print_menu(&handle.snapshot());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "quit" | "q" => break,
            "help" | "?" => print_help(),
            "status" | "s" => print_status(&handle.snapshot()),
            _ => match input.parse::<Intent>() {
                Ok(intent) => forward(&handle, intent).await?,
                Err(e) => println!("{}. Type 'help' for commands.", e),
            },
        }
    }

    printer.abort();
    drop(handle);
    let session = driver.await.map_err(std::io::Error::other)?;
    println!("\nGoodbye! Final balance: {}", session.balance());
    Ok(())
}

/// Send an intent and explain why it did nothing if it was ignored
async fn forward(handle: &DriverHandle, intent: Intent) -> Result<()> {
    let mut rx = handle.subscribe();
    let before = rx.borrow_and_update().clone();
    handle.send(intent).await?;

    // the driver publishes after every intent, so this wakes once it landed
    let _ = rx.changed().await;
    let after = rx.borrow_and_update().clone();

    if after == before {
        println!("{}", rejection_reason(&before, intent));
    } else if after.mode == Mode::Menu {
        print_menu(&after);
    }
    Ok(())
}

fn rejection_reason(snapshot: &Snapshot, intent: Intent) -> String {
    match (snapshot.mode, intent) {
        (Mode::Menu, Intent::Start) if snapshot.selected_horse.is_none() => "Pick a horse first.".into(),
        (Mode::Menu, Intent::Start) => format!(
            "Bet of {} exceeds balance {}. Pick a smaller bet or reset.",
            snapshot.bet_amount, snapshot.balance
        ),
        (Mode::Menu, Intent::SelectBet(amount)) => {
            format!("Bet of {} is not available with balance {}.", amount, snapshot.balance)
        }
        (Mode::Menu, Intent::SelectHorse(_)) => "No such horse.".into(),
        (mode, _) => format!("Not available while {}.", mode),
    }
}

/// Print mode changes and periodic track redraws
async fn print_snapshots(mut rx: watch::Receiver<Snapshot>) {
    let mut last_mode = rx.borrow().mode;
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();

        if snapshot.mode != last_mode {
            match snapshot.mode {
                Mode::Racing if last_mode == Mode::Menu => {
                    println!("\nAnd they're off! (balance {})", snapshot.balance)
                }
                Mode::Racing => println!("\nRace resumed."),
                Mode::Paused => {
                    println!("\n=== Game Paused === (resume / exit)");
                    print_track(&snapshot);
                }
                Mode::Finished => print_result(&snapshot),
                Mode::Menu => {}
            }
            last_mode = snapshot.mode;
        } else if snapshot.mode == Mode::Racing && snapshot.tick % REDRAW_EVERY == 0 {
            print_track(&snapshot);
        }
    }
}

fn print_help() {
    println!("\n=== HORSE DERBY ===");
    println!("Commands:");
    println!("  horse <1-6>     - Pick your horse");
    println!("  bet <amount>    - Choose your stake (10, 50, 100)");
    println!("  start           - Start the race");
    println!("  pause / resume  - Pause or resume the race");
    println!("  exit            - Back to the menu");
    println!("  reset           - Reset balance to 100");
    println!("  status / s      - Show the current state");
    println!("  quit / q        - Leave the game");
}

fn print_menu(snapshot: &Snapshot) {
    println!();
    println!("--- Menu | Balance: {} ---", snapshot.balance);
    for horse in HorseId::all() {
        let marker = if snapshot.selected_horse == Some(horse) { '*' } else { ' ' };
        println!("  {} {} ({})", marker, horse.label(), horse.color());
    }
    let bets: Vec<String> = snapshot
        .bet_menu()
        .map(|(amount, enabled)| {
            if amount == snapshot.bet_amount {
                format!("[{}]", amount)
            } else if enabled {
                amount.to_string()
            } else {
                format!("({})", amount)
            }
        })
        .collect();
    println!("  Bet: {}", bets.join(" "));
    if snapshot.can_start() {
        println!("  Ready - type 'start'");
    }
}

fn print_track(snapshot: &Snapshot) {
    println!("--- Tick {} ---", snapshot.tick);
    for horse in HorseId::all() {
        let position = snapshot.positions[horse.index()];
        let filled = ((position.min(FINISH_LINE) / FINISH_LINE) * TRACK_WIDTH as f64) as usize;
        let marker = if snapshot.selected_horse == Some(horse) { '>' } else { ' ' };
        println!(
            "{}{:>8} |{}{}| {:5.1}%",
            marker,
            horse.label(),
            "=".repeat(filled),
            " ".repeat(TRACK_WIDTH - filled),
            position
        );
    }
}

fn print_result(snapshot: &Snapshot) {
    print_track(snapshot);
    let Some(winner) = snapshot.winner else {
        return;
    };
    println!("\n=== Winner! {} ===", winner);
    match (snapshot.player_won(), snapshot.winnings) {
        (Some(true), Some(winnings)) => println!("Congratulations! Your horse won! +{}", winnings),
        _ => println!("Better luck next time!"),
    }
    println!("Balance: {} (type 'exit' to return to the menu)", snapshot.balance);
}

fn print_status(snapshot: &Snapshot) {
    match snapshot.mode {
        Mode::Menu => print_menu(snapshot),
        Mode::Racing | Mode::Paused => {
            println!("Mode: {} | Bet: {} | Balance: {}", snapshot.mode, snapshot.bet_amount, snapshot.balance);
            print_track(snapshot);
        }
        Mode::Finished => print_result(snapshot),
    }
}
