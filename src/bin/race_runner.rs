//! Headless Race Runner
//!
//! Plays a batch of seeded races through a full session and prints summary
//! statistics, for checking odds and pacing without a front end.

use clap::Parser;
use serde::Serialize;

use horse_derby::core::config::GameConfig;
use horse_derby::core::error::Result;
use horse_derby::core::types::Mode;
use horse_derby::race::constants::{BET_OPTIONS, HORSE_COUNT};
use horse_derby::race::speed::RngSpeeds;
use horse_derby::session::{Intent, Session};
use horse_derby::store::MemoryStore;

/// Headless Race Runner - batch races for odds and pacing checks
#[derive(Parser, Debug)]
#[command(name = "race_runner")]
#[command(about = "Play seeded races headlessly and print win statistics")]
struct Args {
    /// Number of races to play
    #[arg(long, default_value_t = 1000)]
    races: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Horse to back every race (1-6)
    #[arg(long, default_value_t = 1)]
    horse: usize,

    /// Stake per race (10, 50 or 100)
    #[arg(long, default_value_t = 10)]
    bet: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log every race result to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    races: u64,
    wins: u64,
    win_rate: f64,
    wins_by_horse: [u64; HORSE_COUNT],
    mean_ticks: f64,
    longest_race: u64,
    final_balance: u64,
    busts: u64,
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("horse_derby=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if !(1..=HORSE_COUNT).contains(&args.horse) {
        eprintln!("Horse must be between 1 and {}", HORSE_COUNT);
        std::process::exit(2);
    }
    if !BET_OPTIONS.contains(&args.bet) {
        eprintln!("Bet must be one of {:?}", BET_OPTIONS);
        std::process::exit(2);
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut session = Session::new(
        RngSpeeds::seeded(seed),
        MemoryStore::new(),
        &GameConfig::default(),
    );

    let mut wins = 0;
    let mut wins_by_horse = [0u64; HORSE_COUNT];
    let mut total_ticks = 0;
    let mut longest_race = 0;
    let mut busts = 0;

    for race in 0..args.races {
        if session.balance() < args.bet {
            if args.verbose {
                eprintln!("[race {}] bust at balance {}, resetting", race, session.balance());
            }
            busts += 1;
            session.apply(Intent::ResetBalance);
        }

        session.apply(Intent::SelectHorse(args.horse - 1));
        session.apply(Intent::SelectBet(args.bet));
        session.apply(Intent::Start);

        let settlement = loop {
            if let Some(settlement) = session.tick() {
                break settlement;
            }
        };
        debug_assert_eq!(session.mode(), Mode::Finished);

        let ticks = session.race_tick();
        total_ticks += ticks;
        longest_race = longest_race.max(ticks);
        wins_by_horse[settlement.winner.index()] += 1;
        if settlement.is_win() {
            wins += 1;
        }

        if args.verbose {
            eprintln!(
                "[race {}] {} won in {} ticks, balance {}",
                race,
                settlement.winner,
                ticks,
                session.balance()
            );
        }

        session.apply(Intent::Exit);
    }

    let result = RunSummary {
        races: args.races,
        wins,
        win_rate: ratio(wins, args.races),
        wins_by_horse,
        mean_ticks: ratio(total_ticks, args.races),
        longest_race,
        final_balance: session.balance(),
        busts,
        seed,
    };

    match args.format.as_str() {
        "text" => {
            println!("Race Summary");
            println!("============");
            println!("Races: {}", result.races);
            println!("Wins: {} ({:.1}%)", result.wins, result.win_rate * 100.0);
            for (i, count) in result.wins_by_horse.iter().enumerate() {
                println!("  Horse {}: {} wins", i + 1, count);
            }
            println!("Mean race length: {:.1} ticks", result.mean_ticks);
            println!("Longest race: {} ticks", result.longest_race);
            println!("Final balance: {}", result.final_balance);
            println!("Busts: {}", result.busts);
            println!("Seed: {}", result.seed);
        }
        other => {
            if other != "json" {
                eprintln!("Unknown format '{}', defaulting to json", other);
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn ratio(n: u64, d: u64) -> f64 {
    if d == 0 {
        0.0
    } else {
        n as f64 / d as f64
    }
}
