use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fruitslot_core::{
    BoardLayout, Engine, GameCount, GameOutcome, GlyphStyle, Multiplier, Paytable,
    RoundSeeds,
};
use fruitslot_shared::{
    cutoff_hint, headline, stats_table, FairnessProof, OutcomeReport, PlayRequest,
};

#[derive(Parser)]
#[command(name = "fruitslot", about = "Weighted fruit slot machine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// JSON file with three {"lose", "double"} threshold pairs
    #[arg(long, global = true, env = "FRUITSLOT_PAYTABLE")]
    paytable: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = Glyphs::Emoji)]
    glyphs: Glyphs,
    /// Printed before every slot and at the end of each line
    #[arg(long, global = true, default_value = " | ")]
    delimiter: String,
    /// Printed between the symbols of one slot
    #[arg(long, global = true, default_value = " ")]
    separator: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Glyphs {
    Emoji,
    Shortcode,
}

impl From<Glyphs> for GlyphStyle {
    fn from(g: Glyphs) -> Self {
        match g {
            Glyphs::Emoji => GlyphStyle::Emoji,
            Glyphs::Shortcode => GlyphStyle::Shortcode,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play one round
    Play {
        /// Your bet
        #[arg(long, allow_negative_numbers = true)]
        bet: Option<i64>,
        /// Number of games (1..=3): board lines and bet multiplier
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        games: i64,
        /// Draw from HMAC(server_seed, client_seed:nonce) instead of OS
        /// randomness. Requires --nonce.
        #[arg(long, requires = "nonce")]
        server_seed: Option<String>,
        #[arg(long, env = "FRUITSLOT_CLIENT_SEED", default_value = "player")]
        client_seed: String,
        #[arg(long)]
        nonce: Option<u64>,
        /// Print the round as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a seeded round from revealed seeds
    Verify {
        #[arg(long, env = "FRUITSLOT_SERVER_SEED")]
        server_seed: String,
        #[arg(long, env = "FRUITSLOT_CLIENT_SEED")]
        client_seed: String,
        #[arg(long)]
        nonce: u64,
        #[arg(long, default_value_t = 1)]
        games: i64,
        /// Server seed hash published before the round
        #[arg(long)]
        expected_hash: Option<String>,
    },
    /// Play many rounds and report the payout distribution
    Simulate {
        #[arg(long, default_value_t = 10_000)]
        rounds: u64,
        #[arg(long, default_value_t = 1)]
        games: i64,
        /// Fixed RNG seed for repeatable runs
        #[arg(long)]
        seed: Option<u64>,
        /// Export every round to CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show symbol weights, odds, points and thresholds
    Odds,
}

fn load_paytable(path: Option<&Path>) -> anyhow::Result<Paytable> {
    let Some(path) = path else {
        return Ok(Paytable::standard());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading paytable {}", path.display()))?;
    let table: Paytable = serde_json::from_str(&raw)
        .with_context(|| format!("parsing paytable {}", path.display()))?;
    Ok(table)
}

fn build_engine(cli: &Cli) -> anyhow::Result<Engine> {
    let layout = BoardLayout {
        separator: cli.separator.clone(),
        delimiter: cli.delimiter.clone(),
        glyphs: cli.glyphs.into(),
    };
    let engine = Engine::standard()?
        .with_layout(layout)
        .with_paytable(load_paytable(cli.paytable.as_deref())?);
    Ok(engine)
}

fn print_round(engine: &Engine, report: &OutcomeReport, outcome: &GameOutcome) {
    println!("{}", headline(outcome, &report.settlement));
    println!("{}", outcome.board.join("\n"));
    println!("{}", cutoff_hint(&outcome.thresholds));
    println!("You got: {}", outcome.total_points);
    print!("{}", stats_table(outcome, &engine.table));
    if let Some(proof) = &report.fairness {
        println!(
            "server_seed_hash={} client_seed={} nonce={}",
            proof.server_seed_hash, proof.client_seed, proof.nonce
        );
    }
}

#[derive(Debug, Default)]
struct Simulation {
    rounds: u64,
    lost: u64,
    even: u64,
    doubled: u64,
    staked: u64,
    returned: u64,
}

impl Simulation {
    fn record(&mut self, outcome: &GameOutcome) {
        let games = u64::from(outcome.games.get());
        self.rounds += 1;
        self.staked += games;
        self.returned += u64::from(outcome.multiplier.factor()) * games;
        match outcome.multiplier {
            Multiplier::Lose => self.lost += 1,
            Multiplier::Even => self.even += 1,
            Multiplier::Double => self.doubled += 1,
        }
    }

    fn rtp(&self) -> f64 {
        if self.staked == 0 {
            return 0.0;
        }
        self.returned as f64 / self.staked as f64
    }

    fn share(&self, n: u64) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        n as f64 * 100.0 / self.rounds as f64
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let engine = build_engine(&cli)?;

    match cli.command {
        Commands::Play {
            bet,
            games,
            server_seed,
            client_seed,
            nonce,
            json,
        } => {
            let play = PlayRequest::new(bet, games).validate()?;
            let (outcome, fairness) = match server_seed {
                Some(server_seed) => {
                    let nonce = nonce.unwrap_or_default();
                    let fair = RoundSeeds::new(server_seed, client_seed, nonce);
                    let proof = FairnessProof {
                        server_seed_hash: fair.commitment(),
                        client_seed: fair.client_seed.clone(),
                        nonce,
                    };
                    (engine.play_with_seeds(&fair, play.games), Some(proof))
                }
                None => (engine.play_round(play.games, &mut rand::thread_rng()), None),
            };
            let report = OutcomeReport::new(play, &outcome, fairness)?;
            info!(
                bet = play.bet,
                games = play.games.get(),
                points = outcome.total_points,
                multiplier = %outcome.multiplier,
                "round played"
            );
            if json {
                println!("{}", report.to_json()?);
            } else {
                print_round(&engine, &report, &outcome);
            }
        }
        Commands::Verify {
            server_seed,
            client_seed,
            nonce,
            games,
            expected_hash,
        } => {
            let games = GameCount::new(games)?;
            let fair = RoundSeeds::new(server_seed, client_seed, nonce);
            let hash = fair.commitment();
            if let Some(expected) = expected_hash {
                if !expected.eq_ignore_ascii_case(&hash) {
                    bail!("server seed hash mismatch: expected {expected}, got {hash}");
                }
                info!("server seed matches published hash");
            }
            let outcome = engine.play_with_seeds(&fair, games);
            println!("server_seed_hash={hash} nonce={nonce}");
            println!("{}", outcome.board.join("\n"));
            println!(
                "points={} multiplier={} (double <= {}, lose >= {})",
                outcome.total_points,
                outcome.multiplier,
                outcome.thresholds.double,
                outcome.thresholds.lose
            );
        }
        Commands::Simulate {
            rounds,
            games,
            seed,
            csv,
        } => {
            let games = GameCount::new(games)?;
            let mut rng = match seed {
                Some(seed) => ChaCha20Rng::seed_from_u64(seed),
                None => ChaCha20Rng::from_entropy(),
            };
            let mut writer = match &csv {
                Some(path) => Some(
                    csv::Writer::from_path(path)
                        .with_context(|| format!("creating {}", path.display()))?,
                ),
                None => None,
            };
            if let Some(wtr) = writer.as_mut() {
                wtr.write_record(["round", "games", "total_points", "multiplier", "board"])?;
            }
            let mut sim = Simulation::default();
            for n in 0..rounds {
                let outcome = engine.play_round(games, &mut rng);
                sim.record(&outcome);
                if let Some(wtr) = writer.as_mut() {
                    wtr.write_record(&[
                        n.to_string(),
                        games.to_string(),
                        outcome.total_points.to_string(),
                        outcome.multiplier.factor().to_string(),
                        outcome.board.join("\n"),
                    ])?;
                }
            }
            if let Some(mut wtr) = writer {
                wtr.flush()?;
            }
            println!("rounds={} games={}", sim.rounds, games);
            println!("x0 {:>8} ({:.2}%)", sim.lost, sim.share(sim.lost));
            println!("x1 {:>8} ({:.2}%)", sim.even, sim.share(sim.even));
            println!("x2 {:>8} ({:.2}%)", sim.doubled, sim.share(sim.doubled));
            println!("rtp={:.4}", sim.rtp());
            if let Some(path) = csv {
                info!("exported {} rounds to {}", sim.rounds, path.display());
            }
        }
        Commands::Odds => {
            let table = &engine.table;
            println!("Symbol\t\tWeight\tChance\tPoints");
            for symbol in table.all_symbols_ordered() {
                println!(
                    "{} {:<10}\t{}\t{:.2}%\t{}",
                    symbol.emoji(),
                    symbol.name(),
                    table.weight_of(symbol),
                    table.probability(symbol) * 100.0,
                    table.points_of(symbol)
                );
            }
            for games in GameCount::all() {
                let t = engine.paytable.thresholds(games);
                println!("games={games}: x2 at <= {}, lose at >= {}", t.double, t.lose);
            }
        }
    }

    Ok(())
}
