use fruitslot_core::{Engine, GameCount, RoundSeeds};

fn main() {
    // Example end-to-end seeded round
    let server_seed = "example-server-seed";
    let client_seed = "example-client-seed";
    let nonce = 1u64;
    let fair = RoundSeeds::new(server_seed, client_seed, nonce);
    let engine = match Engine::standard() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("bad weight table: {e}");
            return;
        }
    };
    let outcome = engine.play_with_seeds(&fair, GameCount::TWO);
    println!(
        "server_seed_hash={} points={} multiplier={}\n{}",
        fair.commitment(),
        outcome.total_points,
        outcome.multiplier,
        outcome.board.join("\n")
    );
}
