//! # twenty48
//!
//! Terminal front-end for the 2048 engine: interactive play with a local
//! leaderboard and best-score tracking, or headless simulations with
//! configurable policies.

mod best_score;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::warn;
use twenty48_core::{Direction, GameSession};
use twenty48_scores::{
    EnvIdentity, FixedIdentity, IdentityProvider, JsonFileStore, ScoreReporter, ScoreStore,
    DEFAULT_TOP_LIMIT,
};

#[derive(Parser, Debug)]
#[command(name = "twenty48")]
#[command(author, version, about = "Play 2048 in the terminal or run simulations")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of episodes to run in headless mode (omit for interactive play)
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Maximum moves per episode in headless mode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "random")]
    policy: Policy,

    /// Show the board after each move in headless mode
    #[arg(long)]
    verbose: bool,

    /// Display name for leaderboard attribution (defaults to $USER)
    #[arg(short, long)]
    name: Option<String>,

    /// Directory for the leaderboard and best-score files
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Skip score reporting and the leaderboard entirely
    #[arg(long)]
    offline: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random legal moves
    Random,
    /// Cycle through directions: Left, Down, Right, Up
    Cycle,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Some(episodes) = args.episodes {
        run_headless(&args, episodes);
        Ok(())
    } else {
        run_interactive(&args)
    }
}

enum InputAction {
    Move(Direction),
    Restart,
    Quit,
    None,
}

/// Interactive mode: raw-mode keyboard input, full-screen ANSI redraw.
fn run_interactive(args: &Args) -> Result<()> {
    let data_dir = best_score::data_dir(args.data_dir.as_deref());
    let mut best = best_score::load(&data_dir);

    // The leaderboard store is shared between the reporter worker (writes)
    // and the game-over screen (reads).
    let store: Option<Arc<dyn ScoreStore>> = if args.offline {
        None
    } else {
        Some(Arc::new(JsonFileStore::new(data_dir.join("leaderboard.json"))))
    };

    let mut session = match &store {
        Some(store) => {
            let identity: Box<dyn IdentityProvider> = match &args.name {
                Some(name) => Box::new(FixedIdentity(name.clone())),
                None => Box::new(EnvIdentity),
            };
            let reporter = ScoreReporter::spawn(store.clone(), identity);
            GameSession::with_score_sink(args.seed, Box::new(reporter))
        }
        None => GameSession::new(args.seed),
    };

    enable_raw_mode();
    draw(&session, best, None);

    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];

    loop {
        let bytes_read = stdin.read(&mut buffer).unwrap_or(0);
        if bytes_read == 0 {
            continue;
        }

        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(dir) => {
                let was_won = session.is_won();
                let outcome = session.apply_move(dir);
                if !outcome.moved {
                    continue;
                }
                if session.score() > best {
                    best = session.score();
                }

                let mut banner = None;
                if outcome.won && !was_won {
                    banner = Some("*** 2048! You win — keep going if you like ***");
                }
                draw(&session, best, banner);

                if outcome.over {
                    if let Err(err) = best_score::save(&data_dir, best) {
                        warn!(error = %err, "could not persist best score");
                    }
                    println!("\n  *** GAME OVER ***");
                    println!("  Final Score: {}", session.score());
                    println!("  Max Tile: {}", session.grid().max_tile());
                    if let Some(store) = &store {
                        print_leaderboard(store.as_ref());
                    }
                    println!("\n  Press R to restart or Q to quit");
                }
            }
            InputAction::Restart => {
                session.new_game();
                draw(&session, best, None);
            }
            InputAction::Quit => {
                disable_raw_mode();
                if let Err(err) = best_score::save(&data_dir, best) {
                    warn!(error = %err, "could not persist best score");
                }
                println!("\nGoodbye!");
                break;
            }
            InputAction::None => {}
        }
    }

    Ok(())
}

fn draw(session: &GameSession, best: u32, banner: Option<&str>) {
    println!("\x1b[2J\x1b[H"); // Clear screen
    println!("=== 2048 ===");
    println!("Controls: WASD or Arrow Keys | Q to quit | R to restart\n");
    println!("Score: {}   Best: {}", session.score(), best);
    print!("{}", session.grid());
    if let Some(text) = banner {
        println!("\n  {}", text);
    }
    let _ = io::stdout().flush();
}

/// Render the top scores at game over.
///
/// Submission is fire-and-forget through the reporter queue, so a score
/// enqueued on this very move may not be visible yet; it appears once the
/// worker has drained it (at the latest, on the next game-over screen).
/// Fetch failures degrade to an empty listing; gameplay is unaffected.
fn print_leaderboard(store: &dyn ScoreStore) {
    println!("\n  --- Leaderboard ---");
    match store.top(DEFAULT_TOP_LIMIT) {
        Ok(entries) if entries.is_empty() => println!("  No scores yet. Be the first!"),
        Ok(entries) => {
            for (rank, entry) in entries.iter().enumerate() {
                println!("  #{:<2} {:<16} {}", rank + 1, entry.username, entry.score);
            }
        }
        Err(err) => {
            warn!(error = %err, "leaderboard fetch failed");
            println!("  Leaderboard unavailable.");
        }
    }
}

/// Headless simulation mode.
fn run_headless(args: &Args, episodes: u32) {
    if episodes == 0 {
        // No data to aggregate; bail before the stats math divides by it.
        println!("=== Simulation Results ===");
        println!("episodes=0");
        return;
    }

    let mut total_score: u64 = 0;
    let mut max_tile_overall: u32 = 0;
    let mut wins: u32 = 0;
    let mut scores: Vec<u32> = Vec::with_capacity(episodes as usize);

    // Separate RNG for action selection so the policy does not perturb the
    // per-episode spawn sequence.
    let mut action_rng = SmallRng::seed_from_u64(args.seed.wrapping_add(1000));

    for episode in 0..episodes {
        let episode_seed = args.seed.wrapping_add(episode as u64);
        let mut session = GameSession::new(episode_seed);
        let mut steps = 0;
        let mut cycle = 0;

        while !session.is_over() && (args.max_steps == 0 || steps < args.max_steps) {
            let dir = match args.policy {
                Policy::Random => select_random_move(&session, &mut action_rng),
                Policy::Cycle => select_cycle_move(&session, &mut cycle),
            };
            let Some(dir) = dir else { break };

            session.apply_move(dir);
            steps += 1;

            if args.verbose {
                println!("Episode {} Step {}: {:?}", episode + 1, steps, dir);
                print!("{}", session.grid());
            }
        }

        let score = session.score();
        let max_tile = session.grid().max_tile();
        scores.push(score);
        total_score += score as u64;
        max_tile_overall = max_tile_overall.max(max_tile);
        if session.is_won() {
            wins += 1;
        }

        if args.verbose {
            println!(
                "Episode {}: Score={}, MaxTile={}, Steps={}, Won={}",
                episode + 1,
                score,
                max_tile,
                steps,
                session.is_won()
            );
        }
    }

    let avg_score = total_score as f64 / episodes as f64;
    scores.sort();
    let median_score = if episodes % 2 == 0 {
        (scores[(episodes / 2 - 1) as usize] + scores[(episodes / 2) as usize]) as f64 / 2.0
    } else {
        scores[(episodes / 2) as usize] as f64
    };

    println!("=== Simulation Results ===");
    println!("episodes={}", episodes);
    println!("policy={:?}", args.policy);
    println!("seed={}", args.seed);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", scores.first().unwrap_or(&0));
    println!("max_score={}", scores.last().unwrap_or(&0));
    println!("wins={}", wins);
    println!("max_tile_overall={}", max_tile_overall);
}

/// Pick a uniformly random direction among those that would move.
fn select_random_move(session: &GameSession, rng: &mut SmallRng) -> Option<Direction> {
    let legal = session.legal_moves();
    let moves: Vec<Direction> = Direction::ALL
        .into_iter()
        .zip(legal)
        .filter(|&(_, ok)| ok)
        .map(|(dir, _)| dir)
        .collect();
    if moves.is_empty() {
        None
    } else {
        Some(moves[rng.gen_range(0..moves.len())])
    }
}

/// Cycle Left, Down, Right, Up, skipping directions that would not move.
fn select_cycle_move(session: &GameSession, cycle: &mut usize) -> Option<Direction> {
    let order = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];
    let legal = session.legal_moves();
    for _ in 0..4 {
        let dir = order[*cycle % 4];
        *cycle += 1;
        let index = Direction::ALL.iter().position(|&d| d == dir).unwrap_or(0);
        if legal[index] {
            return Some(dir);
        }
    }
    None
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        // Control keys: q, Q, Ctrl+C, Esc
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit,
        [b'r'] | [b'R'] => InputAction::Restart,

        _ => InputAction::None,
    }
}

// Platform-specific terminal raw mode handling
#[cfg(unix)]
fn enable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag &= !(libc::ICANON | libc::ECHO);
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(unix)]
fn disable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag |= libc::ICANON | libc::ECHO;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(not(unix))]
fn enable_raw_mode() {
    // Without raw mode, interactive play needs Enter after each key.
}

#[cfg(not(unix))]
fn disable_raw_mode() {}
