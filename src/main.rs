use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use snake_arena::config::{
    DEFAULT_LEADERBOARD_LIMIT, DEFAULT_SPECTATOR_BOTS, Settings, THEME_CLASSIC,
};
use snake_arena::credentials::{AccountBook, CredentialStore};
use snake_arena::driver::{Controller, Driver, Player, TickOutcome};
use snake_arena::game::{Engine, GameState, Rules};
use snake_arena::input::{GameInput, InputHandler};
use snake_arena::leaderboard::{Leaderboard, ScoreBook};
use snake_arena::logging::{self, LogTarget};
use snake_arena::renderer::{self, Overlay};
use snake_arena::sessions::{MemorySessionDirectory, SessionDirectory};
use snake_arena::terminal_runtime::{TerminalSession, restore_terminal};
use snake_arena::ui::hud::HudInfo;
use snake_arena::{Error, Result};
use tracing::{error, info};

const FRAME_SLEEP: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(name = "snake-arena", version, about)]
struct Cli {
    /// Settings file to use instead of the platform default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed food placement for a reproducible game.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Play a game yourself (the default).
    ///
    /// Signed-in games are recorded on the leaderboard; anonymous games are not.
    Play {
        #[arg(long, requires = "password")]
        email: Option<String>,
        #[arg(long, requires = "email")]
        password: Option<String>,
    },
    /// Create an account to play under.
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Watch AI-controlled sessions.
    Spectate {
        #[arg(long, default_value_t = DEFAULT_SPECTATOR_BOTS)]
        bots: usize,
    },
    /// Print the leaderboard.
    Leaderboard {
        #[arg(long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: usize,
    },
    /// Run one AI session headless and print the final session record.
    Simulate {
        #[arg(long, default_value_t = 1_000)]
        ticks: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli
        .command
        .clone()
        .unwrap_or(Command::Play {
            email: None,
            password: None,
        });

    let target = match command {
        Command::Play { .. } | Command::Spectate { .. } => LogTarget::default_file(),
        Command::Signup { .. } | Command::Leaderboard { .. } | Command::Simulate { .. } => {
            LogTarget::Stderr
        }
    };
    if let Err(error) = logging::init(&target) {
        eprintln!("Failed to set up logging: {error}");
    }

    install_panic_hook();

    match run(&cli, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "exiting");
            eprintln!("snake-arena: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, command: Command) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };

    match command {
        Command::Play { email, password } => {
            let login = email.zip(password);
            play(&settings, cli.seed, login)
        }
        Command::Signup {
            username,
            email,
            password,
        } => signup(&settings, &username, &email, &password),
        Command::Spectate { bots } => spectate(&settings, cli.seed, bots),
        Command::Leaderboard { limit } => print_leaderboard(&settings, limit),
        Command::Simulate { ticks } => simulate(&settings, cli.seed, ticks),
    }
}

fn engine(rules: Rules, seed: Option<u64>) -> Engine {
    match seed {
        Some(seed) => Engine::with_seed(rules, seed),
        None => Engine::new(rules),
    }
}

fn play(settings: &Settings, seed: Option<u64>, login: Option<(String, String)>) -> Result<()> {
    let rules = settings.rules()?;
    let mut leaderboard = ScoreBook::open(settings.leaderboard_path())?;
    let mut sessions = MemorySessionDirectory::new();
    let mut accounts = AccountBook::open(settings.accounts_path())?;

    let token = match login {
        Some((email, password)) => Some(accounts.login(&email, &password)?.token),
        None => None,
    };
    let player = match &token {
        Some(token) => Some(Player::from(&accounts.current_user(token)?)),
        None => None,
    };
    let label = player
        .as_ref()
        .map_or_else(|| "guest".to_owned(), |player| player.username.clone());
    let mut driver = Driver::new(engine(rules, seed), Controller::Human, player);

    let tick_interval = Duration::from_millis(settings.tick_interval_ms);
    let mut terminal = TerminalSession::enter()?;
    let mut input = InputHandler::new();
    let mut last_tick = Instant::now();
    info!(player = %label, "human game opened");

    loop {
        let hud = HudInfo {
            best_score: leaderboard.best_score(),
            label: label.clone(),
            spectating: false,
            theme: &THEME_CLASSIC,
        };
        let overlay = Overlay::for_state(driver.is_playing(), driver.state(), driver.controller());
        terminal.draw(|frame| renderer::render(frame, driver.state(), rules.grid, overlay, &hud))?;

        if let Some(game_input) = input.poll_input()? {
            match game_input {
                GameInput::Quit => break,
                GameInput::Confirm if !driver.is_playing() => {
                    driver.start(&mut sessions);
                    last_tick = Instant::now();
                }
                GameInput::Confirm if driver.state().is_game_over() => {
                    driver.reset(&mut sessions)?;
                    driver.start(&mut sessions);
                    last_tick = Instant::now();
                }
                other => driver.handle_input(other),
            }
        }

        if last_tick.elapsed() >= tick_interval {
            driver.advance(&mut sessions, &mut leaderboard)?;
            last_tick = Instant::now();
        }

        thread::sleep(FRAME_SLEEP);
    }

    if let Some(token) = &token {
        accounts.logout(token);
    }
    driver.reset(&mut sessions)
}

fn signup(settings: &Settings, username: &str, email: &str, password: &str) -> Result<()> {
    let mut accounts = AccountBook::open(settings.accounts_path())?;
    let auth = accounts.signup(username, email, password)?;
    accounts.logout(&auth.token);

    println!("Created account {} <{}>", auth.user.username, auth.user.email);
    Ok(())
}

fn spectate(settings: &Settings, seed: Option<u64>, bots: usize) -> Result<()> {
    let rules = settings.rules()?;
    let mut sessions = MemorySessionDirectory::new();
    // Spectated games never reach the persisted board.
    let mut leaderboard = ScoreBook::in_memory();

    let initial = GameState::initial(rules.grid);
    for index in 1..=bots.max(1) {
        let name = format!("Bot-{index}");
        sessions.create_session(&name.to_lowercase(), &name, &initial);
    }

    let mut drivers = sessions
        .list_active()
        .iter()
        .zip(0u64..)
        .map(|(session, offset)| {
            let seed = seed.map(|seed| seed.wrapping_add(offset));
            Driver::spectate(engine(rules, seed), session)
        })
        .collect::<Result<Vec<_>>>()?;

    let tick_interval = Duration::from_millis(settings.spectator_tick_interval_ms);
    let mut terminal = TerminalSession::enter()?;
    let mut input = InputHandler::new();
    let mut last_tick = Instant::now();
    let mut watched = 0;
    info!(bots = drivers.len(), "spectator view opened");

    loop {
        let driver = &drivers[watched];
        let username = driver
            .player()
            .map_or("bot", |player| player.username.as_str());
        let hud = HudInfo {
            best_score: drivers
                .iter()
                .map(|driver| driver.state().score)
                .max()
                .unwrap_or(0),
            label: format!("{username} {}/{}", watched + 1, drivers.len()),
            spectating: true,
            theme: &THEME_CLASSIC,
        };
        let overlay = Overlay::for_state(driver.is_playing(), driver.state(), driver.controller());
        terminal.draw(|frame| renderer::render(frame, driver.state(), rules.grid, overlay, &hud))?;

        if let Some(game_input) = input.poll_input()? {
            match game_input {
                GameInput::Quit => break,
                GameInput::Cycle => watched = (watched + 1) % drivers.len(),
                GameInput::Confirm if drivers[watched].state().is_game_over() => {
                    drivers[watched].start(&mut sessions);
                }
                other => drivers[watched].handle_input(other),
            }
        }

        if last_tick.elapsed() >= tick_interval {
            for driver in &mut drivers {
                driver.advance(&mut sessions, &mut leaderboard)?;
            }
            last_tick = Instant::now();
        }

        thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn print_leaderboard(settings: &Settings, limit: usize) -> Result<()> {
    let leaderboard = ScoreBook::open(settings.leaderboard_path())?;
    let entries = leaderboard.top(limit);

    if entries.is_empty() {
        println!("No scores yet.");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{:>3}. {:<16} {:>6}  {}",
            entry.rank,
            entry.username,
            entry.score,
            entry.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

fn simulate(settings: &Settings, seed: Option<u64>, ticks: u64) -> Result<()> {
    let rules = settings.rules()?;
    let mut sessions = MemorySessionDirectory::new();
    let mut leaderboard = ScoreBook::in_memory();

    let initial = GameState::initial(rules.grid);
    let session = sessions.create_session("simulator", "Simulator", &initial);
    let mut driver = Driver::spectate(engine(rules, seed), &session)?;

    for tick in 1..=ticks {
        let outcome = driver.advance(&mut sessions, &mut leaderboard)?;
        if let TickOutcome::Finished { score, .. } = outcome {
            info!(tick, score, "simulated game ended");
            break;
        }
    }

    let record = sessions.get_session(session.id)?;
    let json = serde_json::to_string_pretty(&record).map_err(Error::Encode)?;
    println!("{json}");
    Ok(())
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        default_hook(panic_info);
    }));
}
