/// Entry point: command-line dispatch and the frame pump.

mod app;
mod config;
mod domain;
mod error;
mod logger;
mod sim;
mod store;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use app::App;
use config::{ConfigSource, GameConfig};
use error::LeaderboardError;
use sim::engine::Engine;
use sim::event::GameEvent;
use store::kv::{FileStore, KeyValueStore, MemoryStore};
use store::leaderboard::{parse_score, FileLeaderboard, Leaderboard};
use store::profile::Profile;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const PREFS_FILE: &str = "prefs.json";
const LEADERBOARD_FILE: &str = "leaderboard.json";

/// Terminal Snake with a persistent high score and leaderboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for preferences, scores and the log file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play the game (default)
    Play {
        /// Fixed RNG seed for reproducible food placement
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the leaderboard
    Scores {
        /// Number of entries to show
        #[arg(long)]
        top: Option<usize>,
    },

    /// Submit a score to the leaderboard
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        score: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (mut config, source) = GameConfig::load(cli.config.as_deref());
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let command = cli.command.unwrap_or(Commands::Play { seed: None });
    let log_file = matches!(command, Commands::Play { .. }).then(|| logger::log_path(&config.data_dir));
    if let Err(e) = logger::init(&config.log_level, log_file.as_deref()) {
        eprintln!("Log file unavailable ({e}); logging to stderr");
    }

    match &source {
        ConfigSource::File(path) => info!("config loaded from {}", path.display()),
        ConfigSource::Defaults => info!("no config.toml found, using defaults"),
        ConfigSource::Invalid { path, error } => warn!("ignoring {}: {error}", path.display()),
    }

    match command {
        Commands::Play { seed } => play(&config, seed),
        Commands::Scores { top } => print_scores(&config, top.unwrap_or(config.leaderboard_size)),
        Commands::Submit { name, score } => submit(&config, &name, &score),
    }
}

// ── play ──

fn open_store(config: &GameConfig) -> Box<dyn KeyValueStore> {
    match FileStore::open(config.data_dir.join(PREFS_FILE)) {
        Ok(store) => {
            info!("preferences at {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            warn!("preferences unavailable ({e}); this session will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}

fn play(config: &GameConfig, seed: Option<u64>) -> ExitCode {
    let profile = Profile::load(open_store(config));
    let rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let (cols, _) = crossterm::terminal::size().unwrap_or((80, 24));
    let engine = Engine::new(config, profile, rng, cols);
    let leaderboard = FileLeaderboard::new(config.data_dir.join(LEADERBOARD_FILE));
    let mut app = App::new(engine, Box::new(leaderboard), config.leaderboard_size);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut app, &mut renderer, sound.as_ref(), config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
        return ExitCode::FAILURE;
    }

    println!();
    println!("Thanks for playing Snake Arcade!");
    println!("High Score: {}", app.engine.high_score());
    ExitCode::SUCCESS
}

fn game_loop(
    app: &mut App,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let frame = Duration::from_millis(config.engine.frame_ms.max(1));

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || gp.quit_pressed() {
            break;
        }

        let now = Instant::now();
        if let Some((cols, _)) = kb.take_resize() {
            app.engine.set_viewport_cols(cols);
        }
        for code in kb.pressed_in_order() {
            app.handle_key(code, now);
        }
        for &dir in kb.gestures() {
            app.turn(dir, now);
        }
        if let Some(dir) = gp.direction_pressed() {
            app.turn(dir, now);
        }
        if gp.toggle_pressed() {
            app.toggle(now);
        }
        if app.quit {
            break;
        }

        let events = app.frame(now);
        if app.engine.settings().sound_enabled {
            play_cues(sound, &events);
        }

        renderer.render(app)?;
        std::thread::sleep(frame);
    }

    Ok(())
}

fn play_cues(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::FoodEaten { .. } => sfx.play_eat(),
            GameEvent::Crashed { .. } => sfx.play_crash(),
            GameEvent::NewHighScore { .. } => sfx.play_record(),
            _ => {}
        }
    }
}

// ── scores / submit ──

fn print_scores(config: &GameConfig, top: usize) -> ExitCode {
    let board = FileLeaderboard::new(config.data_dir.join(LEADERBOARD_FILE));
    let entries = match board.list_top(top) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if entries.is_empty() {
        println!("No scores yet.");
    }
    for (i, e) in entries.iter().enumerate() {
        println!(
            "{:>3}. {:<20} {:>6}  {}",
            i + 1,
            e.player_name,
            e.score,
            e.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
    ExitCode::SUCCESS
}

fn submit(config: &GameConfig, name: &str, raw_score: &str) -> ExitCode {
    let mut board = FileLeaderboard::new(config.data_dir.join(LEADERBOARD_FILE));
    match parse_score(raw_score).and_then(|score| board.submit(name, score)) {
        Ok(entry) => {
            info!("submitted {} points for {}", entry.score, entry.player_name);
            println!("Recorded {} points for {} (#{})", entry.score, entry.player_name, entry.id);
            ExitCode::SUCCESS
        }
        Err(e @ LeaderboardError::Validation(_)) => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
