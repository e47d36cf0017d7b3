mod audio;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        MouseEventKind,
    },
    execute, terminal,
};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flappy_bonus::autopilot;
use flappy_bonus::hooks::{Notifier, Sprite};
use flappy_bonus::input::Debouncer;
use flappy_bonus::leaderboard::{self, Leaderboard};
use flappy_bonus::{GameConfig, GameLoop, GameState, InputKind};

use audio::Audio;
use render::{BirdSkin, PipeSkin, PixelBuf};

/// Flappy Bird in the terminal, with bonus and hazard tokens in the gaps.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// JSON file overriding the default game configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for pipe gaps, token placement and clouds
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Play one headless round with the autopilot and log the result
    Simulate {
        #[arg(long, default_value_t = 3600)]
        frames: u32,
    },
    /// Print the stored leaderboard
    Scores {
        /// Erase every stored score first
        #[arg(long)]
        reset: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match cli.command {
        None => {
            init_file_logging();
            play(config)
        }
        Some(Command::Simulate { frames }) => {
            init_stderr_logging();
            let report = autopilot::simulate(&config, seeded_rng(config.seed), frames);
            println!(
                "score {} after {} frames ({} bonuses, {} anti-bonuses{})",
                report.score,
                report.frames,
                report.bonuses,
                report.anti_bonuses,
                if report.game_over { ", crashed" } else { "" }
            );
            Ok(())
        }
        Some(Command::Scores { reset }) => {
            init_stderr_logging();
            let mut board = Leaderboard::open_default();
            if reset {
                board.reset_scores()?;
            }
            if board.all_scores().is_empty() {
                println!("no scores yet");
            } else {
                println!("{}", board.format_scores());
            }
            Ok(())
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> rand::rngs::StdRng {
    use rand::SeedableRng;
    match seed {
        Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
        None => rand::rngs::StdRng::from_entropy(),
    }
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
}

/// The terminal belongs to the renderer while playing, so logs go to a file.
fn init_file_logging() {
    let file = leaderboard::data_dir().and_then(|dir| {
        let path = dir.join("flappy-bonus.log");
        File::create(&path).with_context(|| format!("creating {}", path.display()))
    });
    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(e) => eprintln!("logging disabled: {e:#}"),
    }
}

// ── Interactive play ────────────────────────────────────────────────────────

/// Logical canvas for a pixel buffer: fixed height, width following the
/// terminal's aspect ratio.
fn canvas_size(buf: &PixelBuf, canvas_height: f64) -> (f64, f64) {
    let aspect = buf.width() as f64 / buf.height().max(1) as f64;
    ((canvas_height * aspect).round().max(1.0), canvas_height)
}

/// Ignore presses this soon after a crash so a held key does not skip the
/// game-over screen.
const RESTART_DELAY_MS: f64 = 500.0;

fn play(mut config: GameConfig) -> Result<()> {
    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        EnableMouseCapture,
    )?;

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    let (cols, rows) = terminal::size()?;
    let buf = PixelBuf::new(cols as usize, rows as usize * 2);
    (config.canvas_width, config.canvas_height) = canvas_size(&buf, config.canvas_height);

    let result = run(&mut out, buf, &config);
    cleanup(&mut out)?;
    result
}

fn run(out: &mut io::Stdout, buf: PixelBuf, config: &GameConfig) -> Result<()> {
    let mut game = GameLoop::new(config);
    let buf = Rc::new(RefCell::new(buf));
    let mut board = Leaderboard::open_default();
    let mut debouncer = Debouncer::new();

    {
        let world = game.world_mut();
        world.bird.set_sprite(Sprite::new(BirdSkin::default()));
        if let Some(pipes) = world.pipes.as_mut() {
            pipes.set_sprite(Sprite::new(PipeSkin::default()));
        }
    }
    wire_audio(&mut game);

    let canvas = Rc::clone(&buf);
    game.set_render_callback(move |frame| render::draw_frame(&mut canvas.borrow_mut(), frame));

    // Transitions are queued by the observer and handled after each step,
    // where the host can read the score.
    let transitions = Rc::new(RefCell::new(Vec::new()));
    let queue = Rc::clone(&transitions);
    game.subscribe(move |from, to| queue.borrow_mut().push((from, to)));

    let epoch = Instant::now();
    let now_ms = || epoch.elapsed().as_secs_f64() * 1000.0;
    let frame_dur = Duration::from_millis(16);
    let mut game_over_at = 0.0;

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            let pressed = match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => true,
                    _ => false,
                },
                Event::Mouse(mouse) => matches!(mouse.kind, MouseEventKind::Down(_)),
                Event::Resize(c, r) => {
                    let mut buf = buf.borrow_mut();
                    buf.resize(c as usize, r as usize * 2);
                    let (w, h) = canvas_size(&buf, config.canvas_height);
                    drop(buf);
                    game.update_dimensions(w, h);
                    false
                }
                _ => false,
            };
            if !pressed || !debouncer.accept(now_ms()) {
                continue;
            }
            match game.state() {
                GameState::Playing => game.handle_input(InputKind::Jump),
                GameState::Start => {
                    game.reset();
                    game.start(now_ms());
                }
                GameState::GameOver if now_ms() - game_over_at >= RESTART_DELAY_MS => {
                    game.reset();
                    game.start(now_ms());
                }
                GameState::GameOver => {}
            }
        }

        if game.is_running() {
            game.tick(now_ms());
        } else {
            game.render();
        }

        for (from, to) in transitions.borrow_mut().drain(..) {
            match to {
                GameState::GameOver => {
                    game_over_at = now_ms();
                    match board.add_score(game.score()) {
                        Ok(true) => info!(score = game.score(), "new leaderboard entry"),
                        Ok(false) => {}
                        Err(e) => warn!(error = %e, "could not save score"),
                    }
                }
                GameState::Start => board.reset_current_game(),
                GameState::Playing => info!(%from, "round started"),
            }
        }

        {
            let mut buf = buf.borrow_mut();
            match game.state() {
                GameState::Start => {
                    render::draw_start_screen(&mut buf, board.best_score(), board.top_scores())
                }
                GameState::GameOver => render::draw_game_over(
                    &mut buf,
                    game.score(),
                    board.best_score(),
                    board.top_scores(),
                ),
                GameState::Playing => {}
            }
            buf.render(out)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

/// Hook the synthesized effects into the game; without a device it stays
/// silent.
fn wire_audio(game: &mut GameLoop) {
    let audio = match Audio::open() {
        Ok(audio) => Rc::new(audio),
        Err(e) => {
            warn!(error = %e, "audio unavailable, playing silently");
            return;
        }
    };

    let a = Rc::clone(&audio);
    game.world_mut()
        .bird
        .set_jump_sound(Notifier::new(move || a.play_jump()));
    let a = Rc::clone(&audio);
    game.hooks_mut().on_hit = Notifier::new(move || a.play_hit());
    game.hooks_mut().on_score = Notifier::new(move || audio.play_score());
}
