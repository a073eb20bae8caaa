#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a seeded delve session from scripted moves.

mod config;
mod script;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use delve_rendering::{render_ascii, RenderingBackend, StatusLine, TextBackend, TileMap};
use delve_system_session::Session;

/// Plays a seeded delve session and prints the board.
#[derive(Debug, Parser)]
#[command(name = "delve", version, about)]
struct Cli {
    /// TOML file with game configuration.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Overrides the seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Moves to play, one letter per move out of N, E, S and W.
    #[arg(long, default_value = "")]
    moves: String,
    /// Prints the board after every move instead of only at the end.
    #[arg(long)]
    show_every_step: bool,
}

/// Entry point for the delve command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let cli = Cli::parse();
    let mut config = config::load(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.session.seed = seed;
    }
    let moves = script::parse(&cli.moves).context("invalid --moves")?;

    let mut session: Session<TileMap> = Session::new(config);
    let stdout = io::stdout();
    let mut backend = TextBackend::new(stdout.lock());
    if cli.show_every_step {
        present(&mut backend, &session)?;
    }

    for (index, direction) in moves.iter().enumerate() {
        let Some(outcome) = session.step(*direction) else {
            log::info!("session over; {} moves left unplayed", moves.len() - index);
            break;
        };
        log::debug!("move {}: {direction:?} -> {outcome:?}", index + 1);
        if cli.show_every_step {
            present(&mut backend, &session)?;
        }
    }

    if !cli.show_every_step {
        present(&mut backend, &session)?;
    }

    let verdict = if session.is_over() {
        "ran out of food"
    } else {
        "still standing"
    };
    println!(
        "{verdict} on level {} with {} food after {} turns",
        session.level(),
        session.resource(),
        session.turn()
    );
    Ok(())
}

fn present<B>(backend: &mut B, session: &Session<TileMap>) -> Result<()>
where
    B: RenderingBackend,
{
    let frame = render_ascii(session.board(), session.tiles(), session.player());
    backend.present(
        &frame,
        StatusLine {
            level: session.level(),
            resource: session.resource(),
            turn: session.turn(),
        },
    )
}
