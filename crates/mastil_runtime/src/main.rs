//! Mastil - terminal host
//!
//! Usage: `mastil_runtime [config.ron]`, then type `help`.

use std::path::Path;

use mastil_core::game::Game;
use mastil_runtime::audio::TracingAudio;
use mastil_runtime::console::{self, ConsoleInput};
use mastil_runtime::session::SessionHandle;
use mastil_runtime::RuntimeConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RuntimeConfig::load(Path::new(&path))?,
        None => RuntimeConfig::default(),
    };
    let layout = config.load_layout()?;
    let seed = config.seed_or_now();
    tracing::info!(seed, buildings = layout.buildings.len(), "starting Mastil");

    let game = Game::new(config.game.clone(), layout, seed)?;
    let handle = SessionHandle::spawn(game, Box::new(TracingAudio));

    println!("{}", console::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match console::parse(&line) {
            Ok(ConsoleInput::Setup { name, element }) => {
                if let Err(err) = handle.setup(&name, element).await {
                    println!("{err}");
                }
            }
            Ok(ConsoleInput::Command(command)) => handle.send(command.into()).await?,
            Ok(ConsoleInput::Status) => print!("{}", console::render(&handle.snapshot())),
            Ok(ConsoleInput::Help) => println!("{}", console::HELP),
            Ok(ConsoleInput::Quit) => break,
            Err(console::ParseError::Empty) => {}
            Err(err) => println!("{err}"),
        }
    }

    handle.shutdown().await?;
    Ok(())
}
