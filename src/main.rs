use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use tokio::sync::Mutex;

use warships::{
    init_logging, Client, ClientConfig, ConsoleDisplay, ConsoleInput, Coord, CoordSource,
    EndReason, GameRequest, Interrupts, LocalServer,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Play against the bot running inside this process.
    Bot {
        #[arg(long, default_value = "")]
        nick: String,
        #[arg(long, default_value = "")]
        desc: String,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, help = "Place ships by hand instead of letting the server pick")]
        place: bool,
        #[arg(long, help = "JSON file with client timings")]
        config: Option<PathBuf>,
        #[arg(long, help = "Status poll interval in milliseconds")]
        poll_ms: Option<u64>,
        #[arg(long, default_value_t = 60, help = "Seconds per turn before forfeiting")]
        turn_secs: u64,
        #[arg(long, help = "Log debug output")]
        verbose: bool,
    },
}

/// Stdin shared between ship placement, the round and the replay prompt.
/// A round's listener holds the lock only while it waits for a line.
#[derive(Clone)]
struct SharedInput(Arc<Mutex<ConsoleInput>>);

#[async_trait::async_trait]
impl CoordSource for SharedInput {
    async fn next_coord(&mut self) -> Option<Coord> {
        self.0.lock().await.next_coord().await
    }
}

impl SharedInput {
    async fn confirm(&self, question: &str) -> bool {
        println!("{} [y/N]", question);
        let line = self.0.lock().await.read_line().await;
        matches!(line.as_deref().map(str::trim), Some("y" | "Y" | "yes"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Bot {
            nick,
            desc,
            seed,
            place,
            config,
            poll_ms,
            turn_secs,
            verbose,
        } => {
            init_logging(verbose.then_some(LevelFilter::Debug));

            let mut client_config = match config {
                Some(path) => ClientConfig::load(path)?,
                None => ClientConfig::default(),
            };
            if let Some(ms) = poll_ms {
                client_config.poll_interval_ms = ms;
            }
            client_config.validate()?;

            let server = match seed {
                Some(s) => {
                    println!("Using fixed seed: {} (game will be reproducible)", s);
                    LocalServer::new(s)
                }
                None => LocalServer::from_entropy(),
            }
            .with_turn_limit(Duration::from_secs(turn_secs));

            let display = Arc::new(ConsoleDisplay::new());
            let input = SharedInput(Arc::new(Mutex::new(
                ConsoleInput::new().with_display(display.clone()),
            )));
            let client = Client::new(server, display, client_config);
            let mut interrupts = Interrupts::listen();
            let request = GameRequest {
                nick,
                description: desc,
                target_nick: String::new(),
                vs_bot: true,
            };

            loop {
                if place {
                    println!("Enter ship coordinates, e.g. A1 A2 A3");
                }
                let mut placement = input.clone();
                let placement: Option<&mut dyn CoordSource> = if place {
                    Some(&mut placement as &mut dyn CoordSource)
                } else {
                    None
                };
                tokio::select! {
                    res = client.setup(&request, placement) => {
                        res?;
                    }
                    _ = interrupts.recv() => {
                        println!("Interrupted.");
                        return Ok(());
                    }
                };
                println!("Fire by typing a coordinate such as C5. Ctrl-C abandons the game.");

                let round = client.launch(input.clone());
                tokio::select! {
                    _ = round.cancelled() => {}
                    _ = interrupts.recv() => {
                        println!("Abandoning game...");
                        if let Err(e) = round.abort().await {
                            eprintln!("Abandon request failed: {}", e);
                        }
                    }
                }
                let summary = round.join().await;
                match summary.reason {
                    EndReason::RemoteEnded => {
                        println!("Game over: {}", summary.last_game_status)
                    }
                    EndReason::Aborted => println!("Game abandoned."),
                    EndReason::Cancelled => println!("Game stopped."),
                }

                let again = tokio::select! {
                    again = input.confirm("Play again?") => again,
                    _ = interrupts.recv() => false,
                };
                if !again {
                    break;
                }
            }
        }
    }
    Ok(())
}
