//! The Peril server: broadcasts pause/resume and aggregates game logs.

use std::io::Write;

use peril::{broker_url, wiring};
use peril_protocol::{PlayingState, routing};
use peril_transport::{Publish, connect};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  pause    pause the game for every client
  resume   resume the game
  help     show this help
  quit     shut the server down";

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Starting Peril server...");
    let conn = connect(&broker_url()).await?;
    let wired = wiring::wire_server(&conn).await?;
    println!("Connected. Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        match line.split_whitespace().collect::<Vec<_>>().as_slice() {
            [] => {}
            ["pause"] => {
                println!("Pausing the game...");
                broadcast(&wired.control, true).await;
            }
            ["resume"] => {
                println!("Resuming the game...");
                broadcast(&wired.control, false).await;
            }
            ["help"] => println!("{HELP}"),
            ["quit"] => {
                println!("Shutting down Peril server.");
                break;
            }
            _ => println!("Unknown command. Type 'help'."),
        }
        prompt();
    }

    Ok(())
}

async fn broadcast<P: Publish>(control: &P, is_paused: bool) {
    let state = PlayingState { is_paused };
    if let Err(error) = control
        .publish(routing::EXCHANGE_PERIL_DIRECT, routing::PAUSE_KEY, &state)
        .await
    {
        println!("pause broadcast failed: {error}");
    }
}
