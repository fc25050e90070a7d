//! The Peril client: one player's process.
//!
//! Everything interesting happens in the library crates — this binary
//! is a thin shell that wires the subscriptions up and turns operator
//! input into game commands and publications.

use std::io::Write;

use chrono::Utc;
use peril::{broker_url, wiring};
use peril_game::{WorldMap, spam_line, spawn_game};
use peril_protocol::{GameLog, Username, routing};
use peril_transport::{Publish, connect};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  spawn <territory> <units>   station fresh units, claiming the territory
  move <from> <to> <units>    move units to an adjacent territory
  status                      show your territories and units
  spam <n>                    publish n nonsense game logs
  help                        show this help
  quit                        leave the game";

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let username = std::env::args()
        .nth(1)
        .map(Username)
        .ok_or("usage: peril-client <username>")?;

    println!("Starting Peril client as {username}...");
    let conn = connect(&broker_url()).await?;
    let game = spawn_game(username.clone(), WorldMap::standard());
    let wired = wiring::wire_client(&conn, &username, game.clone()).await?;
    println!("Connected. Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["spawn", territory, units] => match units.parse::<u32>() {
                Ok(n) => {
                    if let Err(error) = game.spawn(*territory, n).await {
                        println!("{error}");
                    }
                }
                Err(_) => println!("unit count must be a number"),
            },
            ["move", from, to, units] => match units.parse::<u32>() {
                Ok(n) => match game.command_move(*from, *to, n).await {
                    Ok(mv) => {
                        let key = routing::scoped(
                            routing::ARMY_MOVES_PREFIX,
                            &username,
                        );
                        match wired
                            .moves
                            .publish(routing::EXCHANGE_PERIL_TOPIC, &key, &mv)
                            .await
                        {
                            Ok(()) => println!("Move published."),
                            Err(error) => {
                                println!("move publish failed: {error}");
                            }
                        }
                    }
                    Err(error) => println!("{error}"),
                },
                Err(_) => println!("unit count must be a number"),
            },
            ["status"] => println!("{}", game.status().await?),
            ["spam", count] => match count.parse::<u32>() {
                Ok(n) => {
                    if game.is_paused().await? {
                        println!("the game is paused");
                    } else {
                        spam(&wired.logs, &username, n).await;
                    }
                }
                Err(_) => println!("spam count must be a number"),
            },
            ["help"] => println!("{HELP}"),
            ["quit"] => {
                println!("Closing Peril client.");
                break;
            }
            _ => println!("Unknown command. Type 'help'."),
        }
        prompt();
    }

    Ok(())
}

async fn spam<P: Publish>(logs: &P, username: &Username, count: u32) {
    let key = routing::scoped(routing::GAME_LOGS_PREFIX, username);
    for _ in 0..count {
        let entry = GameLog {
            username: username.clone(),
            message: spam_line().to_string(),
            current_time: Utc::now(),
        };
        if let Err(error) = logs
            .publish(routing::EXCHANGE_PERIL_TOPIC, &key, &entry)
            .await
        {
            println!("spam publish failed: {error}");
            break;
        }
    }
}
