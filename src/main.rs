use anyhow::Context;
use pokemon_duel::{run, CliOptions, Command};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: pokemon-duel [--config config.json] [--save progress.json] [--catalog pokemon.json] <command>\n\
\n\
Commands:\n\
  new-game --starter <1|4|7>\n\
  play [--battles N] [--seed SEED]\n\
  status\n\
  win-rates [--battles N] [--seed SEED] [--output win_rates.csv]\n\
  moves <type>"
    );
    std::process::exit(1);
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str, what: &str) -> anyhow::Result<String> {
    args.next()
        .ok_or_else(|| anyhow::anyhow!("{flag} requires {what}"))
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut config_path = None;
    let mut save_path = PathBuf::from("progress.json");
    let mut catalog_path = None;
    let mut command_name = None;
    let mut starter = None;
    let mut battles = None;
    let mut seed = None;
    let mut output_path = PathBuf::from("win_rates.csv");
    let mut positional = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(PathBuf::from(next_value(&mut args, "--config", "a path")?));
            }
            "--save" => {
                save_path = PathBuf::from(next_value(&mut args, "--save", "a path")?);
            }
            "--catalog" => {
                catalog_path = Some(PathBuf::from(next_value(&mut args, "--catalog", "a path")?));
            }
            "--starter" => {
                let val = next_value(&mut args, "--starter", "a species id (1, 4 or 7)")?;
                starter = Some(val.parse::<u32>().with_context(|| format!("invalid --starter {val}"))?);
            }
            "--battles" => {
                let val = next_value(&mut args, "--battles", "a number")?;
                battles = Some(val.parse::<usize>().with_context(|| format!("invalid --battles {val}"))?);
            }
            "--seed" => {
                let val = next_value(&mut args, "--seed", "a number")?;
                seed = Some(val.parse::<u64>().with_context(|| format!("invalid --seed {val}"))?);
            }
            "--output" => {
                output_path = PathBuf::from(next_value(&mut args, "--output", "a path")?);
            }
            "--help" | "-h" => usage(),
            other if other.starts_with("--") => anyhow::bail!("Unknown argument {other}"),
            other if command_name.is_none() => command_name = Some(other.to_string()),
            other => positional.push(other.to_string()),
        }
    }

    let command = match command_name.as_deref() {
        Some("new-game") => Command::NewGame {
            starter: starter.ok_or_else(|| anyhow::anyhow!("new-game requires --starter <id>"))?,
        },
        Some("play") => Command::Play {
            battles: battles.unwrap_or(1),
            seed,
        },
        Some("status") => Command::Status,
        Some("win-rates") => Command::WinRates {
            battles: battles.unwrap_or(100),
            seed: seed.unwrap_or(0),
            output: output_path,
        },
        Some("moves") => Command::Moves {
            primary_type: positional
                .first()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("moves requires a type (e.g. moves fire)"))?,
        },
        Some(other) => anyhow::bail!("Unknown command {other}"),
        None => usage(),
    };

    Ok(CliOptions {
        config_path,
        save_path,
        catalog_path,
        command,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let opts = parse_args()?;
    run(opts).await
}
