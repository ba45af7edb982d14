use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use morse::{encoding_for_label, CodeTable, Session};
use std::io;

#[derive(Parser, Debug)]
#[clap(name = "morse", version, about = "Interactive Morse code converter")]
struct Cli {
    #[clap(long, short, default_value = "morse_code", help = "Path of the code table")]
    table: String,

    #[clap(long, short, default_value = "utf-8", help = "Text encoding of the code table")]
    encoding: String,

    #[clap(long, short, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Warn);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let encoding = encoding_for_label(&cli.encoding)?;
    let table = CodeTable::load_with_encoding(&cli.table, encoding)
        .with_context(|| format!("cannot start without code table '{}'", cli.table))?;

    let stdin = io::stdin();
    let summary = Session::new(&table, stdin.lock(), io::stdout().lock()).run()?;
    info!("Session finished after {} conversions", summary.conversions);

    Ok(())
}
