/*!
A CLI for walking and composing CBOR sequences.

# Commands

- `inspect`: List the top-level items of a CBOR sequence without decoding them
- `compose`: Encode JSON as CBOR

# Examples

```bash
# One line per top-level item: offset, length, major type, argument
cbor inspect data.cbor

# The same as JSON, refusing items nested deeper than 32 containers
cbor inspect --format json --max-depth 32 data.cbor

# Each item's raw bytes as hex
cbor inspect --format hex data.cbor

# Encode JSON from stdin
echo '{"name": "Alice", "age": 30}' | cbor compose -o data.cbor

# Show what the skip engine is doing
cbor --log-level debug inspect data.cbor
```
*/

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

mod compose;
mod inspect;
mod io;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "A CLI tool for walking and composing CBOR sequences"
)]
struct Cli {
    /// Log level; RUST_LOG overrides it per target
    #[arg(long, global = true, default_value = "warn", value_name = "LEVEL")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the items of a CBOR sequence
    Inspect(inspect::Command),

    /// Encode JSON as CBOR
    Compose(compose::Command),
}

fn init_logger(log_level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(log_level > LevelFilter::INFO)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    match cli.command {
        Commands::Inspect(args) => args.exec(),
        Commands::Compose(args) => args.exec(),
    }
}
