//! Dynamic logging backend demo.
//!
//! Builds a logger context from command-line settings, emits a few sample
//! records to stdout, applies runtime level updates and emits them again.
//!
//! ```text
//! dynlog-demo --format plain --name-length 20 --set app.orders=debug
//! ```

use std::collections::HashMap;
use std::io;

use clap::Parser;

use dynlog::config::schema::{LoggerSettings, WriterKind};
use dynlog::logger::mdc;
use dynlog::{LoggerContext, StackFrame, Throwable};

#[derive(Parser)]
#[command(name = "dynlog-demo")]
#[command(about = "Emit sample records through the dynamic logging backend", long_about = None)]
struct Cli {
    /// Record format: json or plain
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Default log level
    #[arg(short, long, default_value = "info")]
    level: String,

    /// Logger name target length: full, short or an integer
    #[arg(short, long, default_value = "full")]
    name_length: String,

    /// Time zone for timestamps
    #[arg(short, long)]
    timezone: Option<String>,

    /// Optional TOML settings file; command-line values are ignored when set
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Runtime level update, `name=level`; may be repeated
    #[arg(short, long = "set", value_parser = parse_assignment)]
    set: Vec<(String, String)>,
}

fn parse_assignment(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(name, level)| (name.trim().to_owned(), level.trim().to_owned()))
        .ok_or_else(|| format!("expected name=level, got '{value}'"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dynlog::observability::reporter::init_stderr("dynlog=info");

    let cli = Cli::parse();
    let context = match &cli.config {
        Some(path) => LoggerContext::from_toml_str(&std::fs::read_to_string(path)?, Box::new(io::stdout()))?,
        None => {
            let settings = LoggerSettings {
                default_level: cli.level.clone(),
                format: WriterKind::parse(&cli.format),
                name_target_length: cli.name_length.clone(),
                timezone: cli.timezone.clone(),
                component: Some("dynlog-demo".to_owned()),
                ..Default::default()
            };
            LoggerContext::from_settings(&settings, Box::new(io::stdout()))?
        }
    };

    emit_samples(&context);

    if !cli.set.is_empty() {
        let updates: HashMap<String, String> = cli.set.into_iter().collect();
        let changed = context.put_all(&updates);
        tracing::info!(changed = changed.len(), "Level updates applied");
        for (name, level) in &changed {
            eprintln!("{name} -> {level}");
        }
        emit_samples(&context);
    }

    Ok(())
}

fn emit_samples(context: &LoggerContext) {
    let orders = context.logger("app.orders.OrderService");
    let payments = context.logger("app.payments.gateway.CardClient");

    let _request = mdc::scoped("requestId", "req-42");
    orders.debug("Loading order {} for customer {}", &[&1042, &"c-17"]);
    orders.info("Order {} accepted", &[&1042]);
    payments.warn("Retrying charge, attempt {}", &[&2]);

    let failure = Throwable::new("app.payments.GatewayTimeout", "no response after 5s")
        .with_frame(StackFrame::new("app.payments.gateway.CardClient", "charge").at("CardClient.rs", 88))
        .with_frame(StackFrame::new("app.orders.OrderService", "checkout").at("OrderService.rs", 41))
        .with_cause(
            Throwable::new("std.io.Error", "connection reset by peer")
                .with_frame(StackFrame::new("std.net.TcpStream", "read").at("tcp.rs", 120)),
        );
    payments.error_with("Charge failed for order {}", &[&1042], &failure);
}
