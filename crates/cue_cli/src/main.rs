//! cue CLI: inspect recurrence rules and trigger plans from the shell.
//!
//! # Responsibility
//! - Provide an executable to verify `cue_core` linkage and behavior.
//! - Keep output deterministic (JSON or one date per line) for scripting.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use cue_core::{
    plan_backends, Anchor, DateWindow, ReconciliationPlan, RecurrenceRule, RegisteredTrigger,
    Reminder, SchedulingConfig, StableKey, TriggerDescriptor,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cue", about = "Reminder recurrence and trigger planning")]
struct Cli {
    /// Log level; enables file logging when combined with --log-dir
    #[arg(long, default_value = cue_core::default_log_level())]
    log_level: String,
    /// Absolute directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core linkage probe
    Ping,
    /// Check whether a rule is due on one date
    IsDue {
        #[command(flatten)]
        rule: RuleArgs,
        /// Date to check (YYYY-MM-DD)
        date: NaiveDate,
    },
    /// List due dates inside an inclusive window
    DueDates {
        #[command(flatten)]
        rule: RuleArgs,
        /// Window start (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Window end (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        /// Maximum dates to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the desired triggers of a reminder snapshot as JSON
    Triggers {
        /// Reminder JSON file
        reminder: PathBuf,
        /// Horizon start (YYYY-MM-DD)
        #[arg(long)]
        today: NaiveDate,
    },
    /// Plan cancel/create operations against registered triggers
    Plan {
        /// Reminder JSON file
        reminder: PathBuf,
        /// JSON file with registered keys (array of strings) or descriptors;
        /// entries of other reminders are ignored
        #[arg(long)]
        registered: Option<PathBuf>,
        /// Backend the registered file was dumped from
        #[arg(long, value_enum, default_value_t = Backend::Notification)]
        backend: Backend,
        /// Horizon start (YYYY-MM-DD)
        #[arg(long)]
        today: NaiveDate,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    Notification,
    Alarm,
}

#[derive(clap::Args)]
struct RuleArgs {
    /// Rule JSON, e.g. '{"kind":"weekly","interval_weeks":2,"weekdays":[2]}'
    #[arg(long)]
    rule: String,
    /// Anchor date (YYYY-MM-DD)
    #[arg(long)]
    anchor: NaiveDate,
    /// Anchor time of day (HH:MM)
    #[arg(long, default_value = "09:00")]
    at: String,
}

impl RuleArgs {
    fn parse(&self) -> anyhow::Result<(RecurrenceRule, Anchor)> {
        let rule: RecurrenceRule =
            serde_json::from_str(&self.rule).context("failed to parse --rule")?;
        let (hour, minute) = parse_time_of_day(&self.at)?;
        let anchor = Anchor::new(self.anchor, hour, minute)?;
        Ok((rule, anchor))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let log_dir = log_dir
            .to_str()
            .context("--log-dir must be valid UTF-8")?;
        cue_core::init_logging(&cli.log_level, log_dir)
            .map_err(|err| anyhow::anyhow!("failed to init logging: {err}"))?;
    }
    let config = SchedulingConfig::from_env()?;

    match cli.command {
        Command::Ping => {
            println!("cue_core ping={}", cue_core::ping());
            println!("cue_core version={}", cue_core::core_version());
            Ok(())
        }
        Command::IsDue { rule, date } => cmd_is_due(&config, &rule, date),
        Command::DueDates {
            rule,
            from,
            to,
            limit,
        } => cmd_due_dates(&config, &rule, from, to, limit),
        Command::Triggers { reminder, today } => cmd_triggers(&config, reminder, today),
        Command::Plan {
            reminder,
            registered,
            backend,
            today,
        } => cmd_plan(&config, reminder, registered, backend, today),
    }
}

fn cmd_is_due(config: &SchedulingConfig, args: &RuleArgs, date: NaiveDate) -> anyhow::Result<()> {
    let (rule, anchor) = args.parse()?;
    println!("{}", config.engine().is_due(&rule, &anchor, date));
    Ok(())
}

fn cmd_due_dates(
    config: &SchedulingConfig,
    args: &RuleArgs,
    from: NaiveDate,
    to: NaiveDate,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    if to < from {
        bail!("--to ({to}) must not be before --from ({from})");
    }
    let (rule, anchor) = args.parse()?;
    let dates = config
        .engine()
        .due_dates(&rule, &anchor, DateWindow::through(from, to))
        .take(limit.unwrap_or(usize::MAX));
    for date in dates {
        println!("{date}");
    }
    Ok(())
}

fn cmd_triggers(
    config: &SchedulingConfig,
    reminder: PathBuf,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let reminder = read_reminder(&reminder)?;
    let desired = config
        .generator()
        .generate_for(&reminder, config.horizon(today));
    println!("{}", serde_json::to_string_pretty(&desired)?);
    Ok(())
}

fn cmd_plan(
    config: &SchedulingConfig,
    reminder: PathBuf,
    registered: Option<PathBuf>,
    backend: Backend,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let reminder = read_reminder(&reminder)?;
    let registered = match registered {
        Some(path) => read_registered(&path)?,
        None => Vec::new(),
    };
    let plan = plan_on_backend(config, &reminder, &registered, backend, today);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn plan_on_backend(
    config: &SchedulingConfig,
    reminder: &Reminder,
    registered: &[RegisteredTrigger],
    backend: Backend,
    today: NaiveDate,
) -> ReconciliationPlan {
    let (notifications, alarms) = match backend {
        Backend::Notification => (registered, &[][..]),
        Backend::Alarm => (&[][..], registered),
    };
    let plans = plan_backends(
        &config.generator(),
        config.horizon(today),
        reminder,
        notifications,
        alarms,
    );
    match backend {
        Backend::Notification => plans.notification,
        Backend::Alarm => plans.alarm,
    }
}

fn read_reminder(path: &Path) -> anyhow::Result<Reminder> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read reminder file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse reminder file {}", path.display()))
}

/// Accepts either `["key", ...]` or `[{descriptor}, ...]`.
fn read_registered(path: &Path) -> anyhow::Result<Vec<RegisteredTrigger>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read registered file {}", path.display()))?;
    if let Ok(keys) = serde_json::from_str::<Vec<StableKey>>(&raw) {
        return Ok(keys.into_iter().map(RegisteredTrigger::key_only).collect());
    }
    let descriptors = serde_json::from_str::<Vec<TriggerDescriptor>>(&raw)
        .with_context(|| format!("failed to parse registered file {}", path.display()))?;
    Ok(descriptors
        .into_iter()
        .map(RegisteredTrigger::described)
        .collect())
}

fn parse_time_of_day(value: &str) -> anyhow::Result<(u8, u8)> {
    let (hour, minute) = value
        .split_once(':')
        .with_context(|| format!("time `{value}` must be HH:MM"))?;
    let hour = hour
        .trim()
        .parse::<u8>()
        .with_context(|| format!("invalid hour in `{value}`"))?;
    let minute = minute
        .trim()
        .parse::<u8>()
        .with_context(|| format!("invalid minute in `{value}`"))?;
    Ok((hour, minute))
}
