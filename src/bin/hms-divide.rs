use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hms_divide::inputs::PartialInputs;
use hms_divide::options::PartialOptions;
use hms_divide::theme::theme_attribute;
use hms_divide::toasts::NewToast;
use hms_divide::{AppContext, Config, Result, Theme};

/// Divide an hours/minutes/seconds duration
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured options file
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current options
    Show,
    /// Store new option values
    Set {
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        hours_suffix: Option<String>,
        #[arg(long)]
        minutes_suffix: Option<String>,
        #[arg(long)]
        seconds_suffix: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        rounding_decimals: Option<f64>,
    },
    /// Restore every option to its default
    Reset,
    /// Divide a duration and print it in each unit
    Convert {
        hours: f64,
        minutes: f64,
        seconds: f64,
        #[arg(default_value_t = 1.0)]
        divide: f64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let context = match open_context(&cli).await {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // a failed command is shown once, as an error toast
    let result = context.report(run(&context, cli.command).await);
    for toast in context.toasts().toasts() {
        eprintln!("[{}] {}", toast.variant.as_deref().unwrap_or("info"), toast.message);
    }
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

async fn open_context(cli: &Cli) -> Result<AppContext> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(storage) = &cli.storage {
        config.storage_path = storage.clone();
    }
    AppContext::open(config).await
}

async fn run(context: &AppContext, command: Command) -> Result<()> {
    let options = context.options();
    match command {
        Command::Show => {
            let state = options.snapshot();
            let attribute = theme_attribute(state.theme).unwrap_or("unset");
            println!("theme: {} (data-theme: {})", state.theme, attribute);
            println!("hoursSuffix: {:?}", state.hours_suffix);
            println!("minutesSuffix: {:?}", state.minutes_suffix);
            println!("secondsSuffix: {:?}", state.seconds_suffix);
            println!("roundingDecimals: {}", state.rounding_decimals);
        }
        Command::Set {
            theme,
            hours_suffix,
            minutes_suffix,
            seconds_suffix,
            rounding_decimals,
        } => {
            let mut update = PartialOptions::new();
            if let Some(theme) = theme {
                update = update.with_theme(theme);
            }
            if let Some(suffix) = hours_suffix {
                update = update.with_hours_suffix(suffix);
            }
            if let Some(suffix) = minutes_suffix {
                update = update.with_minutes_suffix(suffix);
            }
            if let Some(suffix) = seconds_suffix {
                update = update.with_seconds_suffix(suffix);
            }
            if let Some(decimals) = rounding_decimals {
                update = update.with_rounding_decimals(decimals);
            }
            options.set_options(update).await?;
            context.toasts().add_toast(NewToast::new("Options saved"), Duration::ZERO);
        }
        Command::Reset => {
            options.reset_options().await?;
            context.toasts().add_toast(NewToast::new("Options reset"), Duration::ZERO);
        }
        Command::Convert {
            hours,
            minutes,
            seconds,
            divide,
        } => {
            context.inputs().set_inputs(&PartialInputs {
                hours: Some(hours),
                minutes: Some(minutes),
                seconds: Some(seconds),
                divide: Some(divide),
            })?;
            println!("{}", context.conversion());
        }
    }
    Ok(())
}
