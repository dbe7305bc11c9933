mod backend;
mod client;
mod commands;
mod logging;
mod render;
mod snapshot;
mod toast;

use std::path::PathBuf;

use agenda_core::appointment::AppointmentId;
use agenda_core::upcoming::DEFAULT_UPCOMING_LIMIT;
use agenda_core::window::Granularity;
use anyhow::Result;
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use commands::Ctx;
use commands::create::DraftArgs;

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "View and manage shared appointments from the terminal")]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Read and write appointments in this JSON file instead of the API
    #[arg(long, global = true, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ViewArgs {
    /// Any date inside the period to show (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Print the layout as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one day as a time grid
    Day(ViewArgs),
    /// Show a week as a time grid
    Week(ViewArgs),
    /// Show a month grid
    Month(ViewArgs),
    /// List the next appointments
    Upcoming {
        #[arg(short = 'n', long, default_value_t = DEFAULT_UPCOMING_LIMIT)]
        limit: usize,
    },
    /// List users that can be invited
    Users,
    /// Create an appointment
    Create(DraftArgs),
    /// Replace the details of an appointment you organize
    Update {
        id: AppointmentId,

        /// A date the appointment is on now (defaults to the new start date)
        #[arg(long, value_name = "DATE")]
        current: Option<NaiveDate>,

        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Cancel an appointment
    Cancel {
        id: AppointmentId,

        #[arg(short, long)]
        reason: Option<String>,
    },
    /// Show config paths and values
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let ctx = Ctx::load(cli.snapshot)?;

    match cli.command {
        Commands::Day(args) => commands::view::run(&ctx, Granularity::Day, args.date, args.json).await,
        Commands::Week(args) => commands::view::run(&ctx, Granularity::Week, args.date, args.json).await,
        Commands::Month(args) => {
            commands::view::run(&ctx, Granularity::Month, args.date, args.json).await
        }
        Commands::Upcoming { limit } => commands::upcoming::run(&ctx, limit).await,
        Commands::Users => commands::users::run(&ctx).await,
        Commands::Create(draft) => commands::create::run(&ctx, draft).await,
        Commands::Update { id, current, draft } => {
            commands::update::run(&ctx, id, current, draft).await
        }
        Commands::Cancel { id, reason } => commands::cancel::run(&ctx, id, reason).await,
        Commands::Config => commands::config::run(&ctx),
    }
}
