mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use pixelpet::models::{PetAction, ProfilePatch, Session};
use pixelpet::services::api_client::GatewayClient;
use pixelpet::utils::config;
use pixelpet::ApiError;

use commands::tasks::{AddOptions, EditOptions, ListOptions};
use commands::Context;

#[derive(Parser)]
#[command(name = "pixelpet", version, about = "Task dashboard and pet care from the terminal")]
struct Cli {
    /// Settings file (defaults to <config dir>/pixelpet/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Gateway base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, global = true)]
    token: Option<String>,

    #[arg(long, global = true)]
    user_id: Option<String>,

    /// IANA zone used for week boundaries and day buckets
    #[arg(long, global = true)]
    tz: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Weekly overview: due this week, next up, neglected, completed per day
    Dashboard {
        /// Keep refreshing until ctrl-c
        #[arg(long)]
        watch: bool,
    },
    #[command(subcommand)]
    Tasks(TaskCommand),
    /// Roadmap progress
    Roadmaps,
    #[command(subcommand)]
    Pet(PetCommand),
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Follow live change notifications
    Events,
}

#[derive(Subcommand)]
enum TaskCommand {
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// Show deleted tasks instead
        #[arg(long)]
        trash: bool,
    },
    Add {
        title: String,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// RFC 3339 timestamp or YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        #[arg(long, default_value_t = 0)]
        points: u32,
        #[arg(long)]
        description: Option<String>,
    },
    Show { id: i64 },
    /// Change only the given fields
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Replaces the task's tags
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        points: Option<u32>,
    },
    /// Tags in use across your tasks
    Tags,
    Start { id: i64 },
    Complete { id: i64 },
    Delete { id: i64 },
    Restore { id: i64 },
}

#[derive(Subcommand)]
enum ProfileCommand {
    Show,
    /// An empty value clears the field
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Subcommand)]
enum PetCommand {
    Status,
    Feed,
    Play,
    Clean,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(cli).await {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        let status = e.downcast_ref::<ApiError>().and_then(ApiError::status);
        if status == Some(reqwest::StatusCode::UNAUTHORIZED) {
            eprintln!("hint: set PIXELPET_ACCESS_TOKEN or pass --token");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    config::load_dotenv();
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.base_url {
        settings.api.base_url = url;
    }
    if let Some(token) = cli.token {
        settings.session.access_token = token;
    }
    if let Some(user_id) = cli.user_id {
        settings.session.user_id = user_id;
    }
    if let Some(tz) = cli.tz {
        settings.dashboard.timezone = Some(tz);
    }

    let session = Session::from(&settings.session);
    if !session.is_authenticated() {
        log::warn!("No access token configured; requests will be anonymous");
    }
    let client = GatewayClient::new(&settings.api, session)?;
    log::debug!("Using gateway at {}", client.base_url());

    let zone = config::resolve_timezone(&settings)?;
    let ctx = Context {
        settings,
        client,
        json: cli.json,
    };

    match cli.command {
        Command::Dashboard { watch } => match zone {
            Some(tz) => commands::dashboard::show(&ctx, tz, watch).await,
            None => commands::dashboard::show(&ctx, chrono::Local, watch).await,
        },
        Command::Tasks(TaskCommand::List { status, tag, trash }) => {
            let opts = ListOptions { status, tag, trash };
            match zone {
                Some(tz) => commands::tasks::list(&ctx, tz, opts).await,
                None => commands::tasks::list(&ctx, chrono::Local, opts).await,
            }
        }
        Command::Tasks(TaskCommand::Add {
            title,
            tag,
            priority,
            due,
            points,
            description,
        }) => {
            let opts = AddOptions {
                title,
                description,
                tag,
                priority,
                due,
                points,
            };
            commands::tasks::add(&ctx, opts).await
        }
        Command::Tasks(TaskCommand::Show { id }) => match zone {
            Some(tz) => commands::tasks::show(&ctx, tz, id).await,
            None => commands::tasks::show(&ctx, chrono::Local, id).await,
        },
        Command::Tasks(TaskCommand::Edit {
            id,
            title,
            description,
            status,
            priority,
            tag,
            due,
            points,
        }) => {
            let opts = EditOptions {
                title,
                description,
                status,
                priority,
                tag,
                due,
                points,
            };
            commands::tasks::edit(&ctx, id, opts).await
        }
        Command::Tasks(TaskCommand::Tags) => commands::tasks::tags(&ctx).await,
        Command::Tasks(TaskCommand::Start { id }) => commands::tasks::start(&ctx, id).await,
        Command::Tasks(TaskCommand::Complete { id }) => commands::tasks::complete(&ctx, id).await,
        Command::Tasks(TaskCommand::Delete { id }) => commands::tasks::delete(&ctx, id).await,
        Command::Tasks(TaskCommand::Restore { id }) => commands::tasks::restore(&ctx, id).await,
        Command::Roadmaps => commands::roadmaps::list(&ctx).await,
        Command::Pet(PetCommand::Status) => commands::pet::status(&ctx).await,
        Command::Pet(PetCommand::Feed) => commands::pet::act(&ctx, PetAction::Feed).await,
        Command::Pet(PetCommand::Play) => commands::pet::act(&ctx, PetAction::Play).await,
        Command::Pet(PetCommand::Clean) => commands::pet::act(&ctx, PetAction::Clean).await,
        Command::Profile(ProfileCommand::Show) => commands::profile::show(&ctx).await,
        Command::Profile(ProfileCommand::Set { name, phone, address }) => {
            commands::profile::set(&ctx, ProfilePatch { name, phone, address }).await
        }
        Command::Events => commands::events::follow(&ctx).await,
    }
}
