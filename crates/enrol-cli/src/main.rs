#![forbid(unsafe_code)]

mod cmd;
mod output;
mod project;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "enrol: study-abroad catalog and application desk",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json, FORMAT and the user config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize an enrol project",
        long_about = "Create .enrol/ in the current directory with a config template and the default catalog.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    enrol init\n\n    # Restore the default catalog and applications, keeping config.toml\n    enrol init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Browse",
        about = "Browse study programs",
        long_about = "List every program in the catalog with optional text, country and language filters.",
        after_help = "EXAMPLES:\n    # All programs\n    enrol programs\n\n    # English programs in Lithuania mentioning engineering\n    enrol programs --search engineering --country Lithuania --language English\n\n    # Available filter values\n    enrol programs --facets"
    )]
    Programs(cmd::programs::ProgramsArgs),

    #[command(
        next_help_heading = "Browse",
        about = "Apply to a program",
        long_about = "Submit an application for a program id shown by `enrol programs`.",
        after_help = "EXAMPLES:\n    enrol apply 'Kaunas%20University%20of%20Technology---Mechanical%20Engineering' \\\n        --name \"Ana Berzina\" --email ana@example.com --phone \"+371 20000000\" \\\n        --document passport.pdf --document transcript.pdf"
    )]
    Apply(cmd::apply::ApplyArgs),

    #[command(
        next_help_heading = "Browse",
        about = "Get a live-support chat link",
        long_about = "Validate your details and print a chat link with a prefilled message.",
        after_help = "EXAMPLES:\n    enrol contact --name \"Ana Berzina\" --email ana@example.com --phone \"+371 20000000\""
    )]
    Contact(cmd::contact::ContactArgs),

    #[command(
        next_help_heading = "Admin",
        about = "Start an admin session",
        after_help = "EXAMPLES:\n    enrol login --username admin --password admin"
    )]
    Login(cmd::auth::LoginArgs),

    #[command(
        next_help_heading = "Admin",
        about = "End the admin session",
        after_help = "EXAMPLES:\n    enrol logout"
    )]
    Logout,

    #[command(
        next_help_heading = "Admin",
        about = "Show the current admin session",
        after_help = "EXAMPLES:\n    enrol whoami --json"
    )]
    Whoami,

    #[command(
        next_help_heading = "Admin",
        about = "Manage the university catalog",
        long_about = "List, add, edit, delete, import and export universities. Requires `enrol login`."
    )]
    University {
        #[command(subcommand)]
        command: cmd::university::UniversityCommand,
    },

    #[command(
        next_help_heading = "Admin",
        about = "Review submitted applications",
        long_about = "List, inspect and update applications. Requires `enrol login`."
    )]
    Application {
        #[command(subcommand)]
        command: cmd::application::ApplicationCommand,
    },

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Check stored collections",
        long_about = "Load every collection, report what was found and optionally reset unreadable ones.",
        after_help = "EXAMPLES:\n    # Report\n    enrol check\n\n    # Reset unreadable collections to their defaults\n    enrol check --repair"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    enrol completions bash\n\n    # Generate zsh completions\n    enrol completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ENROL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "enrol=debug,info"
        } else {
            "enrol=info,warn"
        })
    });

    let format = env::var("ENROL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user_config = enrol_core::config::load_user_config().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unreadable user config");
        enrol_core::config::UserConfig::default()
    });
    let output = output::resolve_output_mode(cli.format, cli.json, user_config.output.as_deref());
    let project_root = env::current_dir()?;

    let result = match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &project_root),
        Commands::Programs(args) => cmd::programs::run_programs(args, output, &project_root),
        Commands::Apply(args) => cmd::apply::run_apply(args, output, &project_root),
        Commands::Contact(args) => cmd::contact::run_contact(args, output, &project_root),
        Commands::Login(args) => cmd::auth::run_login(args, output, &project_root),
        Commands::Logout => cmd::auth::run_logout(output, &project_root),
        Commands::Whoami => cmd::auth::run_whoami(output, &project_root),
        Commands::University { command } => {
            cmd::university::run_university(command, output, &project_root)
        }
        Commands::Application { command } => {
            cmd::application::run_application(command, output, &project_root)
        }
        Commands::Check(args) => cmd::check::run_check(args, output, &project_root),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args, &mut command)
        }
    };

    match result {
        Err(err) if output::is_reported(&err) => {
            tracing::debug!(error = %err, "command failed");
            process::exit(1);
        }
        other => other,
    }
}
