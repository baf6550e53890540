use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "jobtrail")]
#[command(about = "Track your job search from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Owner id stamped on records (overrides env and profile)
    #[arg(long, global = true, value_name = "ID")]
    pub owner: Option<String>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Track job applications
    App {
        #[command(subcommand)]
        command: AppCommands,
    },
    /// Log interview prep sessions
    Prep {
        #[command(subcommand)]
        command: PrepCommands,
    },
    /// Keep company research notes
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },
    /// Manage networking contacts
    Contact {
        #[command(subcommand)]
        command: ContactCommands,
    },
    /// Maintain STAR interview stories
    Story {
        #[command(subcommand)]
        command: StoryCommands,
    },
    /// Track weekly goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Import records from a CSV file
    Import {
        /// Target collection
        #[arg(value_enum)]
        collection: Collection,
        /// CSV file to import
        file: PathBuf,
    },
    /// Export a collection
    Export {
        /// Source collection
        #[arg(value_enum)]
        collection: Collection,
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Show pipeline funnel, weekly volume, and prep stats
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show activity streaks and earned badges
    Streak {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch a collection live, printing each snapshot
    Watch {
        /// Collection to watch
        #[arg(value_enum)]
        collection: Collection,
        /// Exit after this many snapshots (runs until Ctrl-C when omitted)
        #[arg(long, value_name = "N")]
        take: Option<usize>,
    },
    /// Sync local replica with the remote database
    Sync,
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Collection {
    App,
    Prep,
    Company,
    Contact,
    Story,
    Goal,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum AppCommands {
    /// Add an application
    #[command(alias = "new")]
    Add {
        /// Company name
        company: String,
        /// Role title
        role: String,
        #[command(flatten)]
        fields: AppFieldArgs,
    },
    /// List applications, newest first
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Update an application
    Update {
        /// Record ID
        id: String,
        /// New company name
        #[arg(long)]
        company: Option<String>,
        /// New role title
        #[arg(long)]
        role: Option<String>,
        #[command(flatten)]
        fields: AppFieldArgs,
    },
    /// Delete an application
    Delete {
        /// Record ID
        id: String,
    },
}

#[derive(Args, Default)]
pub struct AppFieldArgs {
    /// Posting or referral link
    #[arg(long)]
    pub link: Option<String>,
    /// Application date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
    /// Pipeline stage (saved, applied, screening, interview, offer, rejected)
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub recruiter: Option<String>,
    /// Referral (y/n)
    #[arg(long)]
    pub referral: Option<String>,
    #[arg(long)]
    pub next_step: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum PrepCommands {
    /// Log a prep session
    #[command(alias = "new")]
    Add {
        /// Topic studied
        topic: String,
        #[command(flatten)]
        fields: PrepFieldArgs,
    },
    /// List prep sessions, newest first
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Update a prep session
    Update {
        /// Record ID
        id: String,
        /// New topic
        #[arg(long)]
        topic: Option<String>,
        #[command(flatten)]
        fields: PrepFieldArgs,
    },
    /// Delete a prep session
    Delete {
        /// Record ID
        id: String,
    },
}

#[derive(Args, Default)]
pub struct PrepFieldArgs {
    /// Session date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
    /// Problems worked through
    #[arg(long)]
    pub problems: Option<String>,
    /// Time spent in minutes
    #[arg(long, value_name = "MINUTES")]
    pub time: Option<i64>,
    /// Confidence after the session (1-10)
    #[arg(long)]
    pub confidence: Option<i64>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum CompanyCommands {
    /// Add company research
    #[command(alias = "new")]
    Add {
        /// Company name
        company: String,
        #[command(flatten)]
        fields: CompanyFieldArgs,
    },
    /// List company research, newest first
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Update company research
    Update {
        /// Record ID
        id: String,
        /// New company name
        #[arg(long)]
        company: Option<String>,
        #[command(flatten)]
        fields: CompanyFieldArgs,
    },
    /// Delete company research
    Delete {
        /// Record ID
        id: String,
    },
}

#[derive(Args, Default)]
pub struct CompanyFieldArgs {
    /// What the company does
    #[arg(long)]
    pub what_they_do: Option<String>,
    /// Stated values
    #[arg(long)]
    pub values: Option<String>,
    /// Why you want to work there
    #[arg(long)]
    pub why: Option<String>,
    /// Questions to ask
    #[arg(long)]
    pub questions: Option<String>,
    /// Recent news
    #[arg(long)]
    pub news: Option<String>,
}

#[derive(Subcommand)]
pub enum ContactCommands {
    /// Add a networking contact
    #[command(alias = "new")]
    Add {
        /// Contact name
        name: String,
        #[command(flatten)]
        fields: ContactFieldArgs,
    },
    /// List contacts, newest first
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Update a contact
    Update {
        /// Record ID
        id: String,
        /// New contact name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ContactFieldArgs,
    },
    /// Delete a contact
    Delete {
        /// Record ID
        id: String,
    },
}

#[derive(Args, Default)]
pub struct ContactFieldArgs {
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    /// Date of last outreach (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
    /// Contact status (to-reach, reached, responded, meeting, dormant)
    #[arg(long)]
    pub status: Option<String>,
    /// Referral (y/n)
    #[arg(long)]
    pub referral: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum StoryCommands {
    /// Add a STAR story
    #[command(alias = "new")]
    Add {
        /// Story title
        title: String,
        #[command(flatten)]
        fields: StoryFieldArgs,
    },
    /// List stories, newest first
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Update a story
    Update {
        /// Record ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: StoryFieldArgs,
    },
    /// Delete a story
    Delete {
        /// Record ID
        id: String,
    },
}

#[derive(Args, Default)]
pub struct StoryFieldArgs {
    #[arg(long)]
    pub situation: Option<String>,
    #[arg(long)]
    pub task: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub result: Option<String>,
}

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Add a goal
    #[command(alias = "new")]
    Add {
        /// Goal title
        title: String,
        /// Target count
        #[arg(long, default_value_t = 0)]
        target: i64,
        #[command(flatten)]
        fields: GoalFieldArgs,
    },
    /// List goals, newest first
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Update a goal
    Update {
        /// Record ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New target count
        #[arg(long)]
        target: Option<i64>,
        #[command(flatten)]
        fields: GoalFieldArgs,
    },
    /// Delete a goal
    Delete {
        /// Record ID
        id: String,
    },
}

#[derive(Args, Default)]
pub struct GoalFieldArgs {
    /// Current progress count
    #[arg(long)]
    pub progress: Option<i64>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Number of records to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Owner id for records written by this profile
        #[arg(long, value_name = "ID")]
        owner: Option<String>,
        /// Local database path
        #[arg(long, value_name = "PATH")]
        db_path: Option<String>,
        /// Remote database URL (e.g. libsql://your-db.turso.io)
        #[arg(long, value_name = "URL")]
        sync_url: Option<String>,
        /// Remote database auth token
        #[arg(long, value_name = "TOKEN")]
        sync_token: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Show the resolved configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn app_add_parses_positional_and_flags() {
        let cli = Cli::parse_from([
            "jobtrail", "app", "add", "Acme", "Engineer", "--status", "applied", "--referral",
            "y",
        ]);
        match cli.command {
            Commands::App {
                command: AppCommands::Add {
                    company,
                    role,
                    fields,
                },
            } => {
                assert_eq!(company, "Acme");
                assert_eq!(role, "Engineer");
                assert_eq!(fields.status.as_deref(), Some("applied"));
                assert_eq!(fields.referral.as_deref(), Some("y"));
            }
            _ => panic!("parsed into the wrong command"),
        }
    }

    #[test]
    fn global_owner_flag_applies_to_subcommands() {
        let cli = Cli::parse_from(["jobtrail", "app", "list", "--owner", "u1", "--json"]);
        assert_eq!(cli.owner.as_deref(), Some("u1"));
    }
}
