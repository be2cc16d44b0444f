use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vocaquiz_core::{DirectionMode, SessionMode};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Due,
    New,
    Review,
    Random,
}

impl From<ModeArg> for SessionMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Due => SessionMode::Due,
            ModeArg::New => SessionMode::New,
            ModeArg::Review => SessionMode::Review,
            ModeArg::Random => SessionMode::Random,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFilter {
    Due,
    New,
    Review,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    SourceToTarget,
    TargetToSource,
    Random,
}

impl From<DirectionArg> for DirectionMode {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::SourceToTarget => DirectionMode::SourceToTarget,
            DirectionArg::TargetToSource => DirectionMode::TargetToSource,
            DirectionArg::Random => DirectionMode::Random,
        }
    }
}

#[derive(Debug, Parser, Clone)]
#[command(name = "vocaquiz", version, about = "Vocabulary quiz with SM-2 scheduling")]
pub struct Cli {
    /// Data directory for cards, backups and settings (defaults to the app data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Debug logging on stderr unless RUST_LOG is set
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Run a quiz session
    Quiz(QuizCmd),
    /// Collection statistics
    Stats,
    /// Show or change quiz settings
    #[command(subcommand)]
    Config(ConfigCmd),
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List {
        #[arg(long, value_enum)]
        mode: Option<ListFilter>,
    },
    Rm {
        card_id: String,
    },
    Edit(CardEdit),
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: String,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CardEdit {
    pub card_id: String,
    #[arg(long)]
    pub front: Option<String>,
    #[arg(long)]
    pub back: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub clear_notes: bool,
    #[arg(long = "add-tag")]
    pub add_tags: Vec<String>,
    #[arg(long = "rm-tag")]
    pub rm_tags: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct QuizCmd {
    #[arg(long, value_enum, default_value_t = ModeArg::Due)]
    pub mode: ModeArg,
    /// Cards per session (overrides settings)
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long, value_enum)]
    pub direction: Option<DirectionArg>,
    /// Seed for shuffling and direction draws
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ConfigCmd {
    Show,
    Set(ConfigSet),
}

#[derive(Debug, Args, Clone)]
pub struct ConfigSet {
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long, value_enum)]
    pub direction: Option<DirectionArg>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub clear_seed: bool,
}
