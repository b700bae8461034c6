//! Clap derive structures for the `lumas` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lumas -- airfield edge-light inventory
#[derive(Debug, Parser)]
#[command(
    name = "lumas",
    version,
    about = "Track, seed, and edit airfield edge lights from the command line",
    long_about = "Keeps an inventory of runway and taxiway edge lights per airfield profile.\n\n\
        Every change is written to the profile's light table, and stats, zone\n\
        rollups, and the dashboard are recomputed from the latest snapshot.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Airfield profile to use
    #[arg(long, short = 'p', env = "LUMAS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Light table file (overrides profile)
    #[arg(long, short = 'f', env = "LUMAS_DATA_FILE", global = true)]
    pub data_file: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LUMAS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, create, and change individual lights
    #[command(alias = "l")]
    Lights(LightsArgs),

    /// System-wide health figures
    Stats,

    /// Per-zone rollup
    Zones,

    /// Stats, zone rollup, and failed lights in one view
    #[command(alias = "dash")]
    Dashboard,

    /// Lay out the configured runway's edge lights (empty table only)
    Seed(SeedArgs),

    /// Scripted map-editor sessions
    Editor(EditorArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Lights ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightsArgs {
    #[command(subcommand)]
    pub command: LightsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightsCommand {
    /// List lights in insertion order
    #[command(alias = "ls")]
    List {
        /// Only lights in this zone
        #[arg(long, short = 'z')]
        zone: Option<String>,

        /// Only lights that are not operational
        #[arg(long)]
        failed: bool,
    },

    /// Show one light
    Get {
        /// Light ID (UUID) or unique label
        light: String,
    },

    /// Create a light (starts operational)
    Add {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Zone name
        #[arg(long, short = 'z')]
        zone: String,

        /// Human-readable label
        #[arg(long, short = 'l')]
        label: String,
    },

    /// Flip a light between operational and offline
    Toggle {
        /// Light ID (UUID) or unique label
        light: String,
    },

    /// Set a light's state explicitly
    Set {
        /// Light ID (UUID) or unique label
        light: String,

        #[command(flatten)]
        state: StateFlags,
    },

    /// Reposition a light
    #[command(alias = "mv")]
    Move {
        /// Light ID (UUID) or unique label
        light: String,

        /// New latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// New longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },

    /// Delete a light
    #[command(alias = "rm")]
    Remove {
        /// Light ID (UUID) or unique label
        light: String,
    },
}

/// Exactly one target state.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct StateFlags {
    /// Mark operational
    #[arg(long)]
    pub on: bool,

    /// Mark offline
    #[arg(long)]
    pub off: bool,

    /// Take out of service for maintenance
    #[arg(long)]
    pub maintenance: bool,
}

// ── Seed ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Lights per side (overrides profile)
    #[arg(long)]
    pub pairs: Option<usize>,
}

// ── Editor ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EditorArgs {
    #[command(subcommand)]
    pub command: EditorCommand,
}

#[derive(Debug, Subcommand)]
pub enum EditorCommand {
    /// Apply a JSON array of editor events, continuing past failures
    Replay {
        /// Events file
        file: PathBuf,

        /// Seed for quick-add labels and zones
        #[arg(long)]
        seed: Option<u64>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a profile with guided setup (--yes accepts defaults)
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
