use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_WORD_LIST_URL: &str =
    "https://raw.githubusercontent.com/dwyl/english-words/refs/heads/master/words_alpha.txt";

#[derive(Parser)]
#[command(name = "daily-minigames", version, about = "Daily Wordle and mini crossword")]
pub struct Args {
    /// Player id that owns the sessions
    #[arg(long, global = true, default_value = "local")]
    pub user: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the Wordle answer for a date
    DailyWord {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Play a Wordle interactively
    Play {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Crossword operations
    Crossword {
        #[command(subcommand)]
        action: CrosswordAction,
    },

    /// Show aggregate statistics
    Stats {
        #[arg(long, value_enum, default_value_t = Game::Wordle)]
        game: Game,
    },

    /// List past sessions, newest first
    History {
        #[arg(long, value_enum, default_value_t = Game::Wordle)]
        game: Game,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },

    /// Download a word list and build the vocabulary file
    FetchWords {
        #[arg(long, default_value = DEFAULT_WORD_LIST_URL)]
        url: String,

        /// Output path (defaults to the configured words path)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum CrosswordAction {
    /// Print clues and grid shape
    Show {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Start a new session
    Start {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Replace the grid with a JSON array of rows
    Fill { session: i64, grid: String },

    /// Check every word in the saved grid
    Answers { session: i64 },

    /// Reveal one cell
    Reveal { session: i64, row: usize, col: usize },

    /// Check one letter without writing it
    Check {
        session: i64,
        row: usize,
        col: usize,
        letter: String,
    },

    /// Reveal the whole grid
    RevealAll { session: i64 },

    /// Mark the session finished
    Complete { session: i64, seconds: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Game {
    Wordle,
    Crossword,
}
