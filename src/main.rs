use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use sqlx::SqlitePool;
use std::io::{self, Write};
use std::sync::Arc;

use daily_minigames::{
    args::{Args, Command, CrosswordAction, Game},
    clock::{Clock, SystemClock},
    config::Settings,
    crossword::{CellPos, PlayerGrid},
    db,
    feedback::render,
    logging, provider,
    service::{CrosswordService, WordleService},
    session::MAX_ATTEMPTS,
    vocabulary::{Vocabulary, fetch_word_file},
};

#[tokio::main]
async fn main() -> Result<()> {
    let Args { user, command } = Args::parse();
    let _log_guard = logging::init(&db::data_dir()?.join("logs"))?;
    let settings = Settings::from_env()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match command {
        Command::FetchWords { url, out } => {
            let out = out.unwrap_or_else(|| settings.words_path.clone());
            let count = fetch_word_file(&url, &out).await?;
            println!("wrote {count} words to {}", out.display());
        }
        Command::DailyWord { date } => {
            let wordle = wordle_service(&settings, open_pool(&settings).await?, clock)?;
            println!("{}", wordle.daily_word(date).await?);
        }
        Command::Play { date } => {
            let wordle = wordle_service(&settings, open_pool(&settings).await?, clock)?;
            play(&wordle, &user, date).await?;
        }
        Command::Crossword { action } => {
            let service = crossword_service(&settings, open_pool(&settings).await?, clock);
            crossword(&service, &user, action).await?;
        }
        Command::Stats { game } => {
            let pool = open_pool(&settings).await?;
            match game {
                Game::Wordle => print_json(&wordle_service(&settings, pool, clock)?.stats(&user).await?)?,
                Game::Crossword => print_json(&crossword_service(&settings, pool, clock).stats(&user).await?)?,
            }
        }
        Command::History { game, page, page_size } => {
            let pool = open_pool(&settings).await?;
            match game {
                Game::Wordle => {
                    let service = wordle_service(&settings, pool, clock)?;
                    print_json(&service.history(&user, page, page_size).await?)?
                }
                Game::Crossword => {
                    let service = crossword_service(&settings, pool, clock);
                    print_json(&service.history(&user, page, page_size).await?)?
                }
            }
        }
    }

    Ok(())
}

async fn open_pool(settings: &Settings) -> Result<SqlitePool> {
    db::create_pool(&settings.database_url).await
}

fn wordle_service(settings: &Settings, pool: SqlitePool, clock: Arc<dyn Clock>) -> Result<WordleService> {
    let vocabulary = Vocabulary::load(&settings.words_path).with_context(|| {
        format!(
            "failed to load {} (run `daily-minigames fetch-words` first)",
            settings.words_path.display()
        )
    })?;
    Ok(WordleService::new(
        pool,
        Arc::new(vocabulary),
        settings.wordle_secret.clone(),
        clock,
    ))
}

fn crossword_service(settings: &Settings, pool: SqlitePool, clock: Arc<dyn Clock>) -> CrosswordService {
    let source = provider::from_config(&settings.crossword_source);
    CrosswordService::new(pool, source, settings.retry.clone(), clock)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resume today's unfinished game if there is one, otherwise start a new one,
/// then read guesses until the game ends or stdin closes.
async fn play(wordle: &WordleService, user: &str, date: Option<NaiveDate>) -> Result<()> {
    let view = wordle.start_session(user, date).await?;

    for result in &view.guess_results {
        println!("{}", render(result));
    }

    let stdin = io::stdin();
    let mut attempt = view.attempts_used;

    loop {
        print!("guess {}/{MAX_ATTEMPTS}> ", attempt + 1);
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let guess = line.trim();
        if guess.is_empty() {
            continue;
        }

        let outcome = match wordle.submit_guess(user, view.session_id, guess).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_validation() => {
                eprintln!("{e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        println!("{}", render(&outcome.result));
        attempt = outcome.attempts_used;

        if outcome.game_over {
            let answer = outcome.answer.unwrap_or_default();
            match outcome.won {
                Some(true) => println!("solved in {attempt}!"),
                _ => println!("out of guesses, the word was {answer}"),
            }
            break;
        }
    }

    Ok(())
}

async fn crossword(service: &CrosswordService, user: &str, action: CrosswordAction) -> Result<()> {
    match action {
        CrosswordAction::Show { date } => print_json(&service.puzzle_info(date).await?),
        CrosswordAction::Start { date } => print_json(&service.start_session(user, date).await?),
        CrosswordAction::Fill { session, grid } => {
            let grid: PlayerGrid = serde_json::from_str(&grid).context("grid must be a JSON array of rows")?;
            print_json(&service.update_grid(user, session, grid).await?)
        }
        CrosswordAction::Answers { session } => print_json(&service.check_answers(user, session).await?),
        CrosswordAction::Reveal { session, row, col } => {
            let letter = service.reveal_cell(user, session, CellPos::new(row, col)).await?;
            println!("{letter}");
            Ok(())
        }
        CrosswordAction::Check { session, row, col, letter } => {
            let correct = service
                .check_cell(user, session, CellPos::new(row, col), &letter)
                .await?;
            println!("{}", if correct { "correct" } else { "incorrect" });
            Ok(())
        }
        CrosswordAction::RevealAll { session } => print_json(&service.reveal_all(user, session).await?),
        CrosswordAction::Complete { session, seconds } => {
            print_json(&service.complete(user, session, seconds).await?)
        }
    }
}
