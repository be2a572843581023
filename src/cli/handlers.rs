use anyhow::{anyhow, Context, Result};
use chrono::Local;
use serde::Serialize;
use std::io::{self, BufRead, Write};

use matura::catalog::TrackRegistry;
use matura::config::AppConfig;
use matura::db::SqliteProgressStore;
use matura::engine::{Clock, LessonStatus, ProgressEngine, Step};
use matura::error::EngineError;
use matura::models::{LessonId, ProgressState};
use matura::store::ProgressStore;
use matura::utils::format::{format_streak, pad_display, progress_bar, status_marker};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! writeln_colored {
    ($out:expr, $color:expr, $($arg:tt)*) => {{
        write!($out, "{}", $color)?;
        write!($out, $($arg)*)?;
        writeln!($out, "\x1b[0m")?;
    }};
}

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Shared setup ────────────────────────────────────────────────────────────

fn resolve_track(config: &AppConfig, track: Option<&str>) -> String {
    track
        .map(str::to_string)
        .unwrap_or_else(|| config.learner.default_track.clone())
}

fn open_store(config: &AppConfig) -> Result<SqliteProgressStore> {
    let db_path = config.ensure_db_dir()?;
    SqliteProgressStore::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))
}

fn open_engine(config: &AppConfig, track: &str) -> Result<ProgressEngine> {
    let catalog = config
        .track_registry()
        .open(track)
        .with_context(|| format!("Loading lessons for '{}'", track))?;
    let store = open_store(config)?;
    let engine = ProgressEngine::open(catalog, Box::new(store), Clock::System)?;
    if let Some(e) = engine.pending_save() {
        eprintln!("{}  ⚠ Streak reset could not be saved: {}\x1b[0m", AMBER, e);
    }
    Ok(engine)
}

// ─── Tracks ──────────────────────────────────────────────────────────────────

pub fn handle_tracks(config: &AppConfig) -> Result<()> {
    let registry: TrackRegistry = config.track_registry();
    let store = open_store(config)?;

    println!();
    println_colored!(GOLD, "  Tracks");
    println!();
    for track in registry.list() {
        let progress = store.load(&track.key)?;
        let marker = if track.key == config.learner.default_track {
            "▶"
        } else {
            " "
        };
        let origin = match track.path() {
            Some(path) => format!("{}", path.display()),
            None => "built-in".to_string(),
        };
        println!(
            "  {} {}  {}  {:>4} XP  {}",
            marker,
            pad_display(&track.key, 12),
            pad_display(&track.title, 20),
            progress.xp,
            origin
        );
    }

    let orphaned: Vec<String> = store
        .stored_tracks()?
        .into_iter()
        .filter(|key| registry.get(key).is_none())
        .collect();
    if !orphaned.is_empty() {
        println!();
        println_colored!(DIM, "  Stored progress for tracks no longer configured: {}", orphaned.join(", "));
    }
    println!();
    Ok(())
}

// ─── Lessons ─────────────────────────────────────────────────────────────────

pub fn handle_lessons(config: &AppConfig, track: Option<&str>) -> Result<()> {
    let track = resolve_track(config, track);
    let engine = open_engine(config, &track)?;

    println!();
    println_colored!(GOLD, "  {} ({})", engine.catalog().title(), track);
    println!();
    for entry in engine.board() {
        let crown = if entry.crown { " 👑" } else { "" };
        let soon = if entry.playable { "" } else { "  (скоро)" };
        let line = format!(
            "  {} {:>2}. {} {}{:>4} XP{}{}",
            status_marker(entry.status),
            entry.id,
            entry.icon,
            pad_display(&entry.title, 28),
            entry.xp,
            crown,
            soon
        );
        match entry.status {
            LessonStatus::Completed => println_colored!(GREEN, "{}", line),
            LessonStatus::Current => println_colored!(BOLD, "{}", line),
            LessonStatus::Available => println!("{}", line),
            LessonStatus::Locked => println_colored!(DIM, "{}", line),
        }
    }
    println!();
    Ok(())
}

// ─── Play ────────────────────────────────────────────────────────────────────

pub fn handle_play(config: &AppConfig, track: Option<&str>, lesson: Option<LessonId>) -> Result<()> {
    let track = resolve_track(config, track);
    let mut engine = open_engine(config, &track)?;
    let lesson = lesson
        .or_else(|| engine.current_lesson())
        .ok_or_else(|| anyhow!("Track '{}' has no lessons", track))?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    run_lesson(&mut engine, lesson, &mut input, &mut out)
}

/// Drive one lesson from `input`. EOF or `q` closes the lesson without saving.
pub fn run_lesson<R: BufRead, W: Write>(
    engine: &mut ProgressEngine,
    lesson: LessonId,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let preview = match engine.select_lesson(lesson) {
        Ok(preview) => preview,
        Err(EngineError::LockedLesson(id)) => {
            writeln_colored!(out, AMBER, "  🔒 Lesson {} is locked. Finish the previous lesson first.", id);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    writeln!(out)?;
    writeln_colored!(out, GOLD, "  {} {}", preview.icon, preview.title);
    if !preview.description.is_empty() {
        writeln_colored!(out, DIM, "  {}", preview.description);
    }
    writeln!(out, "  {} XP  ·  {} questions", preview.xp, preview.question_count)?;
    if preview.completed {
        writeln_colored!(out, DIM, "  Already completed: replaying earns no XP");
    }
    if let Some(content) = &preview.content {
        writeln!(out)?;
        for line in content.lines() {
            writeln!(out, "  {}", line)?;
        }
    }
    writeln!(out)?;

    if prompt(input, out, "  Press Enter to start (q to close): ")?.is_none_or(|s| s == "q") {
        engine.abandon();
        writeln_colored!(out, DIM, "  Lesson closed, no progress saved");
        return Ok(());
    }

    let mut view = match engine.start_lesson() {
        Ok(view) => view,
        Err(EngineError::EmptyLesson(_)) => {
            engine.abandon();
            writeln_colored!(out, AMBER, "  This lesson has no questions yet. Coming soon!");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    loop {
        writeln!(out)?;
        writeln_colored!(out, BOLD, "  [{}/{}] {}", view.index + 1, view.total, view.prompt);
        for (i, option) in view.options.iter().enumerate() {
            writeln!(out, "    {}) {}", i + 1, option)?;
        }

        let feedback = loop {
            let Some(answer) = prompt(input, out, "  > ")? else {
                engine.abandon();
                writeln_colored!(out, DIM, "  Lesson closed, no progress saved");
                return Ok(());
            };
            if answer == "q" {
                engine.abandon();
                writeln_colored!(out, DIM, "  Lesson closed, no progress saved");
                return Ok(());
            }
            let Ok(choice) = answer.parse::<usize>() else {
                writeln_colored!(out, DIM, "  Enter a number between 1 and {}", view.options.len());
                continue;
            };
            match engine.submit_answer(choice.wrapping_sub(1)) {
                Ok(feedback) => break feedback,
                Err(EngineError::InvalidOptionIndex { count, .. }) => {
                    writeln_colored!(out, DIM, "  Enter a number between 1 and {}", count);
                }
                Err(e) => return Err(e.into()),
            }
        };

        if feedback.correct {
            writeln_colored!(out, GREEN, "  ✓ Верен отговор!");
        } else {
            let right = feedback
                .correct_option
                .and_then(|i| view.options.get(i))
                .map(String::as_str)
                .unwrap_or("-");
            writeln_colored!(out, RED, "  ✗ Грешен отговор. Верният отговор е: {}", right);
            if let Some(explanation) = &feedback.explanation {
                writeln_colored!(out, DIM, "  Обяснение: {}", explanation);
            }
        }

        match engine.next_question()? {
            Step::Question(next) => view = next,
            Step::Completed(outcome) => {
                let summary = outcome.summary;
                writeln!(out)?;
                writeln_colored!(out, GOLD, "  Урок завършен!");
                writeln!(
                    out,
                    "  Вие отговорихте правилно на {} от {} въпроси",
                    summary.correct_answers, summary.total_questions
                )?;
                if summary.newly_completed {
                    writeln_colored!(out, GREEN, "  +{} XP  ·  🔥 {}", summary.xp_earned, format_streak(summary.streak));
                } else {
                    writeln_colored!(out, DIM, "  Lesson was already completed: no XP this time");
                }
                if let Err(e) = &outcome.saved {
                    writeln_colored!(out, AMBER, "  ⚠ Progress could not be saved: {}", e);
                    match engine.retry_save() {
                        Ok(()) => writeln_colored!(out, GREEN, "  ✓ Saved on retry"),
                        Err(e) => {
                            writeln_colored!(out, RED, "  ✗ Retry failed: {}", e);
                            writeln_colored!(out, RED, "  This lesson's progress will be lost when you exit");
                        }
                    }
                }
                writeln!(out)?;
                engine.acknowledge_completion()?;
                return Ok(());
            }
        }
    }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(config: &AppConfig, track: Option<&str>) -> Result<()> {
    let track = resolve_track(config, track);
    let engine = open_engine(config, &track)?;
    let progress = engine.progress();
    let goal = engine.daily_goal(config.learner.daily_lesson_goal);
    let total_lessons = engine.catalog().lessons().len();

    println!();
    println_colored!(GOLD, "  Statistics: {}", engine.catalog().title());
    println!();
    println_colored!(BOLD, "  XP:         {}", progress.xp);
    println_colored!(AMBER, "  Streak:     🔥 {}", format_streak(progress.streak));
    println!(
        "  Lessons:    {}/{} completed",
        progress.completed_count(),
        total_lessons
    );
    if let Some(current) = engine.current_lesson().and_then(|id| engine.catalog().get(id)) {
        println!("  Next up:    {}. {}", current.id, current.title);
    }
    let bar = progress_bar(goal.done, goal.target, 12);
    if goal.is_reached() {
        println_colored!(GREEN, "  Goal:       {} {}/{} уроци ✓", bar, goal.done, goal.target);
    } else {
        println!("  Goal:       {} {}/{} уроци ({}%)", bar, goal.done, goal.target, goal.percent());
    }
    let xp_goal = config.learner.daily_xp_goal;
    let xp_done = progress.xp.min(u64::from(xp_goal)) as u32;
    println!(
        "  Quest:      {} Спечели {} XP ({}/{})",
        progress_bar(xp_done, xp_goal, 12),
        xp_goal,
        xp_done,
        xp_goal
    );
    if let Some(last) = progress.last_activity {
        println_colored!(DIM, "  Last activity: {}", last.format("%Y-%m-%d"));
    }
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ExportRecord<'a> {
    track: &'a str,
    title: &'a str,
    exported_on: String,
    progress: &'a ProgressState,
}

pub fn handle_export(config: &AppConfig, track: Option<&str>) -> Result<()> {
    let track = resolve_track(config, track);
    let engine = open_engine(config, &track)?;
    let record = ExportRecord {
        track: &track,
        title: engine.catalog().title(),
        exported_on: Local::now().date_naive().format("%Y-%m-%d").to_string(),
        progress: engine.progress(),
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

// ─── Reset ───────────────────────────────────────────────────────────────────

pub fn handle_reset(config: &AppConfig, track: Option<&str>, yes: bool) -> Result<()> {
    let track = resolve_track(config, track);
    if config.track_registry().get(&track).is_none() {
        return Err(anyhow!("Unknown track '{}'", track));
    }
    if !yes {
        let stdin = io::stdin();
        let answer = prompt(
            &mut stdin.lock(),
            &mut io::stdout(),
            &format!("  Erase all progress for '{}'? Type 'yes' to confirm: ", track),
        )?;
        if answer.as_deref() != Some("yes") {
            println!("  Cancelled.");
            return Ok(());
        }
    }
    open_store(config)?.reset(&track)?;
    log::info!("Progress reset for '{}'", track);
    println_colored!(GREEN, "  ✓ Progress for '{}' erased", track);
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if init {
        if path.exists() {
            println_colored!(DIM, "  Config already exists at {}", path.display());
        } else {
            config.save()?;
            log::info!("Wrote default config to {:?}", path);
            println_colored!(GREEN, "  ✓ Wrote {}", path.display());
        }
        return Ok(());
    }

    println!("# {}", path.display());
    println!("# database: {}", config.db_path()?.display());
    println!();
    print!("{}", toml::to_string_pretty(config).context("Serializing config")?);
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Returns `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<Option<String>> {
    write!(out, "{}", message)?;
    out.flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use matura::store::MemoryProgressStore;
    use std::io::Cursor;

    fn engine(store: MemoryProgressStore) -> ProgressEngine {
        let catalog = TrackRegistry::with_builtins().open("bulgarian").unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        ProgressEngine::open(catalog, Box::new(store), Clock::fixed(today)).unwrap()
    }

    fn run(engine: &mut ProgressEngine, lesson: u32, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run_lesson(engine, LessonId::new(lesson), &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn scripted_lesson_awards_xp() {
        let store = MemoryProgressStore::new();
        let mut engine = engine(store.clone());
        // Lesson 1: correct answers are options 3 and 2
        let output = run(&mut engine, 1, "\n3\n2\n");

        assert!(output.contains("Урок завършен!"));
        assert!(output.contains("+10 XP"));
        assert_eq!(store.load("bulgarian").unwrap().xp, 10);
    }

    #[test]
    fn wrong_answer_shows_explanation() {
        let mut engine = engine(MemoryProgressStore::new());
        let output = run(&mut engine, 1, "\n1\n2\n");
        assert!(output.contains("Обяснение: Информационната бележка трябва да бъде обективна"));
        assert!(output.contains("+5 XP"));
    }

    #[test]
    fn invalid_input_reprompts() {
        let mut engine = engine(MemoryProgressStore::new());
        let output = run(&mut engine, 1, "\nabc\n9\n3\n2\n");
        assert!(output.contains("Enter a number between 1 and 4"));
        assert_eq!(engine.progress().xp, 10);
    }

    #[test]
    fn eof_mid_lesson_saves_nothing() {
        let store = MemoryProgressStore::new();
        let mut engine = engine(store.clone());
        let output = run(&mut engine, 1, "\n3\n");
        assert!(output.contains("no progress saved"));
        assert_eq!(store.load("bulgarian").unwrap(), ProgressState::default());
    }

    #[test]
    fn failed_retry_warns_about_lost_progress() {
        let store = MemoryProgressStore::new();
        let mut engine = engine(store.clone());
        store.set_unavailable(true);
        let output = run(&mut engine, 1, "\n3\n2\n");

        assert!(output.contains("Progress could not be saved"));
        assert!(output.contains("Retry failed"));
        assert!(output.contains("will be lost when you exit"));
        assert_eq!(engine.progress().xp, 10);
    }

    #[test]
    fn locked_lesson_prints_message() {
        let mut engine = engine(MemoryProgressStore::new());
        let output = run(&mut engine, 4, "\n");
        assert!(output.contains("is locked"));
    }
}
