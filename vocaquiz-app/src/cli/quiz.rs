use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use vocaquiz_core::{CoreError, Direction, QuizSession, ScheduleSink, SessionState};

/// Line-oriented terminal I/O.
pub struct Console<I, W> {
    input: I,
    out: W,
}

impl Console<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<I: BufRead, W: Write> Console<I, W> {
    pub fn new(input: I, out: W) -> Self {
        Self { input, out }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Trimmed line, or `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let mut s = String::new();
        if self.input.read_line(&mut s)? == 0 {
            return Ok(None);
        }
        Ok(Some(s.trim().to_string()))
    }

    pub fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.read_line(prompt)?.unwrap_or_default();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}

fn arrow(d: Direction) -> &'static str {
    match d {
        Direction::SourceToTarget => "source → target",
        Direction::TargetToSource => "target → source",
    }
}

enum Step {
    Continue,
    Exit,
}

fn confirm_exit<R: Rng, I: BufRead, W: Write>(
    session: &mut QuizSession<R>,
    console: &mut Console<I, W>,
) -> Result<Step> {
    if console.confirm("quit? ratings so far are kept [y/N] ")? {
        session.exit()?;
        return Ok(Step::Exit);
    }
    Ok(Step::Continue)
}

/// Runs `session` until it completes or the user leaves.
///
/// End of input counts as an early exit.
pub fn drive<R, S, I, W>(
    session: &mut QuizSession<R>,
    sink: &mut S,
    console: &mut Console<I, W>,
    mut clock: impl FnMut() -> DateTime<Utc>,
) -> Result<()>
where
    R: Rng,
    S: ScheduleSink + ?Sized,
    I: BufRead,
    W: Write,
{
    let total = session.len();
    let label = if session.is_repeat_pass() { "repeat" } else { "quiz" };

    'cards: while let Some(i) = session.position() {
        let prompt = session.prompt().unwrap_or_default().to_string();
        writeln!(console.out(), "\n[{label} {}/{}] {}", i + 1, total, arrow(session.direction()))?;
        writeln!(console.out(), "Q: {prompt}")?;

        match console.read_line("[enter=show, q=quit] ")? {
            None => {
                session.exit()?;
                break;
            }
            Some(cmd) if cmd.eq_ignore_ascii_case("q") => {
                if let Step::Exit = confirm_exit(session, console)? {
                    break;
                }
                continue;
            }
            Some(_) => session.reveal()?,
        }
        let answer = session.answer().unwrap_or_default().to_string();
        writeln!(console.out(), "A: {answer}")?;

        loop {
            let Some(line) = console.read_line("rate 1-5 (h=hide, q=quit)> ")? else {
                session.exit()?;
                break 'cards;
            };
            if line.eq_ignore_ascii_case("h") {
                session.hide()?;
                continue 'cards;
            }
            if line.eq_ignore_ascii_case("q") {
                if let Step::Exit = confirm_exit(session, console)? {
                    break 'cards;
                }
                continue;
            }
            let Ok(q) = line.parse::<u8>() else {
                writeln!(console.out(), "enter a rating from 1 to 5, h, or q")?;
                continue;
            };
            match session.rate(q, clock(), sink) {
                Ok(schedule) => {
                    writeln!(console.out(), "→ next review in {} day(s)", schedule.interval)?;
                    continue 'cards;
                }
                Err(CoreError::InvalidQuality(_)) => {
                    writeln!(console.out(), "enter a rating from 1 to 5")?;
                }
                Err(CoreError::CardNotFound(id)) => {
                    writeln!(console.out(), "card {id} was removed, skipping")?;
                    continue 'cards;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

pub fn print_summary<R: Rng, W: Write>(session: &QuizSession<R>, out: &mut W) -> Result<()> {
    let stats = session.stats();
    if session.state() == SessionState::EarlyExit {
        writeln!(out, "\nstopped after {} of {} cards", stats.total, session.len())?;
    } else {
        writeln!(out, "\nsession complete")?;
    }
    writeln!(
        out,
        "correct {}/{} ({:.0}%), best streak {}",
        stats.correct,
        stats.total,
        stats.accuracy() * 100.0,
        stats.max_streak
    )?;
    let counts: Vec<String> = session
        .quality_counts()
        .nonzero()
        .map(|(q, n)| format!("{q}:{n}"))
        .collect();
    if !counts.is_empty() {
        writeln!(out, "ratings {}", counts.join("  "))?;
    }
    Ok(())
}
