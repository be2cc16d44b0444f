use crate::cli::opts::*;
use crate::cli::quiz::{drive, print_summary, Console};
use crate::settings;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use uuid::Uuid;
use vocaquiz_core::{
    collection_stats, filter_due, filter_new, filter_review, order_by_priority, select_session,
    Card, CardId, CardStore, CoreError, DirectionMode, NewCard, QuizSession, SessionMode,
    SessionState, StoreWriter,
};
use vocaquiz_json::paths::{data_root, settings_file};
use vocaquiz_json::{JsonStore, Origin};

pub async fn run_cli(args: Cli) -> Result<()> {
    let root = args.data_dir.unwrap_or_else(data_root);
    match args.cmd {
        Command::Card(cmd) => card_cmd(open_store(&root).await?, cmd).await,
        Command::Quiz(cmd) => quiz_cmd(&root, open_store(&root).await?, cmd).await,
        Command::Stats => stats_cmd(open_store(&root).await?).await,
        Command::Config(cmd) => config_cmd(&root, cmd),
    }
}

pub async fn open_store(root: &Path) -> Result<Arc<dyn CardStore>> {
    let store = JsonStore::open_in(root).await?;
    if let Origin::Backup(from) = store.origin() {
        eprintln!(
            "note: {} was unreadable, restored from {}",
            store.path().display(),
            from.display()
        );
    }
    Ok(Arc::new(store))
}

async fn card_cmd(store: Arc<dyn CardStore>, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add(a) => {
            let mut draft = NewCard::new(a.front, a.back).with_tags(a.tags);
            if let Some(n) = a.notes {
                draft = draft.with_notes(n);
            }
            let c = store.add_card(draft).await?;
            println!("{}", c.id);
        }
        CardCmd::List { mode } => {
            let now = Utc::now();
            let cards = store.load_all().await?;
            let cards = match mode {
                None => cards,
                Some(ListFilter::Due) => order_by_priority(filter_due(&cards, now), now),
                Some(ListFilter::New) => filter_new(&cards),
                Some(ListFilter::Review) => order_by_priority(filter_review(&cards), now),
            };
            for c in cards {
                print_card(&c);
            }
        }
        CardCmd::Rm { card_id } => {
            let id = parse_uuid(&card_id)?;
            store.delete_card(id).await?;
            println!("ok");
        }
        CardCmd::Edit(e) => {
            let id = parse_uuid(&e.card_id)?;
            let mut card = store.get_card(id).await?;

            if let Some(f) = e.front {
                card.front = f;
            }
            if let Some(b) = e.back {
                card.back = b;
            }
            if e.clear_notes && e.notes.is_some() {
                bail!("cannot use --notes and --clear-notes together");
            } else if e.clear_notes {
                card.notes = None;
            } else if let Some(n) = e.notes {
                card.notes = Some(n);
            }

            card.tags.extend(e.add_tags);
            if !e.rm_tags.is_empty() {
                card.tags
                    .retain(|x| !e.rm_tags.iter().any(|r| x.eq_ignore_ascii_case(r.trim())));
            }

            store.update_card(&card).await?;
            println!("ok");
        }
    }
    Ok(())
}

fn print_card(c: &Card) {
    let tags = if c.tags.is_empty() {
        "-".to_string()
    } else {
        c.tags.join(";")
    };
    let next = c
        .schedule
        .next_review
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "new".to_string());
    println!(
        "{}\t{}\t{}\ttags={}\tnext={}\tef={:.2}\treps={}",
        c.id, c.front, c.back, tags, next, c.schedule.ease_factor, c.schedule.repetitions
    );
}

async fn quiz_cmd(root: &Path, store: Arc<dyn CardStore>, cmd: QuizCmd) -> Result<()> {
    let cfg = settings::load(root)?;
    let limit = cmd.limit.unwrap_or(cfg.cards_per_session);
    if limit == 0 {
        bail!("cards per session must be at least 1");
    }
    let direction = cmd.direction.map(DirectionMode::from).unwrap_or(cfg.direction);
    let mode = SessionMode::from(cmd.mode);
    let mut rng = match cmd.seed.or(cfg.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let cards = store.load_all().await?;
    let picked = select_session(&cards, mode, Utc::now(), limit, &mut rng);
    if picked.is_empty() {
        println!("no {mode} cards to quiz");
        return Ok(());
    }
    tracing::info!(%mode, cards = picked.len(), ?direction, "starting quiz");

    let mut writer = StoreWriter::new(store, Handle::current());
    let mut console = Console::stdio();
    let session = QuizSession::new(picked, direction, StdRng::seed_from_u64(rng.gen()));
    run_passes(session, &mut writer, &mut console, &mut rng).await
}

/// Runs the session and any repeat passes the user asks for. Issued writes are
/// flushed after every pass, including one cut short by a console error.
async fn run_passes<I: BufRead, W: Write>(
    mut session: QuizSession<StdRng>,
    writer: &mut StoreWriter,
    console: &mut Console<I, W>,
    rng: &mut StdRng,
) -> Result<()> {
    loop {
        let driven = drive(&mut session, writer, console, Utc::now)
            .and_then(|()| print_summary(&session, console.out()));
        report_failures(writer.flush().await);
        driven?;

        let wrong = session.wrong_answers().len();
        if session.state() != SessionState::Completed || wrong == 0 {
            return Ok(());
        }
        if !console.confirm(&format!("repeat {wrong} wrong answer(s)? [y/N] "))? {
            return Ok(());
        }
        session = session.spawn_repeat(StdRng::seed_from_u64(rng.gen()))?;
    }
}

fn report_failures(failures: Vec<(CardId, CoreError)>) {
    for (id, err) in &failures {
        tracing::warn!(card_id = %id, error = %err, "review not saved");
        eprintln!("warning: review of {id} was not saved: {err}");
    }
}

async fn stats_cmd(store: Arc<dyn CardStore>) -> Result<()> {
    let cards = store.load_all().await?;
    let s = collection_stats(&cards, Utc::now());
    println!("total\t{}", s.total);
    println!("learned\t{}", s.learned);
    println!("due\t{}", s.due);
    println!("unlearned\t{}", s.unlearned);
    Ok(())
}

fn config_cmd(root: &Path, cmd: ConfigCmd) -> Result<()> {
    let mut cfg = settings::load(root)?;
    match cmd {
        ConfigCmd::Show => {
            println!("# {}", settings_file(root).display());
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        ConfigCmd::Set(s) => {
            if s.seed.is_some() && s.clear_seed {
                bail!("cannot use --seed and --clear-seed together");
            }
            if let Some(limit) = s.limit {
                if limit == 0 {
                    bail!("cards per session must be at least 1");
                }
                cfg.cards_per_session = limit;
            }
            if let Some(d) = s.direction {
                cfg.direction = d.into();
            }
            if s.clear_seed {
                cfg.seed = None;
            } else if s.seed.is_some() {
                cfg.seed = s.seed;
            }
            settings::save(root, &cfg)?;
            println!("ok");
        }
    }
    Ok(())
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s.trim()).map_err(|_| anyhow!("invalid card id: {s}"))
}
