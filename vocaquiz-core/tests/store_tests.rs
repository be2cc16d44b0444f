use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::runtime::Handle;
use vocaquiz_core::{
    Card, CardId, CardStore, CoreError, DirectionMode, MemoryStore, NewCard, QuizSession,
    Schedule, StoreWriter,
};

#[tokio::test]
async fn add_rejects_blank_and_duplicate_cards() {
    let store = MemoryStore::new();
    store.add_card(NewCard::new("casa", "Haus")).await.unwrap();

    let blank = store.add_card(NewCard::new("  ", "Baum")).await;
    assert!(matches!(blank, Err(CoreError::Invalid(_))));

    let same_front = store.add_card(NewCard::new(" casa ", "Heim")).await;
    assert!(matches!(same_front, Err(CoreError::Conflict(_))));

    let same_back = store.add_card(NewCard::new("dimora", "Haus")).await;
    assert!(matches!(same_back, Err(CoreError::Conflict(_))));

    assert_eq!(store.load_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn load_all_keeps_insertion_order() {
    let store = MemoryStore::new();
    for (f, b) in [("uno", "eins"), ("due", "zwei"), ("tre", "drei")] {
        store.add_card(NewCard::new(f, b)).await.unwrap();
    }
    let fronts: Vec<String> = store
        .load_all()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.front)
        .collect();
    assert_eq!(fronts, vec!["uno", "due", "tre"]);
}

#[tokio::test]
async fn edit_keeps_schedule_and_checks_duplicates() {
    let store = MemoryStore::new();
    let a = store.add_card(NewCard::new("sole", "Sonne")).await.unwrap();
    store.add_card(NewCard::new("luna", "Mond")).await.unwrap();

    let reviewed = Schedule {
        repetitions: 2,
        interval: 6,
        ..Schedule::default()
    };
    store.persist(a.id, &reviewed).await.unwrap();

    let mut edited = a.clone();
    edited.back = " die Sonne ".into();
    edited.schedule = Schedule::default();
    let saved = store.update_card(&edited).await.unwrap();
    assert_eq!(saved.back, "die Sonne");
    assert_eq!(saved.schedule, reviewed);

    let mut clash = a.clone();
    clash.front = "luna".into();
    assert!(matches!(
        store.update_card(&clash).await,
        Err(CoreError::Conflict(_))
    ));
}

#[tokio::test]
async fn persist_and_delete_unknown_card() {
    let store = MemoryStore::new();
    let ghost = Card::new("x", "y");
    assert!(matches!(
        store.persist(ghost.id, &Schedule::default()).await,
        Err(CoreError::CardNotFound(_))
    ));
    assert!(matches!(
        store.delete_card(ghost.id).await,
        Err(CoreError::CardNotFound(_))
    ));
}

#[tokio::test]
async fn session_writes_reach_the_store() {
    let store = Arc::new(MemoryStore::new());
    for (f, b) in [("rosso", "rot"), ("verde", "grün")] {
        store.add_card(NewCard::new(f, b)).await.unwrap();
    }
    let cards = store.load_all().await.unwrap();
    let now = Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap();

    let mut writer = StoreWriter::new(store.clone(), Handle::current());
    let mut session = QuizSession::new(cards, DirectionMode::SourceToTarget, StdRng::seed_from_u64(3));
    for q in [5, 1] {
        session.reveal().unwrap();
        session.rate(q, now, &mut writer).unwrap();
    }
    assert_eq!(writer.issued(), 2);
    assert!(writer.flush().await.is_empty());

    let stored = store.load_all().await.unwrap();
    assert_eq!(stored[0].schedule.repetitions, 1);
    assert_eq!(stored[0].schedule.last_review, Some(now));
    assert_eq!(stored[1].schedule.repetitions, 0);
    assert!((stored[1].schedule.ease_factor - 1.96).abs() < 1e-9);
}

/// Records persist calls, rejects one card id and panics on another.
struct FlakyStore {
    inner: MemoryStore,
    reject: CardId,
    panic_on: Option<CardId>,
    calls: Mutex<Vec<CardId>>,
}

#[async_trait]
impl CardStore for FlakyStore {
    async fn load_all(&self) -> Result<Vec<Card>, CoreError> {
        self.inner.load_all().await
    }

    async fn persist(&self, id: CardId, schedule: &Schedule) -> Result<(), CoreError> {
        self.calls.lock().push(id);
        if id == self.reject {
            return Err(CoreError::Persistence("disk full".into()));
        }
        if Some(id) == self.panic_on {
            panic!("store crashed writing {id}");
        }
        self.inner.persist(id, schedule).await
    }

    async fn add_card(&self, draft: NewCard) -> Result<Card, CoreError> {
        self.inner.add_card(draft).await
    }

    async fn get_card(&self, id: CardId) -> Result<Card, CoreError> {
        self.inner.get_card(id).await
    }

    async fn update_card(&self, card: &Card) -> Result<Card, CoreError> {
        self.inner.update_card(card).await
    }

    async fn delete_card(&self, id: CardId) -> Result<(), CoreError> {
        self.inner.delete_card(id).await
    }
}

#[tokio::test]
async fn failed_write_is_reported_but_session_state_stands() {
    let cards = vec![Card::new("pane", "Brot"), Card::new("vino", "Wein")];
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::with_cards(cards.clone()),
        reject: cards[0].id,
        panic_on: None,
        calls: Mutex::new(Vec::new()),
    });
    let now = Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap();

    let mut writer = StoreWriter::new(store.clone(), Handle::current());
    let mut session = QuizSession::new(cards.clone(), DirectionMode::SourceToTarget, StdRng::seed_from_u64(0));
    for q in [4, 4] {
        session.reveal().unwrap();
        session.rate(q, now, &mut writer).unwrap();
    }

    let failures = writer.flush().await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, cards[0].id);
    assert!(matches!(failures[0].1, CoreError::Persistence(_)));

    // the rating still counts in memory
    assert_eq!(session.stats().total, 2);
    assert_eq!(session.results()[0].card.schedule.repetitions, 1);

    let mut calls = store.calls.lock().clone();
    calls.sort();
    let mut expected = vec![cards[0].id, cards[1].id];
    expected.sort();
    assert_eq!(calls, expected);
}

#[tokio::test]
async fn early_exit_does_not_cancel_issued_writes() {
    let cards = vec![Card::new("mare", "Meer"), Card::new("monte", "Berg")];
    let store = Arc::new(MemoryStore::with_cards(cards.clone()));
    let now = Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap();

    let mut writer = StoreWriter::new(store.clone(), Handle::current());
    let mut session = QuizSession::new(cards, DirectionMode::SourceToTarget, StdRng::seed_from_u64(0));
    session.reveal().unwrap();
    session.rate(5, now, &mut writer).unwrap();
    session.exit().unwrap();

    assert!(writer.flush().await.is_empty());
    let stored = store.load_all().await.unwrap();
    assert_eq!(stored[0].schedule.repetitions, 1);
    assert!(stored[1].schedule.is_new());
    assert_eq!(stored[1].schedule.last_review, None);
}

#[tokio::test]
async fn panicked_write_is_reported_for_its_card() {
    let cards = vec![
        Card::new("sale", "Salz"),
        Card::new("pepe", "Pfeffer"),
        Card::new("olio", "Öl"),
    ];
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::with_cards(cards.clone()),
        reject: cards[2].id,
        panic_on: Some(cards[1].id),
        calls: Mutex::new(Vec::new()),
    });
    let now = Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap();

    let mut writer = StoreWriter::new(store.clone(), Handle::current());
    let mut session = QuizSession::new(cards.clone(), DirectionMode::SourceToTarget, StdRng::seed_from_u64(0));
    for q in [5, 4, 3] {
        session.reveal().unwrap();
        session.rate(q, now, &mut writer).unwrap();
    }

    let mut failures = writer.flush().await;
    failures.sort_by_key(|(id, _)| *id);
    let mut expected = vec![cards[1].id, cards[2].id];
    expected.sort();
    let failed: Vec<CardId> = failures.iter().map(|(id, _)| *id).collect();
    assert_eq!(failed, expected);
    assert!(failures
        .iter()
        .all(|(_, e)| matches!(e, CoreError::Persistence(_))));

    let stored = store.inner.load_all().await.unwrap();
    assert_eq!(stored[0].schedule.repetitions, 1);
    assert!(stored[1].schedule.is_new());
}
