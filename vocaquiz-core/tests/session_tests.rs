use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vocaquiz_core::{
    Card, CoreError, Direction, DirectionMode, QuizSession, ScheduleUpdate, SessionState,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 20, 18, 0, 0).unwrap()
}

fn deck() -> Vec<Card> {
    vec![
        Card::new("cane", "Hund"),
        Card::new("gatto", "Katze"),
        Card::new("uccello", "Vogel"),
    ]
}

fn session(cards: Vec<Card>) -> QuizSession<StdRng> {
    QuizSession::new(cards, DirectionMode::SourceToTarget, StdRng::seed_from_u64(1))
}

fn answer(s: &mut QuizSession<StdRng>, q: u8, sink: &mut Vec<ScheduleUpdate>) {
    s.reveal().unwrap();
    s.rate(q, now(), sink).unwrap();
}

#[test]
fn full_pass_records_every_card() {
    let cards = deck();
    let mut s = session(cards.clone());
    let mut sink: Vec<ScheduleUpdate> = Vec::new();

    for q in [5, 4, 3] {
        answer(&mut s, q, &mut sink);
    }

    assert_eq!(s.state(), SessionState::Completed);
    assert_eq!(s.results().len(), 3);
    assert_eq!(s.stats().total, 3);
    assert_eq!(s.stats().correct, 3);
    assert_eq!(s.stats().max_streak, 3);
    assert!(s.wrong_answers().is_empty());

    let issued: Vec<_> = sink.iter().map(|u| u.card_id).collect();
    let expected: Vec<_> = cards.iter().map(|c| c.id).collect();
    assert_eq!(issued, expected);
}

#[test]
fn lapse_on_second_card_feeds_repeat_pass() {
    let cards = deck();
    let mut s = session(cards.clone());
    let mut sink: Vec<ScheduleUpdate> = Vec::new();

    answer(&mut s, 4, &mut sink);
    answer(&mut s, 2, &mut sink);
    answer(&mut s, 5, &mut sink);

    let wrong = s.wrong_answers();
    assert_eq!(wrong.len(), 1);
    assert_eq!(wrong[0].id, cards[1].id);
    assert_eq!(wrong[0].schedule.repetitions, 0);
    assert_eq!(s.stats().streak, 1);
    assert_eq!(s.stats().max_streak, 1);

    let mut repeat = s.spawn_repeat(StdRng::seed_from_u64(2)).unwrap();
    assert!(repeat.is_repeat_pass());
    assert_eq!(repeat.len(), 1);
    assert_eq!(repeat.state(), SessionState::Presenting(0));
    assert_eq!(repeat.prompt(), Some("gatto"));

    // repeat ratings are scheduled like any other
    let mut repeat_sink: Vec<ScheduleUpdate> = Vec::new();
    answer(&mut repeat, 4, &mut repeat_sink);
    assert_eq!(repeat.state(), SessionState::Completed);
    assert_eq!(repeat_sink.len(), 1);
    assert_eq!(repeat_sink[0].card_id, cards[1].id);
    assert_eq!(repeat_sink[0].schedule.repetitions, 1);
    assert!((repeat_sink[0].schedule.ease_factor - 2.18).abs() < 1e-9);
}

#[test]
fn empty_session_completes_immediately() {
    let mut s = session(Vec::new());
    assert_eq!(s.state(), SessionState::Completed);
    assert!(s.results().is_empty());
    assert_eq!(s.prompt(), None);
    assert!(matches!(
        s.reveal(),
        Err(CoreError::InvalidTransition { .. })
    ));
    let repeat = s.spawn_repeat(StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(repeat.state(), SessionState::Completed);
}

#[test]
fn answer_only_visible_after_reveal() {
    let mut s = session(deck());
    assert_eq!(s.prompt(), Some("cane"));
    assert_eq!(s.answer(), None);

    s.reveal().unwrap();
    assert_eq!(s.state(), SessionState::RevealingAnswer(0));
    assert_eq!(s.answer(), Some("Hund"));

    s.hide().unwrap();
    assert_eq!(s.state(), SessionState::Presenting(0));
    assert_eq!(s.answer(), None);
}

#[test]
fn rating_before_reveal_is_rejected() {
    let mut s = session(deck());
    let mut sink: Vec<ScheduleUpdate> = Vec::new();
    let err = s.rate(4, now(), &mut sink).unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { action: "rate", .. }));
    assert_eq!(s.state(), SessionState::Presenting(0));
    assert!(sink.is_empty());
}

#[test]
fn invalid_quality_keeps_card_in_play() {
    let mut s = session(deck());
    let mut sink: Vec<ScheduleUpdate> = Vec::new();
    s.reveal().unwrap();

    for bad in [0, 6] {
        let err = s.rate(bad, now(), &mut sink).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuality(_)));
        assert_eq!(s.state(), SessionState::AwaitingRating(0));
    }
    assert!(sink.is_empty());
    assert!(s.results().is_empty());

    s.rate(3, now(), &mut sink).unwrap();
    assert_eq!(s.state(), SessionState::Presenting(1));
}

#[test]
fn early_exit_keeps_prior_ratings_only() {
    let mut s = session(deck());
    let mut sink: Vec<ScheduleUpdate> = Vec::new();

    answer(&mut s, 5, &mut sink);
    s.reveal().unwrap();
    s.exit().unwrap();

    assert_eq!(s.state(), SessionState::EarlyExit);
    assert_eq!(s.results().len(), 1);
    assert_eq!(sink.len(), 1);
    assert_eq!(s.remaining(), 0);
    assert!(s.exit().is_err());
    assert!(s.rate(4, now(), &mut sink).is_err());
    assert!(s.spawn_repeat(StdRng::seed_from_u64(0)).is_err());
}

#[test]
fn withdrawn_cards_are_skipped_without_scheduling() {
    let cards = deck();
    let mut s = session(cards.clone());
    let mut sink: Vec<ScheduleUpdate> = Vec::new();

    assert!(s.withdraw(cards[2].id));
    assert!(s.withdraw(cards[0].id));
    assert_eq!(s.remaining(), 1);
    s.reveal().unwrap();
    let err = s.rate(4, now(), &mut sink).unwrap_err();
    assert!(matches!(err, CoreError::CardNotFound(id) if id == cards[0].id));
    assert_eq!(s.state(), SessionState::Presenting(1));

    answer(&mut s, 4, &mut sink);
    assert_eq!(s.state(), SessionState::Completed);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0].card_id, cards[1].id);
    assert_eq!(s.results().len(), 1);

    assert!(!s.withdraw(cards[1].id));
}

#[test]
fn random_direction_is_pinned_by_seed() {
    let cards: Vec<Card> = (0..32)
        .map(|n| Card::new(format!("it{n}"), format!("de{n}")))
        .collect();

    let run = |seed: u64| {
        let mut s = QuizSession::new(cards.clone(), DirectionMode::Random, StdRng::seed_from_u64(seed));
        let mut sink: Vec<ScheduleUpdate> = Vec::new();
        let mut seen = Vec::new();
        while !s.state().is_terminal() {
            seen.push(s.direction());
            s.reveal().unwrap();
            s.rate(4, now(), &mut sink).unwrap();
        }
        seen
    };

    let a = run(99);
    assert_eq!(a, run(99));
    assert_eq!(a.len(), 32);
    assert!(a.contains(&Direction::SourceToTarget));
    assert!(a.contains(&Direction::TargetToSource));
}

#[test]
fn fixed_reverse_direction_prompts_back() {
    let mut s = QuizSession::new(deck(), DirectionMode::TargetToSource, StdRng::seed_from_u64(0));
    assert_eq!(s.prompt(), Some("Hund"));
    s.reveal().unwrap();
    assert_eq!(s.answer(), Some("cane"));
}
