use crate::{find_duplicate, Card, CardId, CoreError, NewCard, Schedule, ScheduleUpdate};
use async_trait::async_trait;

pub mod memory;
pub mod writer;

pub use memory::MemoryStore;
pub use writer::StoreWriter;

/// Durable owner of the card collection.
///
/// `load_all` returns cards in insertion order.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Card>, CoreError>;
    async fn persist(&self, id: CardId, schedule: &Schedule) -> Result<(), CoreError>;

    // Editing
    async fn add_card(&self, draft: NewCard) -> Result<Card, CoreError>;
    async fn get_card(&self, id: CardId) -> Result<Card, CoreError>;
    async fn update_card(&self, card: &Card) -> Result<Card, CoreError>;
    async fn delete_card(&self, id: CardId) -> Result<(), CoreError>;
}

/// Receiver for schedule updates produced by a quiz session.
///
/// `issue` must start the write (or queue it) without blocking on completion.
pub trait ScheduleSink {
    fn issue(&mut self, update: ScheduleUpdate);
}

impl ScheduleSink for Vec<ScheduleUpdate> {
    fn issue(&mut self, update: ScheduleUpdate) {
        self.push(update);
    }
}

/// Validates a draft against the existing collection.
pub fn prepare_new(existing: &[Card], draft: NewCard) -> Result<Card, CoreError> {
    let card = draft.into_card()?;
    if find_duplicate(existing, &card.front, &card.back, None).is_some() {
        return Err(CoreError::Conflict("a card with this front or back already exists"));
    }
    Ok(card)
}

/// Validates an edited card and carries over the stored schedule and creation time.
pub fn prepare_edit(existing: &[Card], edited: &Card) -> Result<Card, CoreError> {
    let stored = existing
        .iter()
        .find(|c| c.id == edited.id)
        .ok_or(CoreError::CardNotFound(edited.id))?;
    let mut card = edited.clone().normalized()?;
    if find_duplicate(existing, &card.front, &card.back, Some(card.id)).is_some() {
        return Err(CoreError::Conflict("a card with this front or back already exists"));
    }
    card.schedule = stored.schedule.clone();
    card.created_at = stored.created_at;
    Ok(card)
}
