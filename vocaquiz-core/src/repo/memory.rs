use crate::repo::{prepare_edit, prepare_new};
use crate::{Card, CardId, CoreError, NewCard, Schedule};
use async_trait::async_trait;
use parking_lot::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    cards: RwLock<Vec<Card>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with already-built cards, keeping their order.
    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: RwLock::new(cards),
        }
    }
}

#[async_trait]
impl crate::repo::CardStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<Card>, CoreError> {
        Ok(self.cards.read().clone())
    }

    async fn persist(&self, id: CardId, schedule: &Schedule) -> Result<(), CoreError> {
        let mut cards = self.cards.write();
        let Some(card) = cards.iter_mut().find(|c| c.id == id) else {
            return Err(CoreError::CardNotFound(id));
        };
        card.schedule = schedule.clone();
        Ok(())
    }

    async fn add_card(&self, draft: NewCard) -> Result<Card, CoreError> {
        let mut cards = self.cards.write();
        let card = prepare_new(&cards, draft)?;
        cards.push(card.clone());
        Ok(card)
    }

    async fn get_card(&self, id: CardId) -> Result<Card, CoreError> {
        self.cards
            .read()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(CoreError::CardNotFound(id))
    }

    async fn update_card(&self, card: &Card) -> Result<Card, CoreError> {
        let mut cards = self.cards.write();
        let updated = prepare_edit(&cards, card)?;
        if let Some(slot) = cards.iter_mut().find(|c| c.id == updated.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    async fn delete_card(&self, id: CardId) -> Result<(), CoreError> {
        let mut cards = self.cards.write();
        let before = cards.len();
        cards.retain(|c| c.id != id);
        if cards.len() == before {
            return Err(CoreError::CardNotFound(id));
        }
        Ok(())
    }
}
