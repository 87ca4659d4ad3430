use crate::ports::outbound::card_store::CardStore;

pub struct App<CS> {
    pub card_store: CS,
}

impl<CS> App<CS>
where
    CS: CardStore + Send + Sync,
{
    pub fn new(card_store: CS) -> Self {
        Self { card_store }
    }
}
