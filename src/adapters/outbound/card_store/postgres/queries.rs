pub const CARDS_BY_IDS: &str = r"
select card.id,
       card.name,
       card.normalised_name,
       card.category,
       card.subtypes,
       card.types,
       card.stage,
       card.regulation_mark,
       card.rarity,
       card.small_image
from card
where card.game = $1
  and card.id = any($2);
";

pub const CARDS_BY_NAMES: &str = r"
select distinct on (card.normalised_name) card.id,
                                          card.name,
                                          card.normalised_name,
                                          card.category,
                                          card.subtypes,
                                          card.types,
                                          card.stage,
                                          card.regulation_mark,
                                          card.rarity,
                                          card.small_image
from card
where card.game = $1
  and card.normalised_name = any($2)
order by card.normalised_name, card.release_date desc nulls last;
";
