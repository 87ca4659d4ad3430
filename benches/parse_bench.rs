use criterion::{criterion_group, criterion_main, Bencher, Criterion};

use deckcheck::domain::classifier;
use deckcheck::domain::game::Game;
use deckcheck::domain::parser;

const LIVE_EXPORT: &str = "Pokémon: 12
4 Pikachu ex SVI 63
3 Raichu PAL 67
2 Radiant Greninja ASR 46
3 Bidoof CRZ 111

Trainer: 36
4 Iono PAL 185
4 Professor's Research SVI 189
4 Ultra Ball SVI 196
4 Nest Ball SVI 181
3 Boss's Orders PAL 172
4 Rare Candy SVI 191
4 Switch Cart ASR 154
4 Battle VIP Pass FST 225
4 Level Ball BST 129
1 Prime Catcher TEF 157

Energy: 12
12 Basic {L} Energy SVE 4

Total Cards: 60";

fn bench(c: &mut Criterion) {
    c.bench_function("Classify live export", |b: &mut Bencher| {
        b.iter(|| classifier::classify(LIVE_EXPORT))
    });

    c.bench_function("Parse live export", |b: &mut Bencher| {
        b.iter(|| parser::parse(LIVE_EXPORT, Game::Pokemon))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets = bench
}

criterion_main!(benches);
