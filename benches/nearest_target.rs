use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use proximity_combat::core::config::CombatConfig;
use proximity_combat::core::types::{EntityId, Position};
use proximity_combat::perception::EntitySet;
use proximity_combat::simulation::World;

fn ring(count: usize, radius: f32) -> Vec<Position> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            Position::new(angle.cos() * radius, 0.0, angle.sin() * radius)
        })
        .collect()
}

fn bench_nearest_to(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_to");
    for count in [8usize, 64, 512] {
        let positions = ring(count, 8.0);
        let ids: Vec<EntityId> = (0..count).map(|_| EntityId::new()).collect();
        let mut set = EntitySet::new(EntityId::new());
        for &id in &ids {
            set.add(id);
        }
        let lookup = |e: EntityId| ids.iter().position(|&id| id == e).map(|i| positions[i]);

        group.bench_with_input(BenchmarkId::from_parameter(count), &set, |b, set| {
            b.iter(|| set.nearest_to(black_box(Position::new(1.0, 0.0, 0.5)), lookup))
        });
    }
    group.finish();
}

fn bench_world_tick(c: &mut Criterion) {
    let mut world = World::new(CombatConfig::default(), 0);
    for (i, pos) in ring(64, 6.0).into_iter().enumerate() {
        world.spawn_combatant(format!("fighter-{i}"), pos, 0);
    }

    c.bench_function("world_tick_64", |b| b.iter(|| world.tick(black_box(1.0 / 60.0))));
}

criterion_group!(benches, bench_nearest_to, bench_world_tick);
criterion_main!(benches);
