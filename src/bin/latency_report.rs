use bouquet_stream::codec::decode_recipe;
use bouquet_stream::{Command, Engine, FlowerKey, Size, Species};
use hdrhistogram::Histogram;
use std::time::Instant;

/// Simple LCG; quality is irrelevant, determinism is not
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        // High 32 bits (LCG low bits are poor)
        self.0 >> 32
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

/// Recipe code with 1-3 distinct species and a few spare slots
fn synthetic_recipe(rng: &mut Lcg, group: u8) -> String {
    let size = if rng.below(2) == 0 { 'L' } else { 'S' };
    let mut code = format!("{}{}", (b'A' + group % 26) as char, size);

    let mut species = b'a' + rng.below(10) as u8;
    let mut sum = 0;
    for _ in 0..1 + rng.below(3) {
        let qty = 1 + rng.below(3);
        code.push_str(&format!("{}{}", qty, species as char));
        sum += qty;
        species += 1 + rng.below(4) as u8;
    }
    code.push_str(&(sum + rng.below(5)).to_string());
    code
}

fn main() {
    println!("Preparing Latency Benchmark...");

    const RECIPES: u64 = 200_000;
    const ITERATIONS: u64 = 1_000_000;

    let mut rng = Lcg(0x5EED);
    let mut engine = Engine::with_capacity(RECIPES as usize);

    for i in 0..RECIPES {
        let recipe = decode_recipe(&synthetic_recipe(&mut rng, i as u8))
            .expect("synthetic recipes are well formed");
        engine
            .process_command(Command::Recipe(recipe))
            .expect("recipe accepted");
    }
    engine
        .process_command(Command::Separator)
        .expect("separator accepted");

    let mut histogram = Histogram::<u64>::new_with_bounds(1, 10_000_000, 3).unwrap();

    println!("Running {} iterations against {} recipes...", ITERATIONS, RECIPES);

    let mut built = 0u64;
    let mut total_duration = std::time::Duration::new(0, 0);

    for _ in 0..ITERATIONS {
        let species = Species::from_index(rng.below(16) as usize).unwrap();
        let size = if rng.below(2) == 0 { Size::Large } else { Size::Small };
        let cmd = Command::Flower(FlowerKey::new(species, size));

        // Critical measurement section
        let start = Instant::now();
        let result = std::hint::black_box(engine.process_command(cmd));
        let elapsed = start.elapsed();

        if matches!(result, Ok(Some(_))) {
            built += 1;
        }

        // Outliers past the upper bound are dropped rather than panicking
        histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
        total_duration += elapsed;
    }

    println!("\n=== Latency Report (ns) ===");
    println!("Total Ops:  {}", ITERATIONS);
    println!("Bouquets:   {}", built);
    println!("Unbuilt:    {}", engine.catalogue().len());
    println!("Throughput: {:.2} ops/sec", ITERATIONS as f64 / total_duration.as_secs_f64());
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
    println!("---------------------------");

    println!("\nDistribution:");
    for v in histogram.iter_log(100, 2.0) {
        let count = v.count_since_last_iteration();
        if count > 0 {
            println!("<= {:8} ns: {:10} count", v.value_iterated_to(), count);
        }
    }
}
