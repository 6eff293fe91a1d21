use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::{io, time::Duration};
use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use bouquet_stream::codec::decode_recipe;
use bouquet_stream::{Command, Engine, EngineError, FlowerKey, Size, Species};

const RECIPES_PER_ROUND: usize = 40;
const SPECIES_IN_PLAY: u64 = 12;

/// Pending flower counts per species, shared with the UI
#[derive(Default, Clone)]
struct InventorySnapshot {
    large: Vec<(char, u64)>,
    small: Vec<(char, u64)>,
    last_built: Vec<String>,
    /// Set once the engine thread has stopped on a fault
    fault: Option<String>,
}

struct SharedStats {
    flowers: AtomicU64,
    bouquets: AtomicU64,
    rounds: AtomicU64,
    catalogue_left: AtomicU64,
    avg_latency_ns: AtomicU64,
    snapshot: RwLock<InventorySnapshot>,
}

impl SharedStats {
    fn new() -> Self {
        Self {
            flowers: AtomicU64::new(0),
            bouquets: AtomicU64::new(0),
            rounds: AtomicU64::new(0),
            catalogue_left: AtomicU64::new(0),
            avg_latency_ns: AtomicU64::new(0),
            snapshot: RwLock::new(InventorySnapshot::default()),
        }
    }
}

/// Simple LCG for speed
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        // Use high 32 bits for better randomness (LCG low bits are poor)
        self.0 >> 32
    }
}

/// A fresh engine with a random catalogue, already past the separator
fn new_round(rng: &mut Lcg) -> Result<Engine, EngineError> {
    let mut engine = Engine::with_capacity(RECIPES_PER_ROUND);

    for i in 0..RECIPES_PER_ROUND {
        let size = if rng.next() % 2 == 0 { 'L' } else { 'S' };
        let mut code = format!("{}{}", (b'A' + (i % 26) as u8) as char, size);

        let mut species = b'a' + (rng.next() % 4) as u8;
        let mut sum = 0;
        for _ in 0..1 + rng.next() % 3 {
            let qty = 1 + rng.next() % 4;
            code.push_str(&format!("{}{}", qty, species as char));
            sum += qty;
            species += 1 + (rng.next() % 3) as u8;
        }
        code.push_str(&(sum + rng.next() % 6).to_string());

        engine.process_command(Command::Recipe(decode_recipe(&code)?))?;
    }

    engine.process_command(Command::Separator)?;
    Ok(engine)
}

/// Feed synthetic flowers forever, publishing stats; returns only on a fault
fn drive_engine(stats: &SharedStats) -> Result<(), EngineError> {
    let mut rng = Lcg(12345);
    let mut engine = new_round(&mut rng)?;
    let mut last_built: Vec<String> = Vec::new();
    let mut loop_count = 0u64;
    stats.rounds.store(1, Ordering::Relaxed);

    loop {
        const BATCH_SIZE: u64 = 200;
        let start_batch = std::time::Instant::now();

        for _ in 0..BATCH_SIZE {
            let r = rng.next();
            let Some(species) = Species::from_index((r % SPECIES_IN_PLAY) as usize) else {
                continue;
            };
            let size = if (r >> 8) % 2 == 0 { Size::Large } else { Size::Small };

            if let Some(built) = engine.process_command(Command::Flower(FlowerKey::new(species, size)))? {
                stats.bouquets.fetch_add(1, Ordering::Relaxed);
                last_built.insert(0, format!("{:<14} {}", built.code, built.allocation));
                last_built.truncate(8);
            }
        }

        loop_count += 1;

        stats.flowers.fetch_add(BATCH_SIZE, Ordering::Relaxed);
        let elapsed = start_batch.elapsed();
        stats
            .avg_latency_ns
            .store(elapsed.as_nanos() as u64 / BATCH_SIZE, Ordering::Relaxed);
        stats
            .catalogue_left
            .store(engine.catalogue().len() as u64, Ordering::Relaxed);

        if loop_count % 25 == 0 {
            if let Ok(mut write_guard) = stats.snapshot.write() {
                *write_guard = snapshot_of(&engine, &last_built);
            }
            // Slow down enough to watch the inventory move
            thread::sleep(Duration::from_millis(20));
        }

        // New round once every recipe has been built
        if engine.catalogue().is_empty() {
            engine = new_round(&mut rng)?;
            stats.rounds.fetch_add(1, Ordering::Relaxed);
        }
    }
}

fn snapshot_of(engine: &Engine, last_built: &[String]) -> InventorySnapshot {
    let counts = |size: Size| -> Vec<(char, u64)> {
        Species::all()
            .take(SPECIES_IN_PLAY as usize)
            .map(|s| (s.as_char(), engine.inventory().count_of(s, size)))
            .collect()
    };

    InventorySnapshot {
        large: counts(Size::Large),
        small: counts(Size::Small),
        last_built: last_built.to_vec(),
        fault: None,
    }
}

// Helper to generate the ASCII bar string
fn render_species_bars(counts: &[(char, u64)]) -> String {
    let mut out = String::new();
    let max_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1) as f32;

    for (species, count) in counts {
        // 20 chars max
        let bar_len = ((*count as f32 / max_count) * 20.0) as usize;
        let bar = "█".repeat(bar_len);
        out.push_str(&format!("{:>3} {:<20} {:<5}\n", species, bar, count));
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let stats = Arc::new(SharedStats::new());
    let stats_clone = stats.clone();

    // Spawn Engine Thread (Synthetic Flower Stream)
    thread::spawn(move || {
        if let Err(err) = drive_engine(&stats_clone) {
            if let Ok(mut write_guard) = stats_clone.snapshot.write() {
                write_guard.fault = Some(err.to_string());
            }
        }
    });

    // Run TUI Loop
    let mut last_flowers = 0;
    let mut last_time = std::time::Instant::now();
    let mut throughput = 0.0;

    loop {
        // Handle input
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.code == KeyCode::Char('q') {
                    break;
                }
            }
        }

        // Calculate throughput
        let now = std::time::Instant::now();
        if now.duration_since(last_time).as_secs_f64() >= 1.0 {
            let current = stats.flowers.load(Ordering::Relaxed);
            throughput = (current - last_flowers) as f64;
            last_flowers = current;
            last_time = now;
        }

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints(
                    [
                        Constraint::Length(3),  // Header
                        Constraint::Min(14),    // Inventory
                        Constraint::Length(10), // Recent bouquets
                        Constraint::Length(7),  // Stats
                    ]
                    .as_ref(),
                )
                .split(f.size());

            let snapshot = stats
                .snapshot
                .read()
                .map(|guard| guard.clone())
                .unwrap_or_default();

            // 1. Header
            let header = Block::default().borders(Borders::ALL).title("BOUQUET-STREAM Demo");
            let (status, color) = match &snapshot.fault {
                Some(fault) => (format!("Engine stopped: {} | Press 'q' to quit", fault), Color::Red),
                None => ("Synthetic flower stream | Press 'q' to quit".to_string(), Color::Cyan),
            };
            let title = Paragraph::new(status)
                .block(header)
                .alignment(Alignment::Center)
                .style(Style::default().fg(color));
            f.render_widget(title, chunks[0]);

            // 2. Inventory
            let inventory_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);

            let large_widget = Paragraph::new(render_species_bars(&snapshot.large)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("LARGE")
                    .style(Style::default().fg(Color::Green)),
            );
            let small_widget = Paragraph::new(render_species_bars(&snapshot.small)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("SMALL")
                    .style(Style::default().fg(Color::Magenta)),
            );
            f.render_widget(large_widget, inventory_chunks[0]);
            f.render_widget(small_widget, inventory_chunks[1]);

            // 3. Recent bouquets
            let recent = Paragraph::new(snapshot.last_built.join("\n")).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Recently Built"),
            );
            f.render_widget(recent, chunks[2]);

            // 4. Stats
            let stats_text = format!(
                "Throughput: {:.0} flowers/sec\nLatency (Avg Batch): {} ns\nBouquets Built: {}\nRound: {} ({} of {} recipes left)",
                throughput,
                stats.avg_latency_ns.load(Ordering::Relaxed),
                stats.bouquets.load(Ordering::Relaxed),
                stats.rounds.load(Ordering::Relaxed),
                stats.catalogue_left.load(Ordering::Relaxed),
                RECIPES_PER_ROUND,
            );

            let stats_block = Paragraph::new(stats_text)
                .block(Block::default().borders(Borders::ALL).title("Engine Telemetry"))
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(stats_block, chunks[3]);
        })?;
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bouquet_stream::Phase;

    #[test]
    fn test_new_round_is_ready_for_flowers() {
        let mut rng = Lcg(12345);
        for _ in 0..100 {
            let engine = new_round(&mut rng).unwrap();
            assert_eq!(engine.phase(), Phase::CollectingFlowers);
            assert_eq!(engine.catalogue().len(), RECIPES_PER_ROUND);
        }
    }

    #[test]
    fn test_synthetic_stream_never_faults() {
        // Same flower stream the engine thread generates, bounded
        let mut rng = Lcg(7);
        let mut engine = new_round(&mut rng).unwrap();
        for _ in 0..50_000 {
            let r = rng.next();
            let species = Species::from_index((r % SPECIES_IN_PLAY) as usize).unwrap();
            let size = if (r >> 8) % 2 == 0 { Size::Large } else { Size::Small };
            engine
                .process_command(Command::Flower(FlowerKey::new(species, size)))
                .unwrap();
            if engine.catalogue().is_empty() {
                engine = new_round(&mut rng).unwrap();
            }
        }
    }
}
