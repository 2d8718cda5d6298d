//! Example: Analyze a note list and print the chord progression
//!
//! Usage: `cargo run --example analyze_notes -- [notes.json] [window-size|auto]`
//!
//! The JSON file holds an array of `{"pitch", "start", "end", "velocity"}`
//! objects. Without a file a short built-in progression is analyzed.

use stratum_chords::preprocessing::NoteFilter;
use stratum_chords::{analyze_notes, AnalysisConfig, NoteEvent, NoteSequence, WindowSize};

fn demo_notes() -> Result<NoteSequence, Box<dyn std::error::Error>> {
    // Am - F - C - G, two seconds each
    let chords: [[u8; 3]; 4] = [[57, 60, 64], [53, 57, 60], [48, 52, 55], [55, 59, 62]];
    let mut notes = Vec::new();
    for (i, chord) in chords.iter().enumerate() {
        let start = i as f32 * 2.0;
        for &pitch in chord {
            notes.push(NoteEvent::new(pitch, start, start + 2.0, 90)?);
        }
    }
    Ok(NoteSequence::new(notes))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let notes = match args.first() {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let notes: Vec<NoteEvent> = serde_json::from_str(&text)?;
            NoteSequence::new(notes)
        }
        None => demo_notes()?,
    };

    let window_size: WindowSize = match args.get(1) {
        Some(arg) => arg.parse()?,
        None => WindowSize::Auto,
    };

    // Configure analysis
    let config = AnalysisConfig {
        window_size,
        note_filter: NoteFilter::transcription_cleanup(),
        ..Default::default()
    };

    // Analyze
    let result = analyze_notes(&notes, config)?;

    // Print results
    println!("Chord progression:");
    for event in &result.chords {
        println!("  {}", event);
    }
    println!();
    println!(
        "Key: {} (confidence: {:.2})",
        result.key.key(),
        result.key.confidence
    );
    for (key, r) in result.key.ranked.iter().skip(1) {
        println!("  alternative: {} (r = {:.3})", key, r);
    }
    println!();
    println!("Chord play counts:");
    for (name, count) in result.summary.most_played() {
        println!("  {}: {}x", name, count);
    }
    println!();
    println!("  Window size: {:.2}s ({} windows)", result.metadata.window_size, result.metadata.window_count);
    println!("  Average confidence: {:.2}", result.summary.average_confidence);
    println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);
    for warning in &result.metadata.confidence_warnings {
        println!("  Warning: {}", warning);
    }

    Ok(())
}
