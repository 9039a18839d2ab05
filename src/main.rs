//! Solana Vanity Address Generator CLI
//!
//! Usage:
//!   sol_vanity -p Sol              # Find address starting with "Sol" (any case)
//!   sol_vanity -s pump -c          # Find address ending with exactly "pump"
//!   sol_vanity -p ab -s yz -w 8    # Both affixes, 8 worker threads

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{unbounded, RecvTimeoutError};
use log::{info, warn};

use sol_vanity::{Config, Ed25519Keys, MatchResult, SearchCoordinator, SearchEvent, SessionHandle};

/// How often the event loop wakes up to check for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Estimated durations above this trigger a warning before the search starts.
const LONG_SEARCH_WARNING: Duration = Duration::from_secs(600);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let pattern = config.pattern();
    let num_workers = config.worker_count();
    let estimate = pattern.estimated_duration(num_workers);

    // Print startup info
    println!("Solana Vanity Address Generator");
    println!("===============================");
    println!("Pattern:    {}", pattern);
    println!("Difficulty: {}", pattern.difficulty_description());
    println!("Estimate:   ~{}", format_duration(estimate));
    println!("Workers:    {}", num_workers);
    println!();

    if estimate > LONG_SEARCH_WARNING {
        warn!(
            "a {}-character pattern could take approximately {} with {} worker(s); \
             the actual time may vary significantly",
            pattern.len(),
            format_duration(estimate),
            num_workers
        );
    }

    let mut coordinator = SearchCoordinator::new(Ed25519Keys).with_batch_size(config.batch_size);
    let (event_tx, event_rx) = unbounded();

    let session = match coordinator.start(pattern, num_workers, event_tx) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Set up ctrl-c handler
    let interrupted = Arc::new(AtomicBool::new(false));
    ctrlc_handler(interrupted.clone());

    println!("Searching... (Press Ctrl+C to stop)\n");

    let report_interval = Duration::from_secs(config.report_interval);
    let mut last_report = Instant::now();
    let mut failed = false;

    loop {
        match event_rx.recv_timeout(POLL_INTERVAL) {
            Ok(SearchEvent::Progress { .. }) | Err(RecvTimeoutError::Timeout) => {}
            Ok(SearchEvent::Complete(result)) => {
                print_result(&result, &session);
                break;
            }
            Ok(SearchEvent::Error(e)) => {
                eprintln!("Error: {}", e);
                failed = true;
                break;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }

        // Check if we should stop (ctrl-c was pressed)
        if interrupted.load(Ordering::Relaxed) {
            coordinator.stop(&session);
            // A match can land while stopping; it is still readable from the handle.
            match session.result() {
                Some(result) => print_result(result, &session),
                None => println!("\nStopped by user."),
            }
            break;
        }

        if last_report.elapsed() >= report_interval {
            print_progress(&session);
            last_report = Instant::now();
        }
    }

    coordinator.stop(&session);
    info!("session {} ended: {:?}", session.id(), session.state());

    // Print final stats
    println!("\n--- Final Statistics ---");
    println!("Total keys generated: {}", format_number(session.total_attempts()));
    println!("Time elapsed:         {:.2}s", session.elapsed().as_secs_f64());
    println!(
        "Average speed:        {}/s",
        format_number(session.keys_per_second() as u64)
    );

    if failed {
        process::exit(1);
    }
}

fn print_result(result: &MatchResult, session: &SessionHandle) {
    println!("=== Match found ===");
    println!("Address:     {}", result.public_key);
    println!("Secret Key:  {}", result.secret_key_hex());
    println!("Attempts:    {}", format_number(result.total_attempts));
    println!("Worker:      {}", result.worker_id);
    println!("Time:        {:.2}s", session.elapsed().as_secs_f64());
    println!();
}

fn print_progress(session: &SessionHandle) {
    let keys = session.total_attempts();
    let rate = session.keys_per_second();
    let elapsed = session.elapsed().as_secs();

    println!(
        "[{:>4}s] Generated {} keys ({}/s)",
        elapsed,
        format_number(keys),
        format_number(rate as u64)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs > 3600.0 {
        format!("{:.1} hours", secs / 3600.0)
    } else if secs > 60.0 {
        format!("{:.1} minutes", secs / 60.0)
    } else {
        format!("{:.1} seconds", secs)
    }
}

fn ctrlc_handler(interrupted: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        interrupted.store(true, Ordering::Relaxed);
    }) {
        warn!("could not install Ctrl-C handler: {}", e);
    }
}
