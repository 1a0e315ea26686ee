//! Two timer-driven tasks; the first to finish cancels the other

use clap::Parser;
use stackless_examples::sleepers::{start_pair, SleepersConfig};
use stackless_runtime::{EventLoop, Scheduler};
use std::rc::Rc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sleepers")]
#[command(about = "Run two sleeping tasks on the stackless scheduler", long_about = None)]
struct Args {
    /// Nap length in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    interval_ms: u64,
    /// Naps taken by task A before it cancels task B
    #[arg(long, default_value_t = 3)]
    watcher: u32,
    /// Naps planned by task B
    #[arg(long, default_value_t = 10)]
    victim: u32,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    stackless_examples::init_logging("info");

    let config = SleepersConfig {
        interval: Duration::from_millis(args.interval_ms),
        watcher_iterations: args.watcher,
        victim_iterations: args.victim,
    };

    let reactor = Rc::new(EventLoop::new());
    let scheduler = Scheduler::new(reactor.clone());
    let (watcher, victim) = start_pair(&scheduler, &config)?;
    reactor.run()?;

    println!(
        "MAIN EXIT: A = {}, B = {}",
        watcher.return_code(),
        victim.return_code()
    );
    Ok(())
}
