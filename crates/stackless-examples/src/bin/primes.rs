//! Print the primes produced by a resumable generator

use clap::Parser;
use stackless_core::{Status, Step};
use stackless_examples::primes::primes;

#[derive(Parser)]
#[command(name = "primes")]
#[command(about = "Print primes yielded by a stackless generator", long_about = None)]
struct Args {
    /// Largest candidate to test
    #[arg(short, long, default_value_t = 13)]
    limit: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    stackless_examples::init_logging("warn");

    let mut generator = primes(args.limit);
    loop {
        match generator.resume() {
            Step::Yield(n) => println!("Number = {}", n),
            Step::Complete(Status::Ok) => break,
            Step::Complete(status) => anyhow::bail!("generator failed: {}", status),
        }
    }
    Ok(())
}
