use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wsresolve::dns::{HostResolver, RaceStrategy, ResolutionConfig};

/// Resolves a host through the full pipeline and prints which tier answered.
///
/// Usage: cargo run --example resolve_host -- <host> [port] [static-ip...]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wsresolve=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "example.com".to_string());
    let port: u16 = match args.next() {
        Some(p) => p.parse()?,
        None => 443,
    };

    // 1. Configuration
    let config = ResolutionConfig::new()
        .query_timeout(Duration::from_secs(3))
        .probe_timeout(Duration::from_millis(1000))
        .race_strategy(RaceStrategy::FirstCompleted);
    let resolver = HostResolver::with_config(config)?;

    // 2. Optional operator overrides
    for ip in args {
        resolver.add_static_host(&host, &ip)?;
    }

    // 3. Resolve
    let started = std::time::Instant::now();
    match resolver.resolve_with_tier(&host, port).await {
        Ok((addr, tier)) => println!(
            "{} -> {} via {} tier in {:?}",
            host,
            addr,
            tier,
            started.elapsed()
        ),
        Err(e) => println!("{} unresolved ({}): {}", host, e.as_i32(), e),
    }

    Ok(())
}
