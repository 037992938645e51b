//! netfold - minimal CIDR lists from announced prefixes.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use netfold::aggregator::{aggregate, parse_batch};
use netfold::cli::{Cli, QueryType};
use netfold::fetcher::Fetcher;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let fetcher = Fetcher::new()?;
    let mut ipv4 = Vec::new();
    let mut ipv6 = Vec::new();
    let mut list_name = String::new();

    // Queries run sequentially; the first failure aborts the whole run so
    // we never emit rules built from a partial prefix set.
    match cli.query {
        QueryType::As => {
            list_name.push_str("as");
            for arg in &cli.resources {
                let asn: u32 = match arg.parse() {
                    Ok(asn) => asn,
                    Err(_) => {
                        warn!("Ignoring non-numeric AS number '{}'", arg);
                        continue;
                    }
                };
                let batch = fetcher.fetch_as_prefixes(asn).await?;
                ipv4.extend(batch.ipv4);
                ipv6.extend(batch.ipv6);
                list_name.push_str(&format!("-{}", asn));
            }
        }
        QueryType::Cc => {
            list_name.push_str("cc");
            for cc in &cli.resources {
                let batch = fetcher.fetch_country_prefixes(cc).await?;
                ipv4.extend(batch.ipv4);
                ipv6.extend(batch.ipv6);
                list_name.push_str(&format!("-{}", cc));
            }
        }
    }

    info!(
        "Found a total of {} IPv4 prefixes and {} IPv6 prefixes",
        ipv4.len(),
        ipv6.len()
    );

    let parsed = parse_batch(&ipv4)?;
    if parsed.discarded > 0 {
        info!(
            "Discarded {} prefixes longer than 24 bits",
            parsed.discarded
        );
    }

    let folded = aggregate(&parsed.prefixes);
    info!("Final list contains {} IPv4 prefixes", folded.len());

    print!("{}", cli.output.render(&list_name, &folded));
    Ok(())
}
