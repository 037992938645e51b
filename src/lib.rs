//! # netfold - minimal CIDR lists from announced prefixes
//!
//! netfold queries all network prefixes announced by a list of autonomous
//! systems (or associated with ISO-3166 alpha-2 country codes), aggregates
//! adjacent prefixes into less specific ones, drops prefixes already covered
//! by a less specific one, and renders the resulting minimal prefix list as
//! firewall configuration.
//!
//! ## Architecture
//!
//! ```text
//! CLI (clap)
//!   └── Fetcher (reqwest + rustls)  - RIPEstat announced-prefixes /
//!       │                             country-resource-list queries
//!   └── Aggregator
//!       ├── prefix - CIDR parsing, /24 length bound, rendering
//!       └── trie   - flat marker-byte trie: insert, sibling merge,
//!                    redundancy elimination, leaf collection
//!   └── Output - iptables / nftables / pf / JunOS / plain templates
//! ```
//!
//! The aggregation core is purely sequential: one exclusively owned trie
//! store is mutated by the insert, merge and eliminate passes in strict
//! depth order, then scanned once to collect the final list. Prefix-source
//! queries are fail-fast: the first failed query aborts the run with no
//! partial output. IPv6 prefixes are fetched and counted but intentionally
//! never aggregated or rendered.
//!
//! ## Example
//!
//! ```no_run
//! use netfold::aggregator::{aggregate, parse_batch};
//! use netfold::fetcher::Fetcher;
//! use netfold::output::OutputFormat;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = Fetcher::new()?;
//!     let batch = fetcher.fetch_as_prefixes(3333).await?;
//!     let parsed = parse_batch(&batch.ipv4)?;
//!     let folded = aggregate(&parsed.prefixes);
//!     print!("{}", OutputFormat::Plain.render("as-3333", &folded));
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod cli;
pub mod error;
pub mod fetcher;
pub mod output;
pub mod prefix;
pub mod trie;

pub use aggregator::aggregate;
pub use error::NetfoldError;
pub use prefix::Prefix;
