//! CLI argument parsing with clap.

use crate::output::OutputFormat;
use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "netfold")]
#[command(author, version, about = "Collapse announced IPv4 prefixes into minimal CIDR lists")]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "ipt")]
    pub output: OutputFormat,

    /// Query prefixes by ASNs or ISO-3166 country codes
    #[arg(short, long, value_enum, default_value = "as")]
    pub query: QueryType,

    /// Output verbosity (0 = errors only, 1 = normal, 2 = extra, 3 = debug)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub verbosity: u8,

    /// AS numbers or two-letter country codes to query
    #[arg(required = true)]
    pub resources: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// Query announced prefixes per autonomous system number
    As,
    /// Query prefixes associated with a country code
    Cc,
}
