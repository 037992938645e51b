//! Rule renderers for the aggregated prefix list.
//!
//! Each renderer is a pure template: it takes a symbolic list name and the
//! final prefix list and produces firewall configuration text. Nothing here
//! touches the system; the output goes to stdout for the operator to review
//! or pipe into a shell.

use crate::prefix::Prefix;
use clap::ValueEnum;
use std::fmt::Write;

/// Supported rule output formats.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Linux iptables chains
    Ipt,
    /// Linux nftables table and chains
    Nft,
    /// BSD/macOS pf table
    Pf,
    /// JunOS policy-options prefix-list
    Junos,
    /// One CIDR per line
    Plain,
}

impl OutputFormat {
    /// Render the prefix list as configuration text for this format.
    pub fn render(&self, name: &str, prefixes: &[Prefix]) -> String {
        match self {
            OutputFormat::Ipt => render_iptables(name, prefixes),
            OutputFormat::Nft => render_nftables(name, prefixes),
            OutputFormat::Pf => render_pf(name, prefixes),
            OutputFormat::Junos => render_junos(name, prefixes),
            OutputFormat::Plain => render_plain(prefixes),
        }
    }
}

fn render_iptables(name: &str, prefixes: &[Prefix]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "iptables -F {name}-ingress");
    let _ = writeln!(out, "iptables -F {name}-egress");
    let _ = writeln!(out, "iptables -X {name}-ingress");
    let _ = writeln!(out, "iptables -X {name}-egress");
    let _ = writeln!(out, "iptables -N {name}-ingress");
    let _ = writeln!(out, "iptables -N {name}-egress");
    for prefix in prefixes {
        let _ = writeln!(out, "iptables -A {name}-ingress -s {prefix} -j DROP");
        let _ = writeln!(out, "iptables -A {name}-egress -d {prefix} -j DROP");
    }
    out
}

fn render_nftables(name: &str, prefixes: &[Prefix]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "nft add table ip {name}");
    let _ = writeln!(
        out,
        "nft add chain ip {name} input {{ type filter hook input priority 0 ; }}"
    );
    let _ = writeln!(
        out,
        "nft add chain ip {name} output {{ type filter hook output priority 0 ; }}"
    );
    for prefix in prefixes {
        let _ = writeln!(out, "nft add rule ip {name} input saddr {prefix} drop");
        let _ = writeln!(out, "nft add rule ip {name} output daddr {prefix} drop");
    }
    out
}

fn render_pf(name: &str, prefixes: &[Prefix]) -> String {
    let mut out = String::new();
    let _ = write!(out, "table <{name}> {{");
    for prefix in prefixes {
        let _ = write!(out, " {prefix}");
    }
    let _ = writeln!(out, " }}");
    let _ = writeln!(out, "block drop in quick from {{ <{name}> }} to any");
    let _ = writeln!(out, "block drop out quick from any to {{ <{name}> }}");
    out
}

fn render_junos(name: &str, prefixes: &[Prefix]) -> String {
    let mut out = String::new();
    let _ = write!(out, "set policy-options prefix-list {name} [ ");
    for prefix in prefixes {
        let _ = write!(out, "{prefix} ");
    }
    let _ = writeln!(out, "];");
    let _ = writeln!(
        out,
        "set firewall family inet filter {name} term prefix-match from prefix-list {name} then reject;"
    );
    let _ = writeln!(
        out,
        "set firewall family inet filter {name} term pass-through then accept;"
    );
    out
}

fn render_plain(prefixes: &[Prefix]) -> String {
    let mut out = String::new();
    for prefix in prefixes {
        let _ = writeln!(out, "{prefix}");
    }
    out
}
