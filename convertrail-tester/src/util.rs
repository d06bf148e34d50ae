use anyhow::{Context, Result, bail};

use crate::logic::Strategy;

pub fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

pub fn parse_seeds(input: &str) -> Result<Vec<u64>> {
    let seeds = split_csv(input)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed: {token}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        bail!("no seeds given");
    }
    Ok(seeds)
}

/// `all` expands to every built-in strategy; duplicates are dropped.
pub fn parse_strategies(input: &str) -> Result<Vec<Strategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(input) {
        if token.eq_ignore_ascii_case("all") {
            strategies.extend(Strategy::ALL);
        } else {
            strategies.push(token.parse::<Strategy>().map_err(anyhow::Error::msg)?);
        }
    }
    strategies.sort();
    strategies.dedup();
    if strategies.is_empty() {
        bail!("no strategies given");
    }
    Ok(strategies)
}
