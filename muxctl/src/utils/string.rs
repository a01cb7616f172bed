// SPDX-License-Identifier: MIT

/// `1536` -> `"1.5 KiB"`, `512` -> `"512 B"`.
pub fn pretty_bytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut val = n as f64;
    let mut idx = 0usize;
    while val >= 1024.0 && idx + 1 < UNITS.len() {
        val /= 1024.0;
        idx += 1;
    }
    if idx == 0 {
        format!("{n} {}", UNITS[0])
    } else {
        format!("{val:.1} {}", UNITS[idx])
    }
}

/// Parses a byte count with an optional `K`, `M` or `G` suffix (powers of 1024).
pub fn parse_bytes(s: &str) -> anyhow::Result<u64> {
    let lower = s.trim().to_ascii_lowercase();
    let (num, shift) = if let Some(n) = lower.strip_suffix('k') {
        (n, 10)
    } else if let Some(n) = lower.strip_suffix('m') {
        (n, 20)
    } else if let Some(n) = lower.strip_suffix('g') {
        (n, 30)
    } else {
        (lower.as_str(), 0)
    };
    let value: u64 = num
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid size '{s}'. Use a number with K, M or G suffix."))?;
    value
        .checked_mul(1u64 << shift)
        .ok_or_else(|| anyhow::anyhow!("Size '{s}' is too large"))
}
