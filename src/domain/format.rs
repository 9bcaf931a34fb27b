//! Display formatting helpers: addresses, timestamps, token amounts

use alloy_primitives::U256;
use chrono::{DateTime, Local, TimeZone};

/// Sentinel rendered when the hygiene log has no entry for the account.
pub const NO_RECORD: &str = "기록 없음";

/// Shorten a hex string for display: first 6 chars + "..." + last 4.
/// Empty input stays empty. Works on any hash-like string, not just addresses.
pub fn shorten_address(addr: &str) -> String {
    if addr.is_empty() {
        return String::new();
    }
    let head: String = addr.chars().take(6).collect();
    let tail: String = addr
        .chars()
        .rev()
        .take(4)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}...{}", head, tail)
}

/// Render a unix-seconds timestamp as local `YYYY-MM-DD HH:mm`.
/// `None` and zero both mean "never recorded".
pub fn format_timestamp(ts: Option<u64>) -> String {
    match ts {
        None | Some(0) => NO_RECORD.to_string(),
        Some(secs) => match DateTime::from_timestamp(secs as i64, 0) {
            Some(utc) => render_datetime(utc.with_timezone(&Local)),
            // Out-of-range seconds cannot be a calendar date; show the raw value.
            None => secs.to_string(),
        },
    }
}

fn render_datetime<Tz: TimeZone>(dt: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Scale an integer token amount by `10^decimals` into a decimal string,
/// trimming trailing fractional zeros. Returns `None` when the decimals
/// count cannot be represented as a 256-bit power of ten; callers fall
/// back to the raw integer form.
pub fn format_units(amount: U256, decimals: u8) -> Option<String> {
    if decimals == 0 {
        return Some(amount.to_string());
    }
    // 10^78 no longer fits in 256 bits.
    if decimals > 77 {
        return None;
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let frac = amount % divisor;

    if frac.is_zero() {
        return Some(whole.to_string());
    }

    let frac_str = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    Some(format!("{}.{}", whole, trimmed))
}
