//! Leave budget policy: how many absence hours a subject's credit weight allows.

use crate::{CoreError, CoreResult};

/// Credit weights with a fixed budget. Anything else uses the fallback rate.
const LEAVE_TABLE: [(f64, u32); 4] = [(4.5, 13), (4.0, 11), (3.0, 9), (1.5, 6)];

/// Hours of leave granted per credit for weights missing from the table.
pub const FALLBACK_HOURS_PER_CREDIT: f64 = 3.0;

/// Rejects non-finite, zero and negative credit weights.
pub fn validate_credits(credits: f64) -> CoreResult<f64> {
    if !credits.is_finite() || credits <= 0.0 {
        return Err(CoreError::InvalidCredits(format!(
            "credits must be a positive number, got {credits}"
        )));
    }
    Ok(credits)
}

/// Maximum permitted absence hours for a subject worth `credits`.
pub fn max_leave_hours(credits: f64) -> CoreResult<u32> {
    let credits = validate_credits(credits)?;
    if let Some((_, hours)) = LEAVE_TABLE
        .iter()
        .find(|(weight, _)| (weight - credits).abs() < f64::EPSILON)
    {
        return Ok(*hours);
    }
    // `as` saturates, so absurdly large weights clamp to u32::MAX.
    Ok((credits * FALLBACK_HOURS_PER_CREDIT).floor() as u32)
}

/// Parses user-supplied hours, accepting only positive integers.
pub fn parse_hours(raw: &str) -> CoreResult<u32> {
    let trimmed = raw.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| CoreError::InvalidHours(format!("`{trimmed}` is not a whole number")))?;
    if value <= 0 {
        return Err(CoreError::InvalidHours(format!(
            "hours must be at least 1, got {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| CoreError::InvalidHours(format!("`{trimmed}` is too large")))
}

/// Parses a user-supplied credit weight.
pub fn parse_credits(raw: &str) -> CoreResult<f64> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| CoreError::InvalidCredits(format!("`{trimmed}` is not a number")))?;
    validate_credits(value)
}
