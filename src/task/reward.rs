use rand::Rng;

use super::{TaskError, check_probability};

/// Bernoulli draw: 1 with probability `p`, else 0.
///
/// Compares one uniform `[0, 1)` sample against `p`, so `p = 0` never pays
/// out and `p = 1` always does.
pub fn sample_reward<R: Rng + ?Sized>(rng: &mut R, p: f64) -> Result<u8, TaskError> {
    let p = check_probability("p_reward", p)?;
    let u: f64 = rng.random();
    Ok(u8::from(u < p))
}
