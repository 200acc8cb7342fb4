//! Constant product swap quotes and pro-rata share math

use crate::{QuoteError, BPS_SCALE};

/// Output amount for an exact-input swap against (reserve_in, reserve_out)
///
/// With fee on input:
/// - Δx_net = Δx_in · (1 - fee)
/// - Δy_out = (Δx_net · y0) / (x0 + Δx_net)
///
/// # Arguments
/// * `reserve_in` - Input-side reserve
/// * `reserve_out` - Output-side reserve
/// * `fee_bps` - Fee in basis points (e.g., 30 = 0.30%)
/// * `amount_in` - Exact input amount
pub fn quote_out(
    reserve_in: u128,
    reserve_out: u128,
    fee_bps: u128,
    amount_in: u128,
) -> Result<u128, QuoteError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(QuoteError::InvalidReserves);
    }
    if amount_in == 0 {
        return Err(QuoteError::InvalidAmount);
    }
    if fee_bps >= BPS_SCALE {
        return Err(QuoteError::InvalidAmount);
    }

    let in_with_fee = amount_in
        .checked_mul(BPS_SCALE - fee_bps)
        .ok_or(QuoteError::Overflow)?;
    let numerator = in_with_fee
        .checked_mul(reserve_out)
        .ok_or(QuoteError::Overflow)?;
    let denominator = reserve_in
        .checked_mul(BPS_SCALE)
        .ok_or(QuoteError::Overflow)?
        .checked_add(in_with_fee)
        .ok_or(QuoteError::Overflow)?;

    let amount_out = numerator / denominator;
    if amount_out == 0 {
        return Err(QuoteError::InsufficientLiquidity);
    }
    if amount_out >= reserve_out {
        return Err(QuoteError::InsufficientLiquidity);
    }
    Ok(amount_out)
}

/// Amounts actually consumed when adding liquidity at the pool ratio
///
/// For an empty pool both desired amounts are consumed; otherwise the
/// smaller-ratio side binds and the other side is scaled down to match,
/// so the pool ratio is preserved.
pub fn add_liquidity_amounts(
    reserve_a: u128,
    reserve_b: u128,
    amount_a_desired: u128,
    amount_b_desired: u128,
) -> Result<(u128, u128), QuoteError> {
    if amount_a_desired == 0 || amount_b_desired == 0 {
        return Err(QuoteError::InvalidAmount);
    }
    if reserve_a == 0 || reserve_b == 0 {
        return Ok((amount_a_desired, amount_b_desired));
    }

    let b_optimal = amount_a_desired
        .checked_mul(reserve_b)
        .ok_or(QuoteError::Overflow)?
        / reserve_a;
    if b_optimal <= amount_b_desired {
        if b_optimal == 0 {
            return Err(QuoteError::InvalidAmount);
        }
        return Ok((amount_a_desired, b_optimal));
    }

    let a_optimal = amount_b_desired
        .checked_mul(reserve_a)
        .ok_or(QuoteError::Overflow)?
        / reserve_b;
    if a_optimal == 0 {
        return Err(QuoteError::InvalidAmount);
    }
    Ok((a_optimal, amount_b_desired))
}

/// Pool shares minted for a deposit of (amount_a, amount_b)
///
/// First deposit mints √(a·b); later deposits mint pro rata against the
/// smaller side so depositors cannot mint shares above their
/// contribution.
pub fn shares_to_mint(
    share_supply: u128,
    reserve_a: u128,
    reserve_b: u128,
    amount_a: u128,
    amount_b: u128,
) -> Result<u128, QuoteError> {
    if amount_a == 0 || amount_b == 0 {
        return Err(QuoteError::InvalidAmount);
    }

    if share_supply == 0 {
        let product = amount_a.checked_mul(amount_b).ok_or(QuoteError::Overflow)?;
        let minted = isqrt(product);
        if minted == 0 {
            return Err(QuoteError::InvalidAmount);
        }
        return Ok(minted);
    }

    if reserve_a == 0 || reserve_b == 0 {
        return Err(QuoteError::InvalidReserves);
    }

    let by_a = amount_a
        .checked_mul(share_supply)
        .ok_or(QuoteError::Overflow)?
        / reserve_a;
    let by_b = amount_b
        .checked_mul(share_supply)
        .ok_or(QuoteError::Overflow)?
        / reserve_b;
    let minted = by_a.min(by_b);
    if minted == 0 {
        return Err(QuoteError::InvalidAmount);
    }
    Ok(minted)
}

/// Amounts withdrawn when burning `shares` against the current reserves
pub fn redeem_amounts(
    share_supply: u128,
    shares: u128,
    reserve_a: u128,
    reserve_b: u128,
) -> Result<(u128, u128), QuoteError> {
    if share_supply == 0 {
        return Err(QuoteError::InvalidReserves);
    }
    if shares == 0 || shares > share_supply {
        return Err(QuoteError::InvalidAmount);
    }

    let amount_a = shares
        .checked_mul(reserve_a)
        .ok_or(QuoteError::Overflow)?
        / share_supply;
    let amount_b = shares
        .checked_mul(reserve_b)
        .ok_or(QuoteError::Overflow)?
        / share_supply;
    Ok((amount_a, amount_b))
}

/// Integer square root (largest r with r·r <= n)
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_out_basic() {
        // Balanced 1M/1M pool, 0.30% fee, sell 10k
        let out = quote_out(1_000_000, 1_000_000, 30, 10_000).unwrap();

        // Below spot because of slippage + fee, but close to it
        assert!(out < 10_000);
        assert!(out > 9_800);
    }

    #[test]
    fn test_quote_out_invariant_grows_with_fee() {
        let x0: u128 = 1_000_000;
        let y0: u128 = 2_000_000;
        let dx: u128 = 50_000;
        let out = quote_out(x0, y0, 30, dx).unwrap();

        let k0 = x0 * y0;
        let k1 = (x0 + dx) * (y0 - out);
        assert!(k1 >= k0, "fees must not shrink the invariant");
    }

    #[test]
    fn test_quote_out_rejects_empty_pool_and_zero_input() {
        assert_eq!(
            quote_out(0, 1_000, 30, 10),
            Err(QuoteError::InvalidReserves)
        );
        assert_eq!(
            quote_out(1_000, 1_000, 30, 0),
            Err(QuoteError::InvalidAmount)
        );
    }

    #[test]
    fn test_quote_out_cannot_drain_pool() {
        // Input vastly larger than the pool still leaves the output
        // strictly inside the reserve
        let out = quote_out(1_000, 1_000, 0, u64::MAX as u128).unwrap();
        assert!(out < 1_000);
    }

    #[test]
    fn test_add_liquidity_empty_pool_takes_desired() {
        let (a, b) = add_liquidity_amounts(0, 0, 500, 700).unwrap();
        assert_eq!((a, b), (500, 700));
    }

    #[test]
    fn test_add_liquidity_matches_pool_ratio() {
        // Pool at 2:1; desired 100:100 must scale the B side down to 50
        let (a, b) = add_liquidity_amounts(2_000, 1_000, 100, 100).unwrap();
        assert_eq!((a, b), (100, 50));

        // Desired 100:20 binds on B; A side scales down to 40
        let (a, b) = add_liquidity_amounts(2_000, 1_000, 100, 20).unwrap();
        assert_eq!((a, b), (40, 20));
    }

    #[test]
    fn test_shares_first_deposit_is_geometric_mean() {
        assert_eq!(shares_to_mint(0, 0, 0, 400, 100).unwrap(), 200);
        assert_eq!(shares_to_mint(0, 0, 0, 1_000_000, 1_000_000).unwrap(), 1_000_000);
    }

    #[test]
    fn test_shares_pro_rata_uses_smaller_side() {
        // Supply 1000 over reserves 1000/1000; deposit 100/50 mints 50
        let minted = shares_to_mint(1_000, 1_000, 1_000, 100, 50).unwrap();
        assert_eq!(minted, 50);
    }

    #[test]
    fn test_redeem_is_pro_rata() {
        let (a, b) = redeem_amounts(1_000, 250, 4_000, 2_000).unwrap();
        assert_eq!((a, b), (1_000, 500));
    }

    #[test]
    fn test_redeem_rejects_over_burn() {
        assert_eq!(
            redeem_amounts(1_000, 1_001, 4_000, 2_000),
            Err(QuoteError::InvalidAmount)
        );
        assert_eq!(
            redeem_amounts(0, 1, 4_000, 2_000),
            Err(QuoteError::InvalidReserves)
        );
    }

    #[test]
    fn test_isqrt_edges() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(3), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(u128::from(u64::MAX)), 4_294_967_295);
    }
}
