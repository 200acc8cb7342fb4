//! Scenario parsing and execution
//!
//! A scenario file declares the token, the venue pools, and a list of
//! steps. Accounts are written either as `0x…` hex identifiers or as
//! small decimal aliases (`"1"`, `"2"`, …).

use anyhow::{anyhow, bail, Context as _, Result};
use colored::Colorize;
use ledger_model::Address;
use serde::Deserialize;
use std::path::Path;
use std::rc::Rc;
use sundial::testing::{ManualClock, ReferenceRouter};
use sundial::{SunToken, TokenConfig, DEFAULT_MINT_WINDOW_SECS};

const DEMO_SCENARIO: &str = include_str!("../scenarios/demo.toml");

#[derive(Debug, Deserialize)]
pub struct ScenarioFile {
    pub token: TokenSetup,
    #[serde(default)]
    pub pools: Vec<PoolSetup>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct TokenSetup {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    /// Whole tokens; scaled by 10^decimals at construction
    pub initial_supply: u64,
    pub deployer: String,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub router_id: Option<String>,
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u64,
    #[serde(default)]
    pub mint_window_secs: Option<u64>,
}

fn default_decimals() -> u8 {
    0
}

fn default_fee_bps() -> u64 {
    30
}

#[derive(Debug, Deserialize)]
pub struct PoolSetup {
    pub token_b: String,
    pub reserve_a: u64,
    pub reserve_b: u64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Transfer { from: String, to: String, amount: u64 },
    Approve { owner: String, spender: String, amount: u64 },
    TransferFrom { spender: String, from: String, to: String, amount: u64 },
    Mint { caller: String, to: String, amount: u64 },
    TransferOwnership { caller: String, to: String },
    Swap { caller: String, amount_in: u64, amount_out_min: u64, token_out: String },
    AddLiquidity {
        caller: String,
        token_b: String,
        amount_a_desired: u64,
        amount_b_desired: u64,
        #[serde(default)]
        amount_a_min: u64,
        #[serde(default)]
        amount_b_min: u64,
    },
    RemoveLiquidity {
        caller: String,
        token_b: String,
        liquidity: u64,
        #[serde(default)]
        amount_a_min: u64,
        #[serde(default)]
        amount_b_min: u64,
    },
    Advance { secs: u64 },
    AssertBalance { account: String, amount: u64 },
    AssertLpBalance { account: String, amount: u64 },
    AssertSupply { amount: u64 },
}

/// Parse `0x…` hex or a small decimal alias into an account identifier
fn parse_account(text: &str) -> Result<Address> {
    if let Ok(addr) = text.parse::<Address>() {
        return Ok(addr);
    }
    let alias: u64 = text
        .parse()
        .map_err(|_| anyhow!("not an address or alias: {text}"))?;
    Ok(Address::from_low_u64(alias))
}

struct Context {
    token: SunToken,
    clock: Rc<ManualClock>,
}

fn build(setup: TokenSetup, pools: Vec<PoolSetup>) -> Result<Context> {
    let deployer = parse_account(&setup.deployer)?;
    let token_id = match &setup.token_id {
        Some(text) => parse_account(text)?,
        None => Address::from_low_u64(0xA0),
    };
    let router_id = match &setup.router_id {
        Some(text) => parse_account(text)?,
        None => Address::from_low_u64(0xB0),
    };

    let router = Rc::new(ReferenceRouter::new(u128::from(setup.fee_bps)));
    for pool in &pools {
        let token_b = parse_account(&pool.token_b)?;
        router
            .seed_pool(token_id, token_b, u128::from(pool.reserve_a), u128::from(pool.reserve_b))
            .map_err(|err| anyhow!("seeding pool failed: {err}"))?;
    }

    let clock = Rc::new(ManualClock::new(1_000));
    let config = TokenConfig {
        name: setup.name,
        symbol: setup.symbol,
        decimals: setup.decimals,
        initial_supply: u128::from(setup.initial_supply),
        token_id,
        router_id,
        mint_window_secs: setup.mint_window_secs.unwrap_or(DEFAULT_MINT_WINDOW_SECS),
    };
    let token = SunToken::new(config, deployer, router, clock.clone())
        .map_err(|err| anyhow!("token construction failed: {err}"))?;

    println!(
        "{} {} ({}) supply={} owner={}",
        "created".green().bold(),
        token.name(),
        token.symbol(),
        token.total_supply(),
        token.owner(),
    );

    Ok(Context { token, clock })
}

fn run_step(ctx: &Context, step: &Step) -> Result<String> {
    let token = &ctx.token;
    match step {
        Step::Transfer { from, to, amount } => {
            let (from, to) = (parse_account(from)?, parse_account(to)?);
            token.transfer(from, to, u128::from(*amount))?;
            Ok(format!("transfer {amount} {from} -> {to}"))
        }
        Step::Approve { owner, spender, amount } => {
            let (owner, spender) = (parse_account(owner)?, parse_account(spender)?);
            token.approve(owner, spender, u128::from(*amount))?;
            Ok(format!("approve {spender} for {amount} of {owner}"))
        }
        Step::TransferFrom { spender, from, to, amount } => {
            let spender = parse_account(spender)?;
            let (from, to) = (parse_account(from)?, parse_account(to)?);
            token.transfer_from(spender, from, to, u128::from(*amount))?;
            Ok(format!("transfer_from {amount} {from} -> {to} via {spender}"))
        }
        Step::Mint { caller, to, amount } => {
            let (caller, to) = (parse_account(caller)?, parse_account(to)?);
            token.mint(caller, to, u128::from(*amount))?;
            Ok(format!("mint {amount} to {to}"))
        }
        Step::TransferOwnership { caller, to } => {
            let (caller, to) = (parse_account(caller)?, parse_account(to)?);
            token.transfer_ownership(caller, to)?;
            Ok(format!("ownership -> {to}"))
        }
        Step::Swap { caller, amount_in, amount_out_min, token_out } => {
            let caller = parse_account(caller)?;
            let token_out = parse_account(token_out)?;
            let path = [token.token_id(), token_out];
            let amounts =
                token.swap_tokens_for_tokens(caller, u128::from(*amount_in), u128::from(*amount_out_min), &path)?;
            let received = amounts.last().copied().unwrap_or(0);
            Ok(format!("swap {amount_in} -> {received} for {caller}"))
        }
        Step::AddLiquidity {
            caller,
            token_b,
            amount_a_desired,
            amount_b_desired,
            amount_a_min,
            amount_b_min,
        } => {
            let caller = parse_account(caller)?;
            let token_b = parse_account(token_b)?;
            let receipt = token.add_liquidity(
                caller,
                token_b,
                u128::from(*amount_a_desired),
                u128::from(*amount_b_desired),
                u128::from(*amount_a_min),
                u128::from(*amount_b_min),
            )?;
            Ok(format!(
                "add_liquidity consumed {}/{} minted {} shares",
                receipt.amount_a, receipt.amount_b, receipt.liquidity
            ))
        }
        Step::RemoveLiquidity {
            caller,
            token_b,
            liquidity,
            amount_a_min,
            amount_b_min,
        } => {
            let caller = parse_account(caller)?;
            let token_b = parse_account(token_b)?;
            let receipt = token.remove_liquidity(
                caller,
                token_b,
                u128::from(*liquidity),
                u128::from(*amount_a_min),
                u128::from(*amount_b_min),
            )?;
            Ok(format!(
                "remove_liquidity {} shares -> {}/{}",
                liquidity, receipt.amount_a, receipt.amount_b
            ))
        }
        Step::Advance { secs } => {
            ctx.clock.advance(*secs);
            Ok(format!("clock +{secs}s"))
        }
        Step::AssertBalance { account, amount } => {
            let account = parse_account(account)?;
            let actual = token.balance_of(account);
            if actual != u128::from(*amount) {
                bail!("balance of {account} is {actual}, expected {amount}");
            }
            Ok(format!("balance {account} == {amount}"))
        }
        Step::AssertLpBalance { account, amount } => {
            let account = parse_account(account)?;
            let actual = token.lp_balance_of(account);
            if actual != u128::from(*amount) {
                bail!("lp balance of {account} is {actual}, expected {amount}");
            }
            Ok(format!("lp balance {account} == {amount}"))
        }
        Step::AssertSupply { amount } => {
            let actual = token.total_supply();
            if actual != u128::from(*amount) {
                bail!("total supply is {actual}, expected {amount}");
            }
            Ok(format!("supply == {amount}"))
        }
    }
}

fn execute(ctx: &Context, steps: &[Step]) -> Result<()> {
    for (i, step) in steps.iter().enumerate() {
        match run_step(ctx, step) {
            Ok(line) => println!("  {} {line}", format!("[{i:>2}]").dimmed()),
            Err(err) => {
                println!(
                    "  {} {}",
                    format!("[{i:>2}]").dimmed(),
                    format!("{err:#}").red()
                );
                return Err(err.context(format!("step {i} failed")));
            }
        }
    }
    Ok(())
}

fn print_final(ctx: &Context) {
    println!("{}", "final state".bold());
    println!("  total supply: {}", ctx.token.total_supply());
    for (account, balance) in ctx.token.ledger_snapshot().balances() {
        println!("  balance {account} = {balance}");
    }
    for (account, shares) in ctx.token.lp_ledger_snapshot().balances() {
        println!("  lp shares {account} = {shares}");
    }
}

fn run(mut file: ScenarioFile) -> Result<()> {
    let steps = std::mem::take(&mut file.steps);
    let pools = std::mem::take(&mut file.pools);
    log::debug!("scenario: {} pools, {} steps", pools.len(), steps.len());
    let ctx = build(file.token, pools)?;
    execute(&ctx, &steps)?;
    print_final(&ctx);
    println!("{}", "scenario complete".green().bold());
    Ok(())
}

/// Run a scenario from a TOML file
pub fn run_file(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let file: ScenarioFile =
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    run(file)
}

/// Run the built-in demo scenario
pub fn run_demo() -> Result<()> {
    let file: ScenarioFile = toml::from_str(DEMO_SCENARIO)?;
    run(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_accepts_hex_and_aliases() {
        assert_eq!(parse_account("7").unwrap(), Address::from_low_u64(7));
        assert_eq!(
            parse_account("0x00000000000000000000000000000000000000ff").unwrap(),
            Address::from_low_u64(0xff)
        );
        assert!(parse_account("bogus").is_err());
    }

    #[test]
    fn test_demo_scenario_parses_and_runs() {
        let file: ScenarioFile = toml::from_str(DEMO_SCENARIO).unwrap();
        assert!(!file.steps.is_empty());
        run(file).unwrap();
    }
}
