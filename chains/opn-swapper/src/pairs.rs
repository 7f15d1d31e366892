use crate::config::SwapConfig;
use anyhow::{bail, Result};
use ethers::types::Address;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::info;

/// One side of a swap: the chain's native coin or an ERC-20 token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenRef {
    Native,
    Erc20(Address),
}

impl TokenRef {
    pub fn is_native(&self) -> bool {
        matches!(self, TokenRef::Native)
    }

    pub fn address(&self) -> Option<Address> {
        match self {
            TokenRef::Native => None,
            TokenRef::Erc20(a) => Some(*a),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    NativeToToken { token: Address },
    TokenToNative { token: Address },
    TokenToToken { from: Address, to: Address },
}

impl Route {
    /// Router path for this route. Native legs go through the wrapped token.
    pub fn path(&self, wrapped_native: Address) -> Vec<Address> {
        match *self {
            Route::NativeToToken { token } => vec![wrapped_native, token],
            Route::TokenToNative { token } => vec![token, wrapped_native],
            Route::TokenToToken { from, to } => vec![from, to],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPair {
    pub from: TokenRef,
    pub to: TokenRef,
    pub name: String,
    pub weight: u32,
}

impl SwapPair {
    pub fn new(from: TokenRef, to: TokenRef, name: impl Into<String>, weight: u32) -> Self {
        Self {
            from,
            to,
            name: name.into(),
            weight,
        }
    }

    /// `None` for native to native, which no router can execute.
    pub fn route(&self) -> Option<Route> {
        match (self.from, self.to) {
            (TokenRef::Native, TokenRef::Native) => None,
            (TokenRef::Native, TokenRef::Erc20(token)) => Some(Route::NativeToToken { token }),
            (TokenRef::Erc20(token), TokenRef::Native) => Some(Route::TokenToNative { token }),
            (TokenRef::Erc20(from), TokenRef::Erc20(to)) => Some(Route::TokenToToken { from, to }),
        }
    }
}

pub fn default_pairs(config: &SwapConfig) -> Vec<SwapPair> {
    let opnt = TokenRef::Erc20(config.opnt_address);
    let tusdt = TokenRef::Erc20(config.tusdt_address);
    let vintage = TokenRef::Erc20(config.vintage_address);

    vec![
        SwapPair::new(TokenRef::Native, opnt, "OPN -> OPNT", 90),
        SwapPair::new(TokenRef::Native, tusdt, "OPN -> tUSDT", 1),
        SwapPair::new(TokenRef::Native, vintage, "OPN -> VINTAGE", 1),
        SwapPair::new(opnt, TokenRef::Native, "OPNT -> OPN", 90),
        SwapPair::new(tusdt, TokenRef::Native, "tUSDT -> OPN", 1),
        SwapPair::new(vintage, TokenRef::Native, "VINTAGE -> OPN", 1),
    ]
}

/// Weighted-random pair picker.
#[derive(Debug, Clone)]
pub struct PairSelector {
    pairs: Vec<SwapPair>,
    dist: WeightedIndex<u32>,
}

impl PairSelector {
    pub fn new(pairs: Vec<SwapPair>) -> Result<Self> {
        if pairs.is_empty() {
            bail!("No swap pairs configured");
        }
        let weights: Vec<u32> = pairs
            .iter()
            .map(|p| {
                info!("Pair '{}': Weight {}", p.name, p.weight);
                p.weight
            })
            .collect();
        let dist = WeightedIndex::new(&weights)
            .map_err(|e| anyhow::anyhow!("Invalid pair weights: {}", e))?;
        Ok(Self { pairs, dist })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &SwapPair {
        &self.pairs[self.dist.sample(rng)]
    }

    pub fn pairs(&self) -> &[SwapPair] {
        &self.pairs
    }

    pub fn total_weight(&self) -> u32 {
        self.pairs.iter().map(|p| p.weight).sum()
    }
}
