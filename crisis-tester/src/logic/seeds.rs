use std::collections::HashSet;
use std::sync::LazyLock;

use crisis_game::seed::WORD_LIST;
use crisis_game::{decode_to_seed, encode_friendly};
use regex::Regex;
use thiserror::Error;

pub const DEFAULT_SEED: u64 = 1337;

static RUN_CODE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^CR-[A-Z]+\d{2}$").ok());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("Unrecognized seed token: {0}")]
    Unrecognized(String),
    #[error("Unknown run code word in {0}")]
    UnknownCode(String),
}

/// Seed plus the run code it was given as, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, code: None }
    }

    #[must_use]
    pub const fn from_run_code(seed: u64, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
        }
    }

    /// Code to print next to results; numeric seeds get their derived code.
    #[must_use]
    pub fn run_code(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| encode_friendly(self.seed))
    }
}

#[must_use]
pub fn looks_like_run_code(token: &str) -> bool {
    let token = token.trim().to_ascii_uppercase();
    RUN_CODE.as_ref().is_some_and(|re| re.is_match(&token))
}

/// Resolve CLI seed tokens: integers, `CR-` run codes, or `all` for every
/// run code. Duplicates collapse onto the first occurrence; an empty list
/// falls back to [`DEFAULT_SEED`].
///
/// # Errors
///
/// Returns an error for tokens that are neither numbers nor known run codes.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>, SeedError> {
    let mut pending = Vec::new();
    let mut request_all = false;

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") {
            request_all = true;
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if looks_like_run_code(token) {
            let code = token.to_ascii_uppercase();
            let seed =
                decode_to_seed(&code).ok_or_else(|| SeedError::UnknownCode(code.clone()))?;
            pending.push(SeedInfo::from_run_code(seed, code));
            continue;
        }

        return Err(SeedError::Unrecognized(token.to_string()));
    }

    if request_all {
        pending.extend(all_run_code_seeds()?);
    }

    let mut seen = HashSet::new();
    pending.retain(|info| seen.insert(info.seed));

    if pending.is_empty() {
        pending.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }

    Ok(pending)
}

fn all_run_code_seeds() -> Result<Vec<SeedInfo>, SeedError> {
    let mut seeds = Vec::with_capacity(WORD_LIST.len() * 100);
    for word in WORD_LIST {
        for suffix in 0..100 {
            let code = format!("CR-{word}{suffix:02}");
            let seed =
                decode_to_seed(&code).ok_or_else(|| SeedError::UnknownCode(code.clone()))?;
            seeds.push(SeedInfo::from_run_code(seed, code));
        }
    }
    Ok(seeds)
}
