//! Descriptor notation
//!
//! Parses heap descriptors like "3d6" and pool descriptors like "1d6+2d10".

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DiceError, Result};

/// `<count>d<facets>`, count optional ("d6" means "1d6")
static TERM_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d*)d(\d+)$").unwrap());

/// One term of a descriptor: `count` dice with `facets` sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceTerm {
    pub count: u32,
    pub facets: u32,
}

impl DiceTerm {
    pub fn new(count: u32, facets: u32) -> Self {
        Self { count, facets }
    }
}

impl FromStr for DiceTerm {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self> {
        parse_term(s)
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.facets)
    }
}

/// Parse a single heap descriptor like "3d6"
pub fn parse_term(term: &str) -> Result<DiceTerm> {
    let term = term.trim().to_lowercase();

    let caps = TERM_REGEX
        .captures(&term)
        .ok_or_else(|| DiceError::InvalidDescriptor(format!("expected <count>d<facets>, got '{}'", term)))?;

    let count_str = &caps[1];
    let count: u32 = if count_str.is_empty() {
        1
    } else {
        count_str
            .parse()
            .map_err(|_| DiceError::InvalidDescriptor(format!("invalid dice count: {}", count_str)))?
    };

    if count == 0 {
        return Err(DiceError::InvalidCount(0));
    }

    let facets: u32 = caps[2]
        .parse()
        .map_err(|_| DiceError::InvalidDescriptor(format!("invalid die facets: {}", &caps[2])))?;

    if facets == 0 {
        return Err(DiceError::InvalidFacets(0));
    }

    Ok(DiceTerm { count, facets })
}

/// Parse a pool descriptor like "1d6+2d10" into its terms, in written order
pub fn parse_descriptor(descriptor: &str) -> Result<Vec<DiceTerm>> {
    if descriptor.trim().is_empty() {
        return Err(DiceError::InvalidDescriptor("empty descriptor".to_string()));
    }

    descriptor.split('+').map(parse_term).collect()
}
