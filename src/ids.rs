//! Sequential identifier minting.
//!
//! Workers get `W001`, `W002`, ... and tasks `T001`, `T002`, ...
//! The numeric part is padded to at least three digits and keeps growing
//! past `999` (`W1000`).

/// Minimum number of digits in a minted identifier.
pub const ID_WIDTH: usize = 3;

/// The two kinds of identifier the store hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Worker,
    Task,
}

impl IdKind {
    pub fn prefix(&self) -> char {
        match self {
            IdKind::Worker => 'W',
            IdKind::Task => 'T',
        }
    }
}

/// Format the identifier for a given counter value without advancing it.
pub fn format_id(kind: IdKind, value: u32) -> String {
    format!("{}{:0width$}", kind.prefix(), value, width = ID_WIDTH)
}

/// Highest counter value that can still be minted; `u32::MAX` is never
/// handed out so the counter always has a successor.
pub const MAX_ID_VALUE: u32 = u32::MAX - 1;

/// Mint a new identifier and advance the counter.
///
/// Returns `None`, leaving the counter alone, once the id space is used up.
pub fn mint_id(kind: IdKind, counter: &mut u32) -> Option<String> {
    let next = counter.checked_add(1)?;
    let id = format_id(kind, *counter);
    *counter = next;
    Some(id)
}

/// Numeric part of a well-formed identifier of `kind`.
///
/// Returns `None` for the wrong prefix, non-digits, or fewer than
/// [`ID_WIDTH`] digits.
pub fn parse_id(kind: IdKind, id: &str) -> Option<u32> {
    let digits = id.strip_prefix(kind.prefix())?;
    if digits.len() < ID_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
