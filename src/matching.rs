// 🔗 Name Matching - Decide whether a game account and a community account
// belong to the same person
//
// Join key: the game HANDLE, i.e. the account name before the first '.',
// lower-cased. ("Test.1234" → "test")
//
// A community display name matches when, after lower-casing, stripping emoji
// and trimming, it is either:
//   1. exactly the handle          "Test"        ↔ "Test.1234"
//   2. contains "(handle)"         "nick (test)" ↔ "Test.1234"
//
// Nothing else counts: "test123" does NOT match "Test.1234".

/// Cross-system join key for a game account name.
///
/// Names without a '.' use the whole string.
pub fn handle(game_name: &str) -> String {
    let before_dot = game_name.split('.').next().unwrap_or(game_name);
    before_dot.to_lowercase()
}

/// Normalize a community display name for matching
pub fn normalize_display_name(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .filter(|c| !is_pictographic(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Does `community_display_name` denote the owner of `game_name`?
pub fn matches(game_name: &str, community_display_name: &str) -> bool {
    HandleMatcher::new(game_name).matches(community_display_name)
}

/// Symbol and emoji code points people decorate display names with.
///
/// Works on whole chars, so surrogate pairs never come into play; zero-width
/// joiners and variation selectors are included so multi-code-point emoji
/// sequences disappear entirely.
fn is_pictographic(c: char) -> bool {
    matches!(
        c as u32,
        0x200D                  // zero-width joiner
        | 0x2011..=0x26FF       // punctuation, arrows, misc technical, misc symbols
        | 0x2700..=0x27BF       // dingbats
        | 0xE000..=0xF8FF       // private use area
        | 0xFE00..=0xFE0F       // variation selectors
        | 0x1F000..=0x1F7FF     // tiles, cards, enclosed, pictographs, emoticons, transport
        | 0x1F900..=0x1F9FF     // supplemental symbols and pictographs
        | 0x1FA00..=0x1FAFF // chess symbols, extended pictographs
    )
}

// ============================================================================
// HANDLE MATCHER
// ============================================================================

/// Pre-computed matcher for one game account.
///
/// The engine builds one per game account and normalizes every community
/// name once, so matching a whole roster doesn't redo the string work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleMatcher {
    handle: String,
    parenthesized: String,
}

impl HandleMatcher {
    pub fn new(game_name: &str) -> Self {
        let handle = handle(game_name);
        let parenthesized = format!("({})", handle);
        HandleMatcher {
            handle,
            parenthesized,
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Match against a raw display name
    pub fn matches(&self, display_name: &str) -> bool {
        self.matches_normalized(&normalize_display_name(display_name))
    }

    /// Match against a name already passed through `normalize_display_name`
    pub fn matches_normalized(&self, normalized: &str) -> bool {
        normalized == self.handle || normalized.contains(&self.parenthesized)
    }
}

// ============================================================================
// TESTS
// ============================================================================
