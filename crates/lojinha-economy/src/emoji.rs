/// Shown when a reaction product has no recognisable emoji in its name.
pub const FALLBACK_EMOJI: &str = "❓";

/// Code point ranges the bot can react with.
const REACTION_RANGES: &[(u32, u32)] = &[
    (0x1F300, 0x1F9FF),
    (0x2600, 0x26FF),
    (0x2700, 0x27BF),
    (0x1F1E0, 0x1F1FF),
    (0x2300, 0x23FF),
    (0x2B50, 0x2B50),
    (0x2B55, 0x2B55),
    (0x3030, 0x3030),
    (0x1F004, 0x1F004),
    (0x1F0CF, 0x1F0CF),
    (0x1F18E, 0x1F18E),
    (0x1F201, 0x1F201),
    (0x1F21A, 0x1F21A),
    (0x1F22F, 0x1F22F),
    (0x1F232, 0x1F236),
    (0x1F238, 0x1F23A),
    (0x1F250, 0x1F251),
];

fn is_reaction_char(c: char) -> bool {
    let cp = c as u32;
    REACTION_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// The reaction emoji of a product, taken from its name (`"Reaction 🔥"`).
pub fn extract_reaction_emoji(name: &str) -> String {
    name.chars()
        .find(|&c| is_reaction_char(c))
        .map(String::from)
        .unwrap_or_else(|| FALLBACK_EMOJI.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_emoji() {
        assert_eq!(extract_reaction_emoji("Reaction 🔥"), "🔥");
        assert_eq!(extract_reaction_emoji("😂 then 🔥"), "😂");
    }

    #[test]
    fn drops_variation_selector() {
        // U+2764 U+FE0F: only the base heart is in range.
        assert_eq!(extract_reaction_emoji("Heart ❤️"), "❤");
    }

    #[test]
    fn falls_back_without_emoji() {
        assert_eq!(extract_reaction_emoji("Plain name"), FALLBACK_EMOJI);
    }
}
