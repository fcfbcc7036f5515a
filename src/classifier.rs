/// Offline keyword classifier used whenever no model answer is available
use crate::category::FALLBACK_LABEL;

/// Ordered (keywords, label) rules. The first rule with any keyword found in
/// the lowercased text wins, so order breaks ties.
const RULES: &[(&[&str], &str)] = &[
    (
        &[
            "github",
            "gitlab",
            "stackoverflow",
            "stack overflow",
            "programming",
            "developer",
            "source code",
            "compiler",
            "crates.io",
            "npm package",
            "pull request",
        ],
        "Development",
    ),
    (
        &[
            "facebook",
            "twitter",
            "instagram",
            "linkedin",
            "reddit",
            "mastodon",
            "tiktok",
            "social network",
        ],
        "Social",
    ),
    (
        &[
            "youtube", "netflix", "spotify", "twitch", "movie", "music", "streaming", "video game",
        ],
        "Entertainment",
    ),
    (
        &["news", "breaking", "headline", "journalism", "reuters", "bbc", "cnn"],
        "News",
    ),
    (
        &["amazon", "ebay", "shop", "cart", "checkout", "price", "discount"],
        "Shopping",
    ),
    (
        &["wikipedia", "course", "tutorial", "university", "lecture", "learn"],
        "Education",
    ),
    (
        &["bank", "stock", "invest", "crypto", "finance", "budget", "mortgage"],
        "Finance",
    ),
    (
        &["flight", "hotel", "booking", "airbnb", "travel", "itinerary"],
        "Travel",
    ),
    (
        &["jira", "slack", "confluence", "meeting", "calendar", "inbox", "spreadsheet"],
        "Work",
    ),
];

/// Map page text to a category label, or "Misc" when no rule matches
pub fn classify(text: &str) -> String {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(_, label)| *label)
        .unwrap_or(FALLBACK_LABEL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_single_rule() {
        assert_eq!(classify("Breaking: election results tonight"), "News");
        assert_eq!(classify("Watch the new MOVIE trailer"), "Entertainment");
        assert_eq!(classify("Cheap flight and hotel deals"), "Travel");
    }

    #[test]
    fn test_classify_first_rule_wins() {
        // matches Development and Social; Development comes first
        assert_eq!(classify("Trending GitHub repos shared on Reddit"), "Development");
        // matches Social and Shopping; Social comes first
        assert_eq!(classify("Reddit thread about shopping carts"), "Social");
    }

    #[test]
    fn test_classify_falls_back_to_misc() {
        assert_eq!(classify("lorem ipsum dolor"), FALLBACK_LABEL);
        assert_eq!(classify(""), FALLBACK_LABEL);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let text = "Quarterly budget meeting notes";
        assert_eq!(classify(text), classify(text));
        assert_eq!(classify(text), "Finance");
    }
}
