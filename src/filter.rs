//! Content policy applied to every examined post.

use serde::Deserialize;

use crate::wall::NormalizedPost;

/// Content policy from the `post_filter` section of the configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFilter {
    /// Literal, case-sensitive substrings that reject a post.
    #[serde(default)]
    pub restricted_words: Vec<String>,
    #[serde(default)]
    pub ad_allowed: bool,
    #[serde(default)]
    pub repost_allowed: bool,
}

impl PostFilter {
    /// Whether a post passes the content policy.
    ///
    /// Only the post's own text is scanned for restricted words; repost
    /// text is never checked.
    #[must_use]
    pub fn is_eligible(&self, post: &NormalizedPost) -> bool {
        if !self.ad_allowed && post.is_ad {
            return false;
        }
        if !self.repost_allowed && post.is_repost {
            return false;
        }
        !self
            .restricted_words
            .iter()
            .any(|word| post.text.contains(word.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str, is_ad: bool, is_repost: bool) -> NormalizedPost {
        NormalizedPost {
            text: text.to_string(),
            is_ad,
            is_repost,
            repost_text: is_repost.then(|| "shared spam".to_string()),
            ..NormalizedPost::default()
        }
    }

    fn policy(ad_allowed: bool, repost_allowed: bool, words: &[&str]) -> PostFilter {
        PostFilter {
            restricted_words: words.iter().map(ToString::to_string).collect(),
            ad_allowed,
            repost_allowed,
        }
    }

    #[test]
    fn test_truth_table() {
        for ad_allowed in [false, true] {
            for repost_allowed in [false, true] {
                for is_ad in [false, true] {
                    for is_repost in [false, true] {
                        for has_word in [false, true] {
                            let text = if has_word { "buy spam now" } else { "hello" };
                            let filter = policy(ad_allowed, repost_allowed, &["spam"]);
                            let expected = !((!ad_allowed && is_ad)
                                || (!repost_allowed && is_repost)
                                || has_word);
                            assert_eq!(
                                filter.is_eligible(&post(text, is_ad, is_repost)),
                                expected,
                                "ad_allowed={ad_allowed} repost_allowed={repost_allowed} \
                                 is_ad={is_ad} is_repost={is_repost} has_word={has_word}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_word_list_never_rejects_on_text() {
        let filter = policy(true, true, &[]);
        assert!(filter.is_eligible(&post("anything at all", false, false)));
    }

    #[test]
    fn test_restricted_word_is_case_sensitive_substring() {
        let filter = policy(true, true, &["spam"]);
        assert!(!filter.is_eligible(&post("this is spam content", false, false)));
        assert!(!filter.is_eligible(&post("antispamming", false, false)));
        assert!(filter.is_eligible(&post("this is SPAM content", false, false)));
    }

    #[test]
    fn test_repost_text_is_not_scanned() {
        let filter = policy(true, true, &["spam"]);
        let post = post("clean original", false, true);
        assert!(filter.is_eligible(&post));
    }
}
