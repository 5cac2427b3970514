/// Canonical form of a Wikimedia project path segment.
///
/// Lower-cases the input, drops the `.org` suffix and the `www.` prefix, so
/// `www.en.wikipedia.org`, `en.wikipedia.org` and `EN.Wikipedia` all become
/// `en.wikipedia`. Any string is accepted; an unknown project simply matches
/// no rows in storage.
pub fn normalize_project(raw: &str) -> String {
    raw.to_lowercase()
        .trim_end_matches(".org")
        .trim_start_matches("www.")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_project() {
        assert_eq!(normalize_project("en.wikipedia.org"), "en.wikipedia");
        assert_eq!(normalize_project("www.en.wikipedia.org"), "en.wikipedia");
        assert_eq!(normalize_project("en.wikipedia"), "en.wikipedia");
        assert_eq!(normalize_project("EN.Wikipedia.ORG"), "en.wikipedia");
        assert_eq!(normalize_project("commons.wikimedia.org"), "commons.wikimedia");
        assert_eq!(normalize_project("all-projects"), "all-projects");
        assert_eq!(normalize_project(""), "");
    }

    #[test]
    fn test_only_affixes_are_stripped() {
        // "org" or "www" in the middle of the name stays
        assert_eq!(normalize_project("www.org.wikipedia"), "org.wikipedia");
        assert_eq!(normalize_project("de.wikipedia.organic"), "de.wikipedia.organic");
        assert_eq!(normalize_project("wwwx.wikipedia.org"), "wwwx.wikipedia");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "en.wikipedia.org",
            "www.en.wikipedia.org",
            "WWW.www.fr.wiktionary.org.org",
            "www.org",
            "www..org",
            ".org",
            "mediawiki",
        ] {
            let once = normalize_project(raw);
            assert_eq!(normalize_project(&once), once, "input: {raw}");
        }
    }
}
