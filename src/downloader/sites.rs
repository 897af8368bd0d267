// Site detection and smart referer headers
//
// Two independent lookups:
// - detect_website(): URL -> category badge (anime, youtube, social, ...)
// - resolve_referer(): embedded video host -> Referer/Origin to send
//
// Both are plain substring/regex searches over the raw input; nothing here
// parses the URL, so malformed input simply falls through.

use regex::{Regex, RegexBuilder};

use super::models::{SiteCategory, SiteInfo};

/// One row of the site table
#[derive(Debug, Clone, Copy)]
pub struct SiteRule {
    /// Regex source, matched case-insensitively anywhere in the URL
    pub pattern: &'static str,
    pub name: &'static str,
    pub referer: &'static str,
}

const fn rule(pattern: &'static str, name: &'static str, referer: &'static str) -> SiteRule {
    SiteRule {
        pattern,
        name,
        referer,
    }
}

/// Category groups in priority order. The first matching rule wins, so a URL
/// hitting patterns from two groups resolves to the group listed first.
pub const SITE_RULES: &[(SiteCategory, &[SiteRule])] = &[
    (
        SiteCategory::Anime,
        &[
            rule(r"gogoanime|anitaku|gogoanimehd", "GogoAnime", "https://gogoanimehd.to/"),
            rule(r"animepahe", "AnimePahe", "https://animepahe.ru/"),
            rule(r"9animetv|aniwave", "9Anime/AniWave", "https://9animetv.to/"),
            rule(r"zoro|aniwatch|hianime", "HiAnime", "https://hianime.to/"),
        ],
    ),
    (
        SiteCategory::Youtube,
        &[rule(r"youtube\.com|youtu\.be", "YouTube", "https://www.youtube.com/")],
    ),
    (
        SiteCategory::Dailymotion,
        &[rule(r"dailymotion\.com|dai\.ly", "Dailymotion", "https://www.dailymotion.com/")],
    ),
    (
        SiteCategory::Bilibili,
        &[rule(r"bilibili\.com|bilibili\.tv", "Bilibili", "https://www.bilibili.com/")],
    ),
    (
        SiteCategory::Social,
        &[
            rule(r"facebook\.com|fb\.watch", "Facebook", "https://www.facebook.com/"),
            rule(r"instagram\.com", "Instagram", "https://www.instagram.com/"),
            rule(r"tiktok\.com", "TikTok", "https://www.tiktok.com/"),
            rule(r"twitter\.com|x\.com", "Twitter/X", "https://twitter.com/"),
        ],
    ),
    (
        SiteCategory::Movie,
        &[
            rule(r"fmovies", "FMovies", "https://fmoviesz.to/"),
            rule(r"solarmovie", "SolarMovie", "https://solarmovie.pe/"),
            rule(r"123movies", "123Movies", "https://123movies.ai/"),
            rule(r"putlocker", "Putlocker", "https://putlocker.pe/"),
        ],
    ),
    (
        SiteCategory::Drama,
        &[
            rule(r"dramacool|asianc|watchasian", "Dramacool", "https://dramacool.pa/"),
            rule(r"kissasian", "KissAsian", "https://kissasian.lu/"),
            rule(r"myasiantv", "MyAsianTV", "https://myasiantv.ac/"),
            rule(r"viewasian", "ViewAsian", "https://viewasian.co/"),
        ],
    ),
];

/// CDN/embed hosts that reject hot-linked requests without a referer
pub const VIDEO_HOSTS: &[&str] = &[
    "haildrop",
    "vidstream",
    "filemoon",
    "vizcloud",
    "simpleimage",
    "rainveil",
    "fogtwist",
    "lightning",
    "sunshine",
    "sunburst",
    "gogocdn",
    "kwik",
    "megacloud",
    "vidcloud",
    "fembed",
    "mixdrop",
    "mycloud",
];

const ANIMEPAHE_REFERER: &str = "https://animepahe.ru/";
const GOGOANIME_REFERER: &str = "https://gogoanimehd.to/";
const DRAMACOOL_REFERER: &str = "https://dramacool.pa/";
const DEFAULT_HOST_REFERER: &str = "https://9animetv.to/";

lazy_static::lazy_static! {
    static ref COMPILED_RULES: Vec<(SiteCategory, Vec<(Regex, &'static SiteRule)>)> = SITE_RULES
        .iter()
        .map(|(category, rules)| {
            let compiled = rules
                .iter()
                .filter_map(|r| {
                    RegexBuilder::new(r.pattern)
                        .case_insensitive(true)
                        .build()
                        .ok()
                        .map(|re| (re, r))
                })
                .collect();
            (*category, compiled)
        })
        .collect();
}

/// Classify a URL by the site it belongs to.
///
/// Never fails; anything unmatched is [`SiteInfo::unknown`].
pub fn detect_website(url: &str) -> SiteInfo {
    for (category, rules) in COMPILED_RULES.iter() {
        for (re, rule) in rules {
            if re.is_match(url) {
                return SiteInfo {
                    category: *category,
                    name: rule.name,
                    referer: rule.referer,
                };
            }
        }
    }
    SiteInfo::unknown()
}

/// Referer to send for known video hosts, `None` when no header should be set.
pub fn resolve_referer(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    if !VIDEO_HOSTS.iter().any(|host| lower.contains(host)) {
        return None;
    }

    // Override order matters when several fragments appear in one URL
    let referer = if lower.contains("kwik") {
        ANIMEPAHE_REFERER
    } else if lower.contains("gogocdn") {
        GOGOANIME_REFERER
    } else if lower.contains("fembed") {
        DRAMACOOL_REFERER
    } else {
        DEFAULT_HOST_REFERER
    };
    Some(referer)
}

/// `Origin` header value derived from a referer (trailing slash removed).
pub fn origin_from_referer(referer: &str) -> &str {
    referer.trim_end_matches('/')
}
