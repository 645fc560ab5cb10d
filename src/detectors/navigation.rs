// WHY: Last-resort detector that turns unmatched text into an "open this" side effect
// URL -> app URL -> bare domain -> file path -> web search; the display text stays the input

use url::{form_urlencoded, Url};

use super::{priority, DetectionContext, Detector, EffectKind, MatchOutcome, Scope, SideEffect};
use crate::error::DetectorError;
use crate::formatters::render_template;

/// Top-level domains accepted for bare "example.com" style input
const KNOWN_TLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "mil", "int", "io", "dev", "app", "ai", "co", "me", "info",
    "biz", "xyz", "tech", "site", "online", "blog", "news", "cloud", "us", "uk", "ca", "de", "fr",
    "es", "it", "nl", "se", "no", "fi", "dk", "pl", "ch", "at", "be", "ie", "au", "nz", "jp", "cn",
    "in", "br", "mx", "ru", "kr", "tv", "fm", "gg", "ly", "sh", "rs",
];

pub struct NavigationDetector;

impl NavigationDetector {
    pub const ID: &'static str = "navigation";
}

fn open_url(input: &str, url: String) -> MatchOutcome {
    MatchOutcome::SideEffect {
        display_text: input.to_string(),
        effect: SideEffect {
            kind: EffectKind::OpenUrl,
            message: format!("Opening {url}"),
            payload: url,
        },
    }
}

fn open_path(input: &str, path: &str) -> MatchOutcome {
    MatchOutcome::SideEffect {
        display_text: input.to_string(),
        effect: SideEffect {
            kind: EffectKind::OpenPath,
            payload: path.to_string(),
            message: format!("Opening {path}"),
        },
    }
}

fn search(input: &str, query: &str, search_url: &str) -> MatchOutcome {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    let url = render_template(search_url, &[("query", &encoded)]);
    MatchOutcome::SideEffect {
        display_text: input.to_string(),
        effect: SideEffect {
            kind: EffectKind::OpenUrl,
            payload: url,
            message: format!("Searching the web for \"{query}\""),
        },
    }
}

fn has_known_tld(text: &str, ctx: &DetectionContext<'_>) -> bool {
    ctx.patterns
        .captures("domain", text)
        .and_then(|caps| caps.get(1))
        .is_some_and(|tld| KNOWN_TLDS.contains(&tld.to_lowercase().as_str()))
}

impl Detector for NavigationDetector {
    fn id(&self) -> &str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        priority::NAVIGATION
    }

    fn detect(&self, text: &str, ctx: &DetectionContext<'_>) -> Result<MatchOutcome, DetectorError> {
        let options = &ctx.config.navigation;
        if !options.enabled || ctx.scope != Scope::Whole || !ctx.matches.is_empty() {
            return Ok(MatchOutcome::NoMatch);
        }

        let target = text.trim();
        if target.is_empty() {
            return Ok(MatchOutcome::NoMatch);
        }
        let patterns = ctx.patterns;

        if patterns.matches("url", target) {
            if let Ok(url) = Url::parse(target) {
                return Ok(open_url(text, url.to_string()));
            }
        }
        if patterns.matches("app_url", target) {
            return Ok(open_url(text, target.to_string()));
        }
        if has_known_tld(target, ctx) {
            let candidate = format!("https://{target}");
            if let Ok(url) = Url::parse(&candidate) {
                return Ok(open_url(text, url.to_string()));
            }
        }
        if patterns.matches("file_path", target) {
            return Ok(open_path(text, target));
        }

        if target.contains('\n') || target.chars().count() > options.max_search_length {
            return Ok(MatchOutcome::NoMatch);
        }
        Ok(search(text, target, &options.search_url))
    }
}
