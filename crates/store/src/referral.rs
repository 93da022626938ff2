//! Referral link parsing and generation.
//!
//! Accepted forms: `?ref=<v>`, `/ref/<v>` and `/ref=<v>`. The query form
//! wins when several are present.

use reqwest::Url;

const REF_PARAM: &str = "ref";

/// Sponsor reference carried by `link`, if any.
///
/// The returned value is percent-decoded but not validated; feed it to
/// [`SponsorRef::parse`](crate::sponsor::SponsorRef::parse).
pub fn referral_from_url(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;

    if let Some((_, value)) = url.query_pairs().find(|(key, _)| key == REF_PARAM) {
        if !value.is_empty() {
            return Some(value.into_owned());
        }
    }

    let path = url.path();
    let start = ref_marker(path)? + "/ref/".len();
    let segment = path[start..].split('/').next().unwrap_or_default();
    if segment.is_empty() {
        return None;
    }
    percent_decode(segment)
}

/// Shareable link crediting `user_id`.
pub fn referral_link(base_url: &str, user_id: u64) -> String {
    format!("{}/ref={user_id}", base_url.trim_end_matches('/'))
}

/// `link` without its referral: the `ref` query parameter is dropped and a
/// `/ref…` path is reset to `/`.
pub fn strip_referral(link: &str) -> Option<String> {
    let mut url = Url::parse(link.trim()).ok()?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != REF_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    if ref_marker(url.path()).is_some() {
        url.set_path("/");
    }

    Some(url.to_string())
}

/// Byte offset of a case-insensitive `/ref/` or `/ref=` in `path`.
fn ref_marker(path: &str) -> Option<usize> {
    let lowered = path.to_ascii_lowercase();
    match (lowered.find("/ref/"), lowered.find("/ref=")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_form() {
        assert_eq!(
            referral_from_url("https://bigbang.app/?ref=123").as_deref(),
            Some("123")
        );
        assert_eq!(
            referral_from_url("https://bigbang.app/dashboard?tab=x&ref=0xAbC").as_deref(),
            Some("0xAbC")
        );
    }

    #[test]
    fn test_path_forms() {
        assert_eq!(referral_from_url("https://bigbang.app/ref/42").as_deref(), Some("42"));
        assert_eq!(referral_from_url("https://bigbang.app/ref=42").as_deref(), Some("42"));
        assert_eq!(referral_from_url("https://bigbang.app/REF/42/").as_deref(), Some("42"));
        assert_eq!(
            referral_from_url("https://bigbang.app/ref/%2042").as_deref(),
            Some(" 42")
        );
    }

    #[test]
    fn test_no_referral() {
        assert_eq!(referral_from_url("https://bigbang.app/"), None);
        assert_eq!(referral_from_url("https://bigbang.app/?ref="), None);
        assert_eq!(referral_from_url("https://bigbang.app/referrals"), None);
        assert_eq!(referral_from_url("not a url"), None);
    }

    #[test]
    fn test_referral_link() {
        assert_eq!(referral_link("https://bigbang.app/", 7), "https://bigbang.app/ref=7");
        assert_eq!(
            referral_from_url(&referral_link("https://bigbang.app", 7)).as_deref(),
            Some("7")
        );
    }

    #[test]
    fn test_strip_referral() {
        assert_eq!(
            strip_referral("https://bigbang.app/?ref=5").as_deref(),
            Some("https://bigbang.app/")
        );
        assert_eq!(
            strip_referral("https://bigbang.app/ref/5").as_deref(),
            Some("https://bigbang.app/")
        );
        assert_eq!(
            strip_referral("https://bigbang.app/dashboard?tab=team&ref=5").as_deref(),
            Some("https://bigbang.app/dashboard?tab=team")
        );
    }

    #[test]
    fn test_percent_decode_rejects_truncated_escape() {
        assert_eq!(percent_decode("12%4"), None);
        assert_eq!(percent_decode("a%41").as_deref(), Some("aA"));
    }

    #[test]
    fn test_signed_escape_is_rejected() {
        assert_eq!(percent_decode("%+7"), None);
        assert_eq!(referral_from_url("https://bigbang.app/ref/%+7"), None);
    }
}
