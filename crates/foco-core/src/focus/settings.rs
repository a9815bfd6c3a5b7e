//! User-tunable session settings and the blocked-site list.

use serde::{Deserialize, Serialize};

use super::model::{SessionType, QUICK_SESSION_MIN};
use crate::error::ValidationError;

/// Session settings.
///
/// Durations are minutes. Values are stored as given; callers sanitize them
/// before building a [`SettingsPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_focus_time")]
    pub focus_time: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    #[serde(default = "default_sessions_until_long_break")]
    pub sessions_until_long_break: u32,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// Normalized domains, unique, in insertion order.
    #[serde(default = "default_blocked_sites")]
    pub blocked_sites: Vec<String>,
}

fn default_focus_time() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_sessions_until_long_break() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_blocked_sites() -> Vec<String> {
    ["facebook.com", "twitter.com", "instagram.com", "youtube.com", "tiktok.com"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_time: default_focus_time(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            sessions_until_long_break: default_sessions_until_long_break(),
            sound_enabled: default_true(),
            blocked_sites: default_blocked_sites(),
        }
    }
}

/// Partial settings update. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_break: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_break: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions_until_long_break: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_sites: Option<Vec<String>>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a single-field patch from a settings key and a raw value.
    ///
    /// Keys accept camelCase, snake_case or kebab-case spellings.
    pub fn from_key_value(key: &str, value: &str) -> Result<Self, ValidationError> {
        let mut patch = Self::default();
        match canonical_key(key)? {
            "focusTime" => patch.focus_time = Some(parse_minutes(key, value)?),
            "shortBreak" => patch.short_break = Some(parse_minutes(key, value)?),
            "longBreak" => patch.long_break = Some(parse_minutes(key, value)?),
            "sessionsUntilLongBreak" => {
                patch.sessions_until_long_break = Some(parse_minutes(key, value)?)
            }
            "soundEnabled" => {
                let enabled = value.trim().parse::<bool>().map_err(|_| {
                    ValidationError::InvalidValue {
                        field: key.to_string(),
                        message: format!("expected true or false, got '{value}'"),
                    }
                })?;
                patch.sound_enabled = Some(enabled);
            }
            _ => {
                patch.blocked_sites = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
        }
        Ok(patch)
    }
}

/// Map any accepted spelling of a settings key to its stored camelCase name.
fn canonical_key(key: &str) -> Result<&'static str, ValidationError> {
    match key.trim().replace(['-', '_'], "").to_ascii_lowercase().as_str() {
        "focustime" => Ok("focusTime"),
        "shortbreak" => Ok("shortBreak"),
        "longbreak" => Ok("longBreak"),
        "sessionsuntillongbreak" => Ok("sessionsUntilLongBreak"),
        "soundenabled" | "sound" => Ok("soundEnabled"),
        "blockedsites" => Ok("blockedSites"),
        _ => Err(ValidationError::InvalidValue {
            field: key.to_string(),
            message: "unknown settings key".into(),
        }),
    }
}

fn parse_minutes(key: &str, value: &str) -> Result<u32, ValidationError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidValue {
            field: key.to_string(),
            message: format!("expected a whole number, got '{value}'"),
        })
}

impl Settings {
    /// Shallow-merge a patch. Blocked sites are normalized and de-duplicated.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.focus_time {
            self.focus_time = v;
        }
        if let Some(v) = patch.short_break {
            self.short_break = v;
        }
        if let Some(v) = patch.long_break {
            self.long_break = v;
        }
        if let Some(v) = patch.sessions_until_long_break {
            self.sessions_until_long_break = v;
        }
        if let Some(v) = patch.sound_enabled {
            self.sound_enabled = v;
        }
        if let Some(sites) = patch.blocked_sites {
            self.blocked_sites = normalize_sites(sites);
        }
    }

    /// One setting rendered as text; blocked sites are comma-separated.
    pub fn get(&self, key: &str) -> Result<String, ValidationError> {
        Ok(match canonical_key(key)? {
            "focusTime" => self.focus_time.to_string(),
            "shortBreak" => self.short_break.to_string(),
            "longBreak" => self.long_break.to_string(),
            "sessionsUntilLongBreak" => self.sessions_until_long_break.to_string(),
            "soundEnabled" => self.sound_enabled.to_string(),
            _ => self.blocked_sites.join(","),
        })
    }

    /// Session length in minutes for the given type.
    pub fn duration_min(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Quick => QUICK_SESSION_MIN,
            SessionType::Focus => self.focus_time,
            SessionType::ShortBreak => self.short_break,
            SessionType::LongBreak => self.long_break,
        }
    }

    /// Session length in seconds for the given type.
    pub fn duration_secs(&self, session_type: SessionType) -> u64 {
        u64::from(self.duration_min(session_type)).saturating_mul(60)
    }

    /// Patch that appends one site to the block list.
    pub fn with_blocked_site(&self, site: &str) -> Result<SettingsPatch, ValidationError> {
        let site = normalize_domain(site)?;
        let mut sites = self.blocked_sites.clone();
        sites.push(site);
        Ok(SettingsPatch {
            blocked_sites: Some(sites),
            ..SettingsPatch::default()
        })
    }

    /// Patch that removes one site from the block list.
    pub fn without_blocked_site(&self, site: &str) -> Result<SettingsPatch, ValidationError> {
        let site = normalize_domain(site)?;
        Ok(SettingsPatch {
            blocked_sites: Some(
                self.blocked_sites
                    .iter()
                    .filter(|s| **s != site)
                    .cloned()
                    .collect(),
            ),
            ..SettingsPatch::default()
        })
    }

    pub fn is_site_listed(&self, site: &str) -> bool {
        normalize_domain(site)
            .map(|site| self.blocked_sites.contains(&site))
            .unwrap_or(false)
    }

    /// Whether a navigation target falls under the block list.
    ///
    /// A host matches a listed domain when it is the domain itself or one of
    /// its subdomains.
    pub fn blocks(&self, target: &str) -> bool {
        let Ok(host) = normalize_domain(target) else {
            return false;
        };
        self.blocked_sites.iter().any(|site| {
            host == *site
                || host
                    .strip_suffix(site.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// Reduce user input to a bare lowercase domain.
///
/// Strips the scheme, a leading `www.`, any path, query, fragment or port.
pub fn normalize_domain(input: &str) -> Result<String, ValidationError> {
    let mut site = input.trim().to_lowercase();
    if let Some(idx) = site.find("://") {
        site = site[idx + 3..].to_string();
    }
    if let Some(idx) = site.find(['/', '?', '#']) {
        site.truncate(idx);
    }
    if let Some(idx) = site.rfind('@') {
        site = site[idx + 1..].to_string();
    }
    if let Some(idx) = site.find(':') {
        site.truncate(idx);
    }
    let site = site.strip_prefix("www.").unwrap_or(&site);
    let site = site.trim_end_matches('.');

    if site.is_empty() || site.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidValue {
            field: "blocked_site".into(),
            message: format!("'{input}' is not a domain"),
        });
    }
    Ok(site.to_string())
}

/// Normalize every entry and drop invalid ones and duplicates, keeping the
/// first occurrence.
pub(crate) fn normalize_sites(sites: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(sites.len());
    for site in sites {
        match normalize_domain(&site) {
            Ok(site) if !out.contains(&site) => out.push(site),
            Ok(_) => {}
            Err(e) => tracing::debug!("dropping blocked site entry: {e}"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let s = Settings::default();
        assert_eq!(s.focus_time, 25);
        assert_eq!(s.short_break, 5);
        assert_eq!(s.long_break, 15);
        assert_eq!(s.sessions_until_long_break, 4);
        assert!(s.sound_enabled);
        assert_eq!(s.blocked_sites.len(), 5);
        assert!(s.blocked_sites.contains(&"youtube.com".to_string()));
    }

    #[test]
    fn duration_lookup() {
        let s = Settings {
            focus_time: 50,
            short_break: 7,
            long_break: 20,
            ..Settings::default()
        };
        assert_eq!(s.duration_secs(SessionType::Quick), 300);
        assert_eq!(s.duration_secs(SessionType::Focus), 3000);
        assert_eq!(s.duration_secs(SessionType::ShortBreak), 420);
        assert_eq!(s.duration_secs(SessionType::LongBreak), 1200);
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut s = Settings::default();
        s.apply(SettingsPatch {
            focus_time: Some(40),
            sound_enabled: Some(false),
            ..SettingsPatch::default()
        });
        assert_eq!(s.focus_time, 40);
        assert!(!s.sound_enabled);
        assert_eq!(s.short_break, 5);
        assert_eq!(s.blocked_sites, Settings::default().blocked_sites);
    }

    #[test]
    fn apply_does_not_range_check() {
        let mut s = Settings::default();
        s.apply(SettingsPatch {
            focus_time: Some(0),
            sessions_until_long_break: Some(0),
            ..SettingsPatch::default()
        });
        assert_eq!(s.focus_time, 0);
        assert_eq!(s.sessions_until_long_break, 0);
    }

    #[test]
    fn normalize_strips_scheme_www_and_path() {
        assert_eq!(normalize_domain("https://www.Reddit.com/r/rust").unwrap(), "reddit.com");
        assert_eq!(normalize_domain("http://news.ycombinator.com:443").unwrap(), "news.ycombinator.com");
        assert_eq!(normalize_domain("  example.com  ").unwrap(), "example.com");
        assert!(normalize_domain("https://").is_err());
        assert!(normalize_domain("   ").is_err());
    }

    #[test]
    fn normalize_lowercases_non_ascii() {
        assert_eq!(normalize_domain("https://www.BÜCHER.de").unwrap(), "bücher.de");
        let mut s = Settings::default();
        s.apply(SettingsPatch {
            blocked_sites: Some(vec!["bücher.de".into(), "BÜCHER.DE".into()]),
            ..Default::default()
        });
        assert_eq!(s.blocked_sites, vec!["bücher.de".to_string()]);
        assert!(s.blocks("https://shop.BÜCHER.de/"));
    }

    #[test]
    fn blocked_sites_are_deduplicated_on_apply() {
        let mut s = Settings::default();
        let mut sites = s.blocked_sites.clone();
        sites.push("https://www.example.com".into());
        sites.push("example.com".into());
        s.apply(SettingsPatch {
            blocked_sites: Some(sites),
            ..SettingsPatch::default()
        });
        assert_eq!(
            s.blocked_sites.iter().filter(|x| *x == "example.com").count(),
            1
        );
        assert_eq!(s.blocked_sites.len(), 6);
    }

    #[test]
    fn add_and_remove_site_patches() {
        let mut s = Settings::default();
        let patch = s.with_blocked_site("www.Example.com").unwrap();
        s.apply(patch);
        assert!(s.is_site_listed("example.com"));

        let patch = s.without_blocked_site("https://example.com/").unwrap();
        s.apply(patch);
        assert!(!s.is_site_listed("example.com"));
        assert_eq!(s.blocked_sites, Settings::default().blocked_sites);
    }

    #[test]
    fn blocks_matches_domain_and_subdomains_only() {
        let s = Settings::default();
        assert!(s.blocks("https://www.youtube.com/watch?v=1"));
        assert!(s.blocks("m.youtube.com"));
        assert!(!s.blocks("notyoutube.com"));
        assert!(!s.blocks("docs.rs"));
    }

    #[test]
    fn patch_from_key_value() {
        let p = SettingsPatch::from_key_value("focus-time", "30").unwrap();
        assert_eq!(p.focus_time, Some(30));
        let p = SettingsPatch::from_key_value("soundEnabled", "false").unwrap();
        assert_eq!(p.sound_enabled, Some(false));
        let p = SettingsPatch::from_key_value("blocked_sites", "a.com, b.com").unwrap();
        assert_eq!(p.blocked_sites, Some(vec!["a.com".into(), "b.com".into()]));
        assert!(SettingsPatch::from_key_value("focus_time", "abc").is_err());
        assert!(SettingsPatch::from_key_value("volume", "3").is_err());
    }

    #[test]
    fn get_by_any_key_spelling() {
        let s = Settings::default();
        assert_eq!(s.get("focus-time").unwrap(), "25");
        assert_eq!(s.get("sessions_until_long_break").unwrap(), "4");
        assert_eq!(s.get("sound").unwrap(), "true");
        assert!(s.get("blockedSites").unwrap().starts_with("facebook.com,"));
        assert!(s.get("theme").is_err());
    }

    #[test]
    fn missing_fields_take_defaults_when_deserializing() {
        let s: Settings = serde_json::from_str(r#"{"focusTime": 45}"#).unwrap();
        assert_eq!(s.focus_time, 45);
        assert_eq!(s.long_break, 15);
        assert!(s.sound_enabled);
    }
}
