// src/extractors/social.rs
//! Social media accounts listed under a subject. Districts either print an
//! "Instagram Information & Activity" banner per account, prefix each label
//! with the platform ("Instagram Username:"), or just mention the platform
//! somewhere above generic "Username:"/"URL:" lines.

use std::collections::HashMap;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extractors::patterns::{bounded_literal, compile, first_match, LabelPattern};
use crate::utils::error::ExtractError;
use crate::utils::text::{normalize, normalize_url};

// --- Label fragments ---
const DISPLAY_NAME_LABEL: &str = r"Display[ \t]*Name";
const HANDLE_LABEL: &str = r"User[ \t]*name|Handle";
const ID_LABEL: &str = r"(?:User[ \t]*)?ID";
const URL_LABEL: &str = r"URL";
// Banner must follow the platform name on the same line.
const BANNER: &str = r"[^\n]{0,40}?Information[ \t]*(?:&|and)?[ \t]*Activity";

/// Platform name followed by an "Information & Activity" banner. Group 1 is
/// the platform name.
pub fn banner_pattern(platforms: &[Platform]) -> String {
    format!(r"(?i)\b({})\b{BANNER}", platform_alternation(platforms))
}

fn platform_alternation(platforms: &[Platform]) -> String {
    platforms
        .iter()
        .map(|p| regex::escape(p.name()))
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    TikTok,
    Snapchat,
    Facebook,
    Twitter,
    Discord,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Instagram,
        Platform::TikTok,
        Platform::Snapchat,
        Platform::Facebook,
        Platform::Twitter,
        Platform::Discord,
        Platform::YouTube,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
            Platform::Snapchat => "Snapchat",
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter",
            Platform::Discord => "Discord",
            Platform::YouTube => "YouTube",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .iter()
            .copied()
            .find(|platform| platform.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown platform '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPresence {
    pub platform: Platform,
    pub display_name: Option<String>,
    pub handle: Option<String>,
    pub numeric_id: Option<String>,
    pub url: Option<String>,
}

impl SocialPresence {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.handle.is_none()
            && self.numeric_id.is_none()
            && self.url.is_none()
    }
}

/// Ordered label alternatives for one platform; platform-qualified first.
struct PresencePatterns {
    display_name: Vec<LabelPattern>,
    handle: Vec<LabelPattern>,
    numeric_id: Vec<LabelPattern>,
    url: Vec<LabelPattern>,
}

impl PresencePatterns {
    fn for_platform(platform: Platform) -> Result<Self, ExtractError> {
        let qualified = |field: &str, label: &str| {
            LabelPattern::labeled(
                format!("{} {}", platform.name(), field),
                &format!("{}[ \t]*(?:{})", bounded_literal(platform.name()), label),
            )
        };
        let generic = |field: &str, label: &str| LabelPattern::labeled(field, label);

        Ok(Self {
            display_name: vec![
                qualified("Display Name", DISPLAY_NAME_LABEL)?,
                generic("Display Name", DISPLAY_NAME_LABEL)?,
            ],
            handle: vec![
                qualified("Username", HANDLE_LABEL)?,
                generic("Username", HANDLE_LABEL)?,
            ],
            numeric_id: vec![qualified("ID", ID_LABEL)?, generic("ID", ID_LABEL)?],
            url: vec![
                qualified("URL", URL_LABEL)?,
                generic("URL", URL_LABEL)?,
                LabelPattern::new("bare link", r"(?i)(https?://\S+)")?,
            ],
        })
    }
}

/// How sub-blocks were found; logged for auditing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitStrategy {
    Banner,
    QualifiedLabel,
    Implicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubBlock {
    platform: Platform,
    start: usize,
    end: usize,
}

// Labels already seen in the current qualified-label block.
#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    platform: Platform,
    display_name: bool,
    handle: bool,
}

pub struct PresenceExtractor {
    banner_re: Regex,
    qualified_label_re: Regex,
    labeled_field_re: Regex,
    any_label_re: Regex,
    mention_res: Vec<(Platform, Regex)>,
    patterns: HashMap<Platform, PresencePatterns>,
}

impl PresenceExtractor {
    pub fn new(platforms: &[Platform]) -> Result<Self, ExtractError> {
        if platforms.is_empty() {
            return Err(ExtractError::NoPlatforms);
        }

        let alternation = platform_alternation(platforms);
        let any_label = format!("(?:{DISPLAY_NAME_LABEL}|{HANDLE_LABEL}|{ID_LABEL}|{URL_LABEL})");

        let banner_re = compile("platform banner", &banner_pattern(platforms))?;
        let qualified_label_re = compile(
            "platform label",
            &format!(r"(?i)\b({alternation})\b[ \t]*(?:({DISPLAY_NAME_LABEL})|{HANDLE_LABEL})[ \t]*:"),
        )?;
        let labeled_field_re = compile(
            "platform field",
            &format!(r"(?i)\b({alternation})\b[ \t]*{any_label}[ \t]*:"),
        )?;
        let any_label_re = compile("field label", &format!(r"(?i)\b{any_label}[ \t]*:"))?;

        let mut mention_res = Vec::with_capacity(platforms.len());
        let mut patterns = HashMap::with_capacity(platforms.len());
        for platform in platforms {
            mention_res.push((
                *platform,
                compile(platform.name(), &format!("(?i){}", bounded_literal(platform.name())))?,
            ));
            patterns.insert(*platform, PresencePatterns::for_platform(*platform)?);
        }

        Ok(Self {
            banner_re,
            qualified_label_re,
            labeled_field_re,
            any_label_re,
            mention_res,
            patterns,
        })
    }

    /// Extracts every account in text order. Repeated platforms are kept.
    pub fn extract_presences(&self, text: &str) -> Vec<SocialPresence> {
        let Some((strategy, blocks)) = self.find_blocks(text) else {
            tracing::trace!("No social media blocks found");
            return Vec::new();
        };
        tracing::debug!("Found {} social media blocks via {:?}", blocks.len(), strategy);

        blocks
            .into_iter()
            .filter_map(|block| {
                let presence = self.resolve_block(block.platform, &text[block.start..block.end]);
                if presence.is_none() {
                    tracing::debug!("Dropping empty {} block at {}", block.platform, block.start);
                }
                presence
            })
            .collect()
    }

    fn find_blocks(&self, text: &str) -> Option<(SplitStrategy, Vec<SubBlock>)> {
        let banner_points = self.split_points(&self.banner_re, text);
        if !banner_points.is_empty() {
            return Some((SplitStrategy::Banner, blocks_from_points(&banner_points, text.len())));
        }

        let label_points = self.qualified_label_points(text);
        if !label_points.is_empty() {
            return Some((
                SplitStrategy::QualifiedLabel,
                blocks_from_points(&label_points, text.len()),
            ));
        }

        let implicit = self.implicit_blocks(text);
        if implicit.is_empty() {
            None
        } else {
            Some((SplitStrategy::Implicit, implicit))
        }
    }

    fn split_points(&self, re: &Regex, text: &str) -> Vec<(Platform, usize)> {
        re.captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let platform = caps.get(1)?.as_str().parse::<Platform>().ok()?;
                Some((platform, whole.start()))
            })
            .collect()
    }

    /// "Instagram Display Name:" then "Instagram Username:" describe one
    /// account. A label repeated for the same platform starts the next one.
    fn qualified_label_points(&self, text: &str) -> Vec<(Platform, usize)> {
        let mut points = Vec::new();
        let mut open: Option<OpenBlock> = None;

        for caps in self.qualified_label_re.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Ok(platform) = name.as_str().parse::<Platform>() else {
                continue;
            };
            let is_display_name = caps.get(2).is_some();

            if let Some(block) = open.as_mut() {
                let seen = if is_display_name { block.display_name } else { block.handle };
                if block.platform == platform && !seen {
                    block.display_name |= is_display_name;
                    block.handle |= !is_display_name;
                    continue;
                }
            }

            points.push((platform, whole.start()));
            open = Some(OpenBlock {
                platform,
                display_name: is_display_name,
                handle: !is_display_name,
            });
        }

        points
    }

    /// Platform mentioned somewhere above a field label, with no banner or
    /// qualified label to anchor it.
    fn implicit_blocks(&self, text: &str) -> Vec<SubBlock> {
        let mut blocks: Vec<SubBlock> = self
            .mention_res
            .iter()
            .filter_map(|(platform, mention_re)| {
                let mention = mention_re.find(text)?;
                if !self.any_label_re.is_match(&text[mention.end()..]) {
                    return None;
                }
                let end = self
                    .labeled_field_re
                    .captures_iter(&text[mention.end()..])
                    .filter_map(|caps| {
                        let whole = caps.get(0)?;
                        let other = caps.get(1)?.as_str().parse::<Platform>().ok()?;
                        (other != *platform).then_some(mention.end() + whole.start())
                    })
                    .next()
                    .unwrap_or(text.len());
                Some(SubBlock {
                    platform: *platform,
                    start: mention.start(),
                    end,
                })
            })
            .collect();

        blocks.sort_by_key(|block| block.start);
        blocks
    }

    fn resolve_block(&self, platform: Platform, block: &str) -> Option<SocialPresence> {
        let patterns = self.patterns.get(&platform)?;

        let display_name = first_match(&patterns.display_name, block).map(|(_, v)| normalize(v));
        let handle = first_match(&patterns.handle, block).map(|(_, v)| {
            let v = v.trim();
            normalize(v.strip_prefix('@').unwrap_or(v))
        });
        let numeric_id = first_match(&patterns.numeric_id, block).map(|(_, v)| sanitize_id(v));
        let url = first_match(&patterns.url, block).map(|(_, v)| normalize_url(v));

        let presence = SocialPresence {
            platform,
            display_name: display_name.filter(|v| !v.is_empty()),
            handle: handle.filter(|v| !v.is_empty()),
            numeric_id: numeric_id.filter(|v| !v.is_empty()),
            url: url.filter(|v| !v.is_empty()),
        };

        (!presence.is_empty()).then_some(presence)
    }
}

/// Keeps alphanumerics, hyphens and underscores only.
pub fn sanitize_id(raw: &str) -> String {
    normalize(raw)
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

fn blocks_from_points(points: &[(Platform, usize)], text_len: usize) -> Vec<SubBlock> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(platform, start))| SubBlock {
            platform,
            start,
            end: points.get(i + 1).map(|&(_, next)| next).unwrap_or(text_len),
        })
        .collect()
}
