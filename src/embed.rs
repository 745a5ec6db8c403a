use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::boosts::Boost;

pub const BOOST_COLOR: u32 = 0x4a90e2;

const FOOTER_ICON: &str = "https://cdn.discordapp.com/icons/626094990984216586/ceb7d3a814435bc9601276d07f44b9f3.png?size=128";

// Discord rejects embeds past any of these
const FIELD_VALUE_LIMIT: usize = 1024;
const EMBED_FIELD_COUNT_LIMIT: usize = 25;
const EMBED_CHAR_LIMIT: usize = 6000;

// Discord allows 256, shorter names leave room for boost lines
const FIELD_NAME_LIMIT: usize = 100;

const TRUNCATED: &str = "…";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Everything known about one server for the summary message.
#[derive(Debug, Clone)]
pub struct ServerSection {
    pub name: String,
    pub boosts: Vec<Boost>,
}

/// "1.0 day", "1.5 day", "2.0 days"
pub fn duration_text(boost: &Boost) -> String {
    let days = boost.days();
    let day_text = if days >= 2.0 { "days" } else { "day" };

    format!("{:.1} {}", days, day_text)
}

fn iso_timestamp(ts: &NaiveDateTime) -> String {
    ts.and_utc().to_rfc3339()
}

pub fn boost_embed(server_name: &str, boost: &Boost) -> Embed {
    let mut fields = vec![];

    if let Some(message) = &boost.message {
        fields.push(EmbedField {
            name: "Boost Message".to_string(),
            value: message.clone(),
            inline: true,
        });
    }

    Embed {
        title: format!("{} BOOSTED!", server_name),
        description: format!(
            "{} has been boosted by **{}** for **{}**!\n\n",
            server_name,
            boost.username,
            duration_text(boost)
        ),
        color: BOOST_COLOR,
        footer: Some(EmbedFooter {
            text: "Boosted".to_string(),
            icon_url: FOOTER_ICON.to_string(),
        }),
        fields,
        timestamp: Some(iso_timestamp(&boost.boosted_at)),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut out: String = text.chars().take(limit.saturating_sub(1)).collect();
    out.push_str(TRUNCATED);
    out
}

/// One line per boost, cut short with a marker once `limit` characters are used.
fn section_value(boosts: &[Boost], limit: usize) -> String {
    if boosts.is_empty() {
        return "No boosts".to_string();
    }

    let mut value = String::new();
    let mut len = 0;

    for (idx, boost) in boosts.iter().enumerate() {
        let line = format!(
            "**{}** - {} - {}",
            boost.username,
            boost.boosted_at.format("%Y-%m-%d"),
            duration_text(boost)
        );
        let separator = if value.is_empty() { 0 } else { 1 };
        // the last line needs no room for the marker
        let reserve = if idx + 1 < boosts.len() { 1 + TRUNCATED.chars().count() } else { 0 };

        if len + separator + line.chars().count() + reserve > limit {
            if !value.is_empty() {
                value.push('\n');
            }
            value.push_str(TRUNCATED);
            break;
        }

        if separator == 1 {
            value.push('\n');
        }
        value.push_str(&line);
        len += separator + line.chars().count();
    }

    value
}

fn field_chars(field: &EmbedField) -> usize {
    field.name.chars().count() + field.value.chars().count()
}

/// Embed listing every server's boosts. Past 25 servers the rest are only
/// counted, and the boost lines share what is left of the 6000 character budget.
pub fn summary_embed(sections: &[ServerSection]) -> Embed {
    let title = "Server Boosts".to_string();
    let description = "Boost history of every tracked server".to_string();
    let footer = EmbedFooter {
        text: "Last updated".to_string(),
        icon_url: FOOTER_ICON.to_string(),
    };

    let (shown, hidden) = if sections.len() > EMBED_FIELD_COUNT_LIMIT {
        sections.split_at(EMBED_FIELD_COUNT_LIMIT - 1)
    } else {
        (sections, &[][..])
    };

    let overflow = if hidden.is_empty() {
        None
    } else {
        Some(EmbedField {
            name: "More servers".to_string(),
            value: format!("{} more servers not shown", hidden.len()),
            inline: false,
        })
    };

    let names: Vec<String> = shown
        .iter()
        .map(|section| truncate(&section.name, FIELD_NAME_LIMIT))
        .collect();

    let used = title.chars().count()
        + description.chars().count()
        + footer.text.chars().count()
        + names.iter().map(|name| name.chars().count()).sum::<usize>()
        + overflow.as_ref().map(field_chars).unwrap_or(0);

    let per_field = if shown.is_empty() {
        0
    } else {
        (EMBED_CHAR_LIMIT.saturating_sub(used) / shown.len()).min(FIELD_VALUE_LIMIT)
    };

    let mut fields: Vec<EmbedField> = names
        .into_iter()
        .zip(shown)
        .map(|(name, section)| EmbedField {
            name,
            value: section_value(&section.boosts, per_field),
            inline: false,
        })
        .collect();
    fields.extend(overflow);

    Embed {
        title,
        description,
        color: BOOST_COLOR,
        footer: Some(footer),
        fields,
        timestamp: Some(Utc::now().to_rfc3339()),
    }
}
