//! Built-in ingredient and cocktail tags
//!
//! Snapshots refer to tags by id only; names and colors come from the fixed
//! tables below.

use crate::models::RawId;
use crate::search::normalize_search_text;

pub type TagId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: &'static str,
    pub color: &'static str,
}

const fn tag(id: TagId, name: &'static str, color: &'static str) -> Tag {
    Tag { id, name, color }
}

pub const INGREDIENT_TAGS: &[Tag] = &[
    tag(1, "strong alcohol", "#ec5a5a"),
    tag(2, "soft alcohol", "#F06292"),
    tag(3, "beverage", "#9575CD"),
    tag(4, "syrup", "#FFB74D"),
    tag(5, "juice", "#AED581"),
    tag(6, "fruit", "#81C784"),
    tag(7, "herb", "#4DB6AC"),
    tag(8, "spice", "#FF8A65"),
    tag(9, "dairy", "#4FC3F7"),
    tag(10, "other", "#a8a8a8"),
];

pub const COCKTAIL_TAGS: &[Tag] = &[
    tag(1, "IBA official", "#81C784"),
    tag(2, "equal parts", "#64B5F6"),
    tag(3, "bitter", "#9575CD"),
    tag(4, "tiki", "#4DD0E1"),
    tag(5, "strong", "#ec5a5a"),
    tag(6, "mild", "#F06292"),
    tag(7, "soft", "#FFD54F"),
    tag(8, "long", "#FFB74D"),
    tag(9, "shot", "#FF8A65"),
    tag(10, "non-alcoholic", "#DCE775"),
    tag(11, "custom", "#a8a8a8"),
];

/// Valid tag ids, truncated, deduplicated and sorted
pub fn normalize_tag_ids(raw: &[RawId]) -> Vec<TagId> {
    let mut ids: Vec<TagId> = raw.iter().filter_map(RawId::normalize).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Known tags for the given ids, in id order; unknown ids are dropped
pub fn resolve_tags(ids: &[TagId], known: &'static [Tag]) -> Vec<&'static Tag> {
    let mut tags: Vec<&'static Tag> = known.iter().filter(|tag| ids.contains(&tag.id)).collect();
    tags.sort_by_key(|tag| tag.id);
    tags
}

/// Find a tag by id or by (case and punctuation insensitive) name
pub fn find_tag(query: &str, known: &'static [Tag]) -> Option<&'static Tag> {
    if let Ok(id) = query.trim().parse::<TagId>() {
        return known.iter().find(|tag| tag.id == id);
    }

    let wanted = normalize_search_text(query);
    known
        .iter()
        .find(|tag| normalize_search_text(tag.name) == wanted)
}

pub fn tag_names(ids: &[TagId], known: &'static [Tag]) -> Vec<&'static str> {
    resolve_tags(ids, known).into_iter().map(|tag| tag.name).collect()
}
