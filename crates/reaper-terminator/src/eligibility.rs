//! Eligibility filter: keep groups that opted in through the eligibility tag.

use reaper_core::TagsConfig;
use reaper_fleet::Group;

/// Groups carrying exactly `eligibility_key = eligibility_value`, listing order kept.
pub fn filter_eligible(groups: Vec<Group>, tags: &TagsConfig) -> Vec<Group> {
    groups
        .into_iter()
        .filter(|group| {
            group.has_tag(&tags.eligibility_key, Some(tags.eligibility_value.as_str()))
        })
        .collect()
}
