//! Precedence-based deduplication of topics.

use std::collections::HashMap;

use tracing::debug;

use topic_types::TopicInfo;

/// Collapse topics sharing `(topic, subject)` into one record each.
///
/// A later record replaces the kept one only when it is a strict expertise
/// upgrade under [`TopicInfo::is_superseded_by`]; otherwise the first seen
/// record wins. Output follows first-seen order of the keys.
pub fn merge_topics<I>(topics: I) -> Vec<TopicInfo>
where
    I: IntoIterator<Item = TopicInfo>,
{
    let mut merged: Vec<TopicInfo> = Vec::new();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for topic in topics {
        let key = (topic.topic.clone(), topic.subject.clone());
        match positions.get(&key) {
            Some(&idx) => {
                if merged[idx].is_superseded_by(&topic) {
                    debug!(
                        topic = %topic.topic,
                        subject = %topic.subject,
                        from = ?merged[idx].expertise,
                        to = ?topic.expertise,
                        "Upgraded topic expertise"
                    );
                    merged[idx] = topic;
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(topic);
            }
        }
    }

    merged
}
