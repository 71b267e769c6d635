//! Name-based classification of servers into hubs and leaves.
//!
//! Classification is purely lexical: the configured domain suffix is
//! stripped from every name, then the remainder is matched against the
//! hub and leaf prefixes. The engine itself assumes no particular
//! naming convention; everything lives in explicit configuration
//! values.

use crate::config::ScrubConfig;
use crate::tree::{Position, ServerRecord};

/// Derive `label` and `position` for every record in place.
pub fn scrub(records: &mut [ServerRecord], config: &ScrubConfig) {
    for record in records.iter_mut() {
        let trimmed = record
            .name
            .strip_suffix(&config.domain_suffix)
            .unwrap_or(&record.name);

        let (label, position) = if let Some(rest) = trimmed.strip_prefix(&config.hub_prefix) {
            (rest, Position::Hub)
        } else if let Some(rest) = trimmed.strip_prefix(&config.leaf_prefix) {
            (rest, Position::Leaf)
        } else {
            (trimmed, Position::Unknown)
        };

        record.label = label.to_string();
        record.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScrubConfig {
        ScrubConfig {
            domain_suffix: ".example.net".to_string(),
            hub_prefix: "hub.".to_string(),
            leaf_prefix: "irc.".to_string(),
        }
    }

    fn named(name: &str) -> ServerRecord {
        ServerRecord {
            name: name.to_string(),
            ..ServerRecord::default()
        }
    }

    #[test]
    fn test_scrub_classifies_by_prefix() {
        let mut records = vec![
            named("hub.core.example.net"),
            named("irc.paris.example.net"),
            named("services.example.net"),
        ];
        scrub(&mut records, &config());

        assert_eq!(records[0].position, Position::Hub);
        assert_eq!(records[0].label, "core");
        assert_eq!(records[1].position, Position::Leaf);
        assert_eq!(records[1].label, "paris");
        assert_eq!(records[2].position, Position::Unknown);
        assert_eq!(records[2].label, "services");
    }

    #[test]
    fn test_scrub_foreign_domain_keeps_full_name() {
        let mut records = vec![named("irc.other.org")];
        scrub(&mut records, &config());

        // The suffix does not match, but the leaf prefix still does.
        assert_eq!(records[0].position, Position::Leaf);
        assert_eq!(records[0].label, "other.org");
    }

    #[test]
    fn test_scrub_respects_custom_affixes() {
        let custom = ScrubConfig {
            domain_suffix: ".net".to_string(),
            hub_prefix: "core-".to_string(),
            leaf_prefix: "edge-".to_string(),
        };
        let mut records = vec![named("core-alpha.net"), named("edge-beta.net")];
        scrub(&mut records, &custom);

        assert_eq!(records[0].position, Position::Hub);
        assert_eq!(records[0].label, "alpha");
        assert_eq!(records[1].position, Position::Leaf);
        assert_eq!(records[1].label, "beta");
    }

    #[test]
    fn test_scrub_hub_prefix_checked_first() {
        // A name matching both prefixes classifies as hub.
        let custom = ScrubConfig {
            domain_suffix: String::new(),
            hub_prefix: "s".to_string(),
            leaf_prefix: "se".to_string(),
        };
        let mut records = vec![named("server1")];
        scrub(&mut records, &custom);
        assert_eq!(records[0].position, Position::Hub);
    }
}
