use crate::model::ALL;

fn axis_matches(candidate_tags: &[String], requested: &[String]) -> bool {
    if requested.iter().any(|r| r.eq_ignore_ascii_case(ALL)) {
        return true;
    }
    requested
        .iter()
        .any(|r| candidate_tags.iter().any(|t| t.eq_ignore_ascii_case(r)))
}

/// True when a release tagged with `candidate_tags` satisfies both the
/// game-version and the loader filter.
pub fn matches(candidate_tags: &[String], mc_versions: &[String], loaders: &[String]) -> bool {
    axis_matches(candidate_tags, mc_versions) && axis_matches(candidate_tags, loaders)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_matches_anything() {
        let all = tags(&["all"]);
        assert!(matches(&[], &all, &all));
        assert!(matches(&tags(&["1.7.10", "Forge"]), &all, &all));
        assert!(matches(&tags(&["1.21.1"]), &tags(&["1.21.1"]), &tags(&["ALL"])));
    }

    #[test]
    fn both_axes_must_intersect() {
        let candidate = tags(&["1.21.1", "NeoForge"]);
        assert!(matches(&candidate, &tags(&["1.21.1"]), &tags(&["neoforge"])));
        assert!(!matches(&candidate, &tags(&["1.21.1"]), &tags(&["fabric"])));
        assert!(!matches(&candidate, &tags(&["1.20.1"]), &tags(&["neoforge"])));
        assert!(matches(
            &candidate,
            &tags(&["1.20.1", "1.21.1"]),
            &tags(&["fabric", "neoforge"])
        ));
    }

    #[test]
    fn untagged_candidate_fails_specific_request() {
        assert!(!matches(&[], &tags(&["1.21.1"]), &tags(&["all"])));
    }
}
