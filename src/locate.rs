use crate::population::{PlayerRecord, Population};

/// A resolved lookup. `match_count` > 1 means the name was ambiguous and the
/// first row in table order was taken.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub record: &'a PlayerRecord,
    pub index: usize,
    pub match_count: usize,
}

impl Located<'_> {
    pub fn is_ambiguous(&self) -> bool {
        self.match_count > 1
    }
}

pub fn locate<'a>(
    population: &'a Population,
    name_pattern: &str,
    team_pattern: Option<&str>,
) -> Option<Located<'a>> {
    let hits = matching_indices(population, name_pattern, team_pattern);
    let index = *hits.first()?;
    if hits.len() > 1 {
        tracing::debug!(
            name = name_pattern,
            matches = hits.len(),
            "ambiguous player name, taking first row"
        );
    }
    Some(Located {
        record: &population.records()[index],
        index,
        match_count: hits.len(),
    })
}

/// Row indices whose name (and team, when given) contain the patterns,
/// case-insensitively, in table order.
pub fn matching_indices(
    population: &Population,
    name_pattern: &str,
    team_pattern: Option<&str>,
) -> Vec<usize> {
    let name_pattern = name_pattern.trim().to_lowercase();
    let team_pattern = team_pattern
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());

    population
        .iter()
        .enumerate()
        .filter(|(_, record)| record_matches(record, &name_pattern, team_pattern.as_deref()))
        .map(|(idx, _)| idx)
        .collect()
}

fn record_matches(record: &PlayerRecord, name_lower: &str, team_lower: Option<&str>) -> bool {
    // A row without a name never matches, not even the empty pattern.
    if record.name.is_empty() || !record.name.to_lowercase().contains(name_lower) {
        return false;
    }
    match team_lower {
        Some(team) => record.team.to_lowercase().contains(team),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population() -> Population {
        Population::new(vec![
            PlayerRecord::new("Bruno Fernandes", "Manchester Utd", "MF"),
            PlayerRecord::new("Bruno Guimarães", "Newcastle Utd", "MF"),
            PlayerRecord::new("Kylian Mbappé", "Real Madrid", "FW"),
        ])
    }

    #[test]
    fn first_row_wins_and_count_is_exposed() {
        let pop = population();
        let hit = locate(&pop, "bruno", None).expect("match");
        assert_eq!(hit.record.name, "Bruno Fernandes");
        assert_eq!(hit.match_count, 2);
        assert!(hit.is_ambiguous());
    }

    #[test]
    fn team_filter_narrows_with_and_semantics() {
        let pop = population();
        let hit = locate(&pop, "BRUNO", Some("newcastle")).expect("match");
        assert_eq!(hit.index, 1);
        assert_eq!(hit.match_count, 1);
        assert!(locate(&pop, "mbapp", Some("newcastle")).is_none());
    }

    #[test]
    fn blank_team_is_ignored_and_accents_fold_case() {
        let pop = population();
        let hit = locate(&pop, "MBAPPÉ", Some("  ")).expect("match");
        assert_eq!(hit.record.team, "Real Madrid");
    }

    #[test]
    fn nameless_rows_never_match() {
        let pop = Population::new(vec![
            PlayerRecord::new("", "Club", "FW"),
            PlayerRecord::new("Alpha", "Club", "FW"),
        ]);
        assert_eq!(matching_indices(&pop, "", None), vec![1]);
        assert_eq!(matching_indices(&pop, "", Some("club")), vec![1]);
    }

    #[test]
    fn empty_population_is_not_found() {
        assert!(locate(&Population::empty(), "anyone", None).is_none());
    }
}
