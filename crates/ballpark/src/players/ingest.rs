use tracing::warn;

use super::domain::{BattingStats, NewPlayer};
use super::feed::FeedRecord;
use crate::text::TextNormalizer;

/// A feed record converted for storage, with the text fields whose repair
/// involved a guess.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedPlayer {
    pub player: NewPlayer,
    pub guessed_fields: Vec<&'static str>,
}

impl FeedRecord {
    /// Cleans name and position and maps the batting line. Every field that
    /// needed a fallback guess is logged for manual review.
    ///
    /// Returns `None` when the name is missing or normalizes to nothing, since
    /// a stored player always has a name.
    pub fn into_new_player(self, normalizer: &TextNormalizer) -> Option<IngestedPlayer> {
        let mut guessed_fields = Vec::new();

        let raw_name = self.name.unwrap_or_default();
        let name = normalizer.normalize(raw_name.trim());
        if name.text.trim().is_empty() {
            warn!(raw = %raw_name, "skipping feed record without a usable player name");
            return None;
        }
        if name.has_guesses() {
            warn!(
                field = "name",
                raw = %raw_name,
                stored = %name.text,
                guessed = name.guessed,
                "unrecognized corrupted characters replaced by guess"
            );
            guessed_fields.push("name");
        }

        let position = normalizer
            .normalize_optional(self.position.as_deref().map(str::trim))
            .filter(|position| !position.text.is_empty());
        if let Some(position) = position.as_ref().filter(|position| position.has_guesses()) {
            warn!(
                field = "position",
                player = %name.text,
                stored = %position.text,
                guessed = position.guessed,
                "unrecognized corrupted characters replaced by guess"
            );
            guessed_fields.push("position");
        }

        let player = NewPlayer {
            name: name.text.trim().to_string(),
            position: position.map(|position| position.text),
            stats: BattingStats {
                games: self.games,
                at_bat: self.at_bat,
                runs: self.runs,
                hits: self.hits,
                double_2b: self.double_2b,
                third_baseman: self.third_baseman,
                home_runs: self.home_runs,
                rbi: self.rbi,
                walks: self.walks,
                strikeouts: self.strikeouts,
                stolen_bases: self.stolen_bases,
                caught_stealing: self.caught_stealing,
                batting_average: self.batting_average,
                on_base_percentage: self.on_base_percentage,
                slugging_percentage: self.slugging_percentage,
                on_base_plus_slugging: self.on_base_plus_slugging,
            },
        };

        Some(IngestedPlayer {
            player,
            guessed_fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, position: Option<&str>) -> FeedRecord {
        FeedRecord {
            name: Some(name.to_string()),
            position: position.map(str::to_string),
            games: 10,
            hits: 7,
            batting_average: Some(0.25),
            ..FeedRecord::default()
        }
    }

    #[test]
    fn repairs_name_and_keeps_stats() {
        let ingested = record("E Encarnaci?n", Some("DH"))
            .into_new_player(TextNormalizer::standard())
            .expect("named record is kept");
        assert_eq!(ingested.player.name, "E Encarnacion");
        assert_eq!(ingested.player.position.as_deref(), Some("DH"));
        assert_eq!(ingested.player.stats.games, 10);
        assert_eq!(ingested.player.stats.hits, 7);
        assert_eq!(ingested.player.stats.batting_average, Some(0.25));
        assert!(ingested.guessed_fields.is_empty());
    }

    #[test]
    fn reports_guessed_fields() {
        let ingested = record("Q Xy?z", Some("S?"))
            .into_new_player(TextNormalizer::standard())
            .expect("named record is kept");
        assert_eq!(ingested.player.name, "Q Xyaz");
        assert_eq!(ingested.player.position.as_deref(), Some("Sa"));
        assert_eq!(ingested.guessed_fields, vec!["name", "position"]);
    }

    #[test]
    fn blank_position_is_absent() {
        let ingested = record("J B?ez", Some("  "))
            .into_new_player(TextNormalizer::standard())
            .expect("named record is kept");
        assert_eq!(ingested.player.name, "J Baez");
        assert_eq!(ingested.player.position, None);
    }

    #[test]
    fn records_without_a_usable_name_are_skipped() {
        let normalizer = TextNormalizer::standard();
        assert_eq!(FeedRecord::default().into_new_player(normalizer), None);
        assert_eq!(record("   ", Some("SS")).into_new_player(normalizer), None);
        assert_eq!(record("大谷", Some("DH")).into_new_player(normalizer), None);
    }
}
