//! Splitting a finished plan into display sections

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Summary,
    Flight,
    Hotel,
    Weather,
    Itinerary,
    Budget,
    Reasoning,
}

impl Section {
    /// The section a line opens, if it looks like a heading
    fn opened_by(line: &str) -> Option<Section> {
        let line = line.to_lowercase();
        let has = |word: &str| line.contains(word);

        if has("flight") && (has("selected") || has("booked")) {
            Some(Section::Flight)
        } else if has("hotel") && (has("selected") || has("booked") || has("recommendation")) {
            Some(Section::Hotel)
        } else if has("weather") || has("forecast") {
            Some(Section::Weather)
        } else if has("itinerary") || has("day-wise") || has("day 1") {
            Some(Section::Itinerary)
        } else if has("budget") || has("cost") {
            Some(Section::Budget)
        } else if has("reasoning") || has("why") {
            Some(Section::Reasoning)
        } else {
            None
        }
    }
}

/// A trip plan broken into blocks. Each block keeps its lines newline-terminated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripPlanSections {
    pub summary: String,
    pub flight: String,
    pub hotel: String,
    pub weather: String,
    pub itinerary: String,
    pub budget: String,
    pub reasoning: String,
}

impl TripPlanSections {
    /// Walk the plan line by line; a heading line switches the current block
    /// and belongs to it. Text before the first heading is the summary.
    #[must_use]
    pub fn parse(plan: &str) -> Self {
        let mut sections = Self::default();
        let mut current = Section::Summary;

        for line in plan.split('\n') {
            if let Some(next) = Section::opened_by(line) {
                current = next;
            }
            let block = sections.block_mut(current);
            block.push_str(line);
            block.push('\n');
        }
        sections
    }

    fn block_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::Summary => &mut self.summary,
            Section::Flight => &mut self.flight,
            Section::Hotel => &mut self.hotel,
            Section::Weather => &mut self.weather,
            Section::Itinerary => &mut self.itinerary,
            Section::Budget => &mut self.budget,
            Section::Reasoning => &mut self.reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "\
Your 3-night Goa getaway
**Selected Flight**: IndiGo 6E-201, 06:00 to 08:30, INR 3,500
**Hotel Recommendation**: Sea Breeze Resort, 4.2 stars
**Weather Forecast**: sunny, 31C highs
**Day-wise Itinerary**
Day 1: Baga Beach
Day 2: Fort Aguada
**Budget Breakdown**
Total: INR 21,500
**Reasoning**
Cheapest morning flight and a well-rated hotel near the beach.";

    #[test]
    fn test_parse_sections() {
        let sections = TripPlanSections::parse(PLAN);
        assert_eq!(sections.summary, "Your 3-night Goa getaway\n");
        assert!(sections.flight.starts_with("**Selected Flight**"));
        assert!(sections.hotel.contains("Sea Breeze"));
        assert!(sections.weather.contains("31C"));
        assert_eq!(
            sections.itinerary,
            "**Day-wise Itinerary**\nDay 1: Baga Beach\nDay 2: Fort Aguada\n"
        );
        assert!(sections.budget.contains("21,500"));
        assert!(sections.reasoning.ends_with("near the beach.\n"));
    }

    #[test]
    fn test_plain_text_stays_in_summary() {
        let sections = TripPlanSections::parse("Just go to the beach.");
        assert_eq!(sections.summary, "Just go to the beach.\n");
        assert!(sections.flight.is_empty());
        assert!(sections.reasoning.is_empty());
    }

    #[test]
    fn test_flight_mention_without_heading_word_does_not_switch() {
        let sections = TripPlanSections::parse("Intro\nThe flight lands early");
        assert_eq!(sections.summary, "Intro\nThe flight lands early\n");
    }
}
