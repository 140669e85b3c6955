//! Merges successful batch outputs into one calendar.

use crate::types::{BatchOutput, ContentCalendar, ContentIdea, ContentPillar};

#[derive(Debug, Default)]
pub struct ResultAccumulator {
    pillars: Option<Vec<ContentPillar>>,
    ideas: Vec<ContentIdea>,
    batches: usize,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// First non-empty pillar list wins; later lists are dropped. Ideas are
    /// appended as-is.
    pub fn merge(&mut self, output: BatchOutput) {
        if self.pillars.is_none() && !output.pillars.is_empty() {
            self.pillars = Some(output.pillars);
        }
        self.ideas.extend(output.ideas);
        self.batches += 1;
    }

    pub fn idea_count(&self) -> usize {
        self.ideas.len()
    }

    pub fn batch_count(&self) -> usize {
        self.batches
    }

    /// Emit the calendar with ideas stable-sorted by date.
    pub fn finish(self) -> ContentCalendar {
        let mut ideas = self.ideas;
        ideas.sort_by_key(|idea| idea.date);
        ContentCalendar {
            content_pillars: self.pillars.unwrap_or_default(),
            content_ideas: ideas,
        }
    }
}
