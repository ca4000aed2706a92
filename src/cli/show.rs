use chrono::{DateTime, Utc};
use clap::Parser;
use storydesk::{StoryBackend, StoryId, StoryRecord};
use tracing::instrument;

use super::{
    Context,
    terminal::{self, Colorize},
};

#[derive(Debug, Parser)]
#[command(about = "Display detailed information about a story")]
pub struct Show {
    /// The story's identifier
    id: StoryId,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,

    /// Include full chapter content in output
    #[arg(long)]
    with_content: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(self, context), fields(id = %self.id))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let client = context.client()?;

        let spinner = terminal::spinner("Loading story...");
        let story = client.get_story(&self.id);
        spinner.finish_and_clear();

        let story = story.map_err(|e| anyhow::anyhow!("Error fetching story {}: {e}", self.id))?;

        match self.output {
            OutputFormat::Pretty => self.output_pretty(&story),
            OutputFormat::Json => output_json(&story)?,
        }

        Ok(())
    }

    fn output_pretty(&self, story: &StoryRecord) {
        // Header
        println!("# {}", story.title.as_deref().unwrap_or("(untitled)"));
        if let Some(author) = &story.author {
            println!("by {author}");
        }
        println!();

        // Metadata
        println!("{}", "Metadata".dim());
        if let Some(id) = &story.id {
            println!("  ID:        {id}");
        }
        if let Some(category) = &story.category {
            println!("  Category:  {category}");
        }
        if let Some(status) = &story.status {
            println!("  Status:    {}", terminal::status_badge(status));
        }
        if let Some(cover) = &story.cover_image {
            println!("  Cover:     {cover}");
        }

        if let Some(synopsis) = story.synopsis.as_deref().filter(|s| !s.is_empty()) {
            println!("\n{}", "Synopsis".dim());
            println!("  {synopsis}");
        }

        if !story.tags.is_empty() {
            println!("\n{}", "Tags".dim());
            for (index, tag) in story.tags.iter().enumerate() {
                println!("  {:>2}. {}", index + 1, tag.tag_name.info());
            }
        }

        println!("\n{}", "Chapters".dim());
        if story.chapters.is_empty() {
            println!("  No chapters available.");
        }
        for (index, chapter) in story.chapters.iter().enumerate() {
            println!(
                "  {:>2}. {} {}",
                index + 1,
                chapter.title,
                format_updated(chapter.updated_at).dim()
            );
            if self.with_content && !chapter.content.is_empty() {
                for line in chapter.content.lines() {
                    println!("      {line}");
                }
            }
        }
    }
}

fn output_json(story: &StoryRecord) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(story)?);
    Ok(())
}

/// Formats a chapter timestamp as a day, e.g. `(updated 03 February 2024)`.
pub fn format_updated(updated: Option<DateTime<Utc>>) -> String {
    updated.map_or_else(String::new, |at| {
        format!("(updated {})", at.format("%d %B %Y"))
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn format_updated_uses_long_month() {
        let at = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(format_updated(Some(at)), "(updated 03 February 2024)");
        assert_eq!(format_updated(None), "");
    }
}
