use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use storydesk::{Category, SearchQuery, Status, StoryBackend, StoryRecord};
use tracing::instrument;

use super::{
    Context,
    terminal::{self, Colorize},
};

/// Command arguments for `story list`.
#[derive(Debug, Default, Parser)]
#[command(about = "List stories, optionally searching and filtering")]
pub struct List {
    /// Free-text search, delegated to the server.
    #[arg(long, short)]
    search: Option<String>,

    /// Filter by category.
    #[arg(long, short)]
    category: Option<Category>,

    /// Filter by status.
    #[arg(long, value_parser = Status::parse_lenient)]
    status: Option<Status>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and print only identifiers.
    #[arg(long, short)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(level = "debug", skip(context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let client = context.client()?;
        let query = SearchQuery {
            text: self.search.clone(),
            category: self.category,
            status: self.status,
        };

        let spinner = terminal::spinner("Loading stories...");
        let stories = client.search_stories(&query);
        spinner.finish_and_clear();
        let stories = stories.map_err(|e| anyhow::anyhow!("Error fetching stories: {e}"))?;

        match self.output {
            OutputFormat::Table => {
                render_table(&stories, self.quiet, terminal::is_narrow());
                Ok(())
            }
            OutputFormat::Json => render_json(&stories),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Title,
    Author,
    Category,
    Status,
    Tags,
}

impl Column {
    const fn header(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Title => "Title",
            Self::Author => "Author",
            Self::Category => "Category",
            Self::Status => "Status",
            Self::Tags => "Tags",
        }
    }

    fn value(self, story: &StoryRecord) -> String {
        match self {
            Self::Id => story
                .id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            Self::Title => story.title.clone().unwrap_or_default(),
            Self::Author => story.author.clone().unwrap_or_default(),
            Self::Category => story.category.clone().unwrap_or_default(),
            Self::Status => story.status.clone().unwrap_or_default(),
            Self::Tags => story.tag_names().collect::<Vec<_>>().join(", "),
        }
    }
}

fn columns(narrow: bool) -> Vec<Column> {
    if narrow {
        vec![Column::Id, Column::Title, Column::Status]
    } else {
        vec![
            Column::Id,
            Column::Title,
            Column::Author,
            Column::Category,
            Column::Status,
            Column::Tags,
        ]
    }
}

fn render_table(stories: &[StoryRecord], quiet: bool, narrow: bool) {
    if quiet {
        for story in stories {
            println!("{}", Column::Id.value(story));
        }
        return;
    }

    if stories.is_empty() {
        println!("{}", "No stories found.".dim());
        return;
    }

    let selected = columns(narrow);
    let headers: Vec<&str> = selected.iter().map(|column| column.header()).collect();
    let data: Vec<Vec<String>> = stories
        .iter()
        .map(|story| selected.iter().map(|column| column.value(story)).collect())
        .collect();

    // Determine column widths for alignment.
    let widths = column_widths(&headers, &data);

    for (header, &width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for &width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in data {
        for ((value, column), &width) in row.iter().zip(&selected).zip(&widths) {
            // pad before colouring so escape codes don't skew alignment
            let padded = format!("{value:<width$}");
            if *column == Column::Status {
                print!("{}  ", terminal::paint_status(value, &padded));
            } else {
                print!("{padded}  ");
            }
        }
        println!();
    }
}

fn column_widths(headers: &[&str], data: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    id: Option<String>,
    title: Option<&'a str>,
    author: Option<&'a str>,
    category: Option<&'a str>,
    status: Option<&'a str>,
    tags: Vec<&'a str>,
    chapters: usize,
}

impl<'a> From<&'a StoryRecord> for Row<'a> {
    fn from(story: &'a StoryRecord) -> Self {
        Self {
            id: story.id.as_ref().map(ToString::to_string),
            title: story.title.as_deref(),
            author: story.author.as_deref(),
            category: story.category.as_deref(),
            status: story.status.as_deref(),
            tags: story.tag_names().collect(),
            chapters: story.chapters.len(),
        }
    }
}

fn render_json(stories: &[StoryRecord]) -> anyhow::Result<()> {
    let rows: Vec<Row> = stories.iter().map(Row::from).collect();
    serde_json::to_writer_pretty(std::io::stdout(), &rows)
        .context("failed to render json output")?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> StoryRecord {
        serde_json::from_str(
            r#"{"id": 1, "title": "Ocean", "author": "A", "status": "Draft",
                "tags": [{"id": 3, "tag_name": "sea"}, {"id": 4, "tag_name": "salt"}],
                "chapters": [{"title": "One"}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn narrow_terminals_drop_wide_columns() {
        assert_eq!(
            columns(true),
            [Column::Id, Column::Title, Column::Status]
        );
        assert_eq!(columns(false).len(), 6);
    }

    #[test]
    fn column_values_render_missing_fields_as_empty() {
        let story = story();
        assert_eq!(Column::Id.value(&story), "1");
        assert_eq!(Column::Tags.value(&story), "sea, salt");
        assert_eq!(Column::Category.value(&story), "");
    }

    #[test]
    fn widths_cover_headers_and_values() {
        let data = vec![vec!["12345".to_string(), "a".to_string()]];
        assert_eq!(column_widths(&["ID", "Title"], &data), [5, 5]);
    }

    #[test]
    fn json_row_summarises_chapters() {
        let story = story();
        let row = serde_json::to_value(Row::from(&story)).unwrap();
        assert_eq!(row["tags"], serde_json::json!(["sea", "salt"]));
        assert_eq!(row["chapters"], 1);
        assert_eq!(row["id"], "1");
    }
}
