use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use storydesk::{Category, CoverImageRef, Field, Status, StoryDraft};
use tracing::warn;

use super::terminal::Colorize;

/// Story fields shared by `create` and `edit`.
#[derive(Debug, Default, clap::Args)]
pub struct DraftArgs {
    /// The story title
    #[arg(long, short)]
    title: Option<String>,

    /// The author's name
    #[arg(long, short)]
    author: Option<String>,

    /// A short summary of the story
    #[arg(long, short)]
    synopsis: Option<String>,

    /// The story category
    #[arg(long, short)]
    category: Option<Category>,

    /// Publication status (publish or draft)
    #[arg(long, value_parser = Status::parse_lenient)]
    status: Option<Status>,

    /// Path to a local cover image
    #[arg(long, value_name = "PATH")]
    cover: Option<PathBuf>,

    /// Add a tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Add a chapter as TITLE=CONTENT, or TITLE=@FILE to read the content
    /// from a file (repeatable)
    #[arg(long = "chapter", value_name = "TITLE=CONTENT", value_parser = parse_chapter)]
    chapters: Vec<ChapterArg>,
}

/// A chapter given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterArg {
    title: String,
    content: String,
}

fn parse_chapter(s: &str) -> Result<ChapterArg, String> {
    let (title, content) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TITLE=CONTENT, got '{s}'"))?;

    let content = match content.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read chapter content from '{path}': {e}"))?,
        None => content.to_string(),
    };

    Ok(ChapterArg {
        title: title.to_string(),
        content,
    })
}

impl DraftArgs {
    /// Applies every given field to the draft.
    ///
    /// Tags and chapters are appended after any existing ones.
    pub fn apply(&self, draft: &mut StoryDraft) -> anyhow::Result<()> {
        for (field, value) in [
            (Field::Title, &self.title),
            (Field::Author, &self.author),
            (Field::Synopsis, &self.synopsis),
        ] {
            if let Some(value) = value {
                draft.set_field(field, value.clone());
            }
        }
        if let Some(category) = self.category {
            draft.set_category(category);
        }
        if let Some(status) = self.status {
            draft.set_status(status);
        }
        if let Some(path) = &self.cover {
            draft.set_cover_image_ref(CoverImageRef::from_local_file(path)?);
        }

        for tag in &self.tags {
            if !draft.add_tag(tag.clone()) {
                warn!("ignoring blank tag");
            }
        }
        for chapter in &self.chapters {
            draft.add_chapter(chapter.title.clone(), chapter.content.clone());
        }

        Ok(())
    }
}

/// Prompts for every required field the draft is still missing, then offers
/// to add tags and chapters.
pub fn prompt_missing(draft: &mut StoryDraft) -> anyhow::Result<()> {
    let theme = ColorfulTheme::default();

    for (field, label) in [
        (Field::Title, "Title"),
        (Field::Author, "Author"),
        (Field::Synopsis, "Synopsis"),
    ] {
        let current = match field {
            Field::Title => draft.title(),
            Field::Author => draft.author(),
            _ => draft.synopsis(),
        };
        if current.is_empty() {
            let value: String = Input::with_theme(&theme)
                .with_prompt(label)
                .interact_text()?;
            draft.set_field(field, value);
        }
    }

    if draft.category().is_none() {
        let index = Select::with_theme(&theme)
            .with_prompt("Category")
            .items(&Category::ALL)
            .default(0)
            .interact()?;
        draft.set_category(Category::ALL[index]);
    }

    if draft.status().is_none() {
        let index = Select::with_theme(&theme)
            .with_prompt("Status")
            .items(&Status::ALL)
            .default(0)
            .interact()?;
        draft.set_status(Status::ALL[index]);
    }

    while draft.cover_image().is_none() {
        let path: String = Input::with_theme(&theme)
            .with_prompt("Cover image path")
            .interact_text()?;
        match CoverImageRef::from_local_file(Path::new(path.trim())) {
            Ok(cover) => draft.set_cover_image_ref(cover),
            Err(e) => eprintln!("{}", e.to_string().warning()),
        }
    }

    loop {
        let tag: String = Input::with_theme(&theme)
            .with_prompt("Tag (empty to finish)")
            .allow_empty(true)
            .interact_text()?;
        if !draft.add_tag(tag) {
            break;
        }
    }

    while Confirm::with_theme(&theme)
        .with_prompt("Add a chapter?")
        .default(false)
        .interact()?
    {
        let title: String = Input::with_theme(&theme)
            .with_prompt("Chapter title")
            .interact_text()?;
        let content: String = Input::with_theme(&theme)
            .with_prompt("Chapter content")
            .allow_empty(true)
            .interact_text()?;

        let pending = draft.pending_chapter_mut();
        pending.title = title;
        pending.content = content;
        draft.commit_pending_chapter();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_chapter_splits_on_first_equals() {
        let chapter = parse_chapter("One=a=b").unwrap();
        assert_eq!(chapter.title, "One");
        assert_eq!(chapter.content, "a=b");
        assert!(parse_chapter("no separator").is_err());
    }

    #[test]
    fn parse_chapter_reads_file_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<p>hello</p>").unwrap();

        let chapter = parse_chapter(&format!("Ch1=@{}", file.path().display())).unwrap();
        assert_eq!(chapter.content, "<p>hello</p>");
    }

    #[test]
    fn apply_sets_fields_and_appends_lists() {
        let args = DraftArgs {
            title: Some("Ocean".to_string()),
            status: Some(Status::Draft),
            category: Some(Category::Sport),
            tags: vec!["a".to_string(), "  ".to_string(), "b".to_string()],
            chapters: vec![ChapterArg {
                title: "One".to_string(),
                content: "hi".to_string(),
            }],
            ..DraftArgs::default()
        };
        let mut draft = StoryDraft::create();
        draft.add_tag("existing");

        args.apply(&mut draft).unwrap();

        assert_eq!(draft.title(), "Ocean");
        assert_eq!(draft.status(), Some(Status::Draft));
        assert_eq!(draft.category(), Some(Category::Sport));
        assert_eq!(draft.tags(), ["existing", "a", "b"]);
        assert_eq!(draft.chapters().len(), 1);
    }
}
