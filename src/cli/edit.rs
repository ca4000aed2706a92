use std::num::NonZeroUsize;

use clap::Parser;
use storydesk::{DraftSession, StoryBackend, StoryDraft, StoryId};
use tracing::instrument;

use super::{
    Context, DraftArgs, submit,
    terminal::{self, Colorize},
};

#[derive(Debug, Parser)]
#[command(about = "Edit an existing story")]
pub struct Edit {
    /// The story's identifier
    id: StoryId,

    #[command(flatten)]
    fields: DraftArgs,

    /// Remove the tag at this position (1-based, as listed by `show`).
    ///
    /// Repeatable. Removals are applied in the order given, before any
    /// additions, and each one shifts later positions down.
    #[arg(long, value_name = "N")]
    remove_tag: Vec<NonZeroUsize>,

    /// Remove the chapter at this position (1-based, as listed by `show`).
    ///
    /// Repeatable, with the same ordering rules as `--remove-tag`.
    #[arg(long, value_name = "N")]
    remove_chapter: Vec<NonZeroUsize>,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Edit {
    #[instrument(level = "debug", skip(self, context), fields(id = %self.id))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let client = context.client()?;

        let spinner = terminal::spinner("Loading story...");
        let record = client.get_story(&self.id);
        spinner.finish_and_clear();
        let record =
            record.map_err(|e| anyhow::anyhow!("Error fetching story {}: {e}", self.id))?;

        let mut session = DraftSession::hydrate(record)
            .map_err(|e| anyhow::anyhow!("Story {} cannot be edited: {e}", self.id))?;
        let draft = session
            .draft_mut()
            .ok_or_else(|| anyhow::anyhow!("draft session is not editable"))?;

        self.apply_removals(draft);
        self.fields.apply(draft)?;

        submit::confirm_and_submit(&mut session, &client, self.yes, "Save changes?")
    }

    fn apply_removals(&self, draft: &mut StoryDraft) {
        for position in &self.remove_tag {
            match draft.remove_tag(position.get() - 1) {
                Some(tag) => println!("{}", format!("Removed tag '{tag}'").dim()),
                None => eprintln!(
                    "{}",
                    format!("⚠️  No tag at position {position}").warning()
                ),
            }
        }
        for position in &self.remove_chapter {
            match draft.remove_chapter(position.get() - 1) {
                Some(chapter) => {
                    println!("{}", format!("Removed chapter '{}'", chapter.title).dim());
                }
                None => eprintln!(
                    "{}",
                    format!("⚠️  No chapter at position {position}").warning()
                ),
            }
        }
    }
}
