use dialoguer::{Confirm, theme::ColorfulTheme};
use storydesk::{
    DraftSession, StoryBackend, StoryDraft,
    domain::{SubmitError, ValidationError},
};

use super::{show, terminal::{self, Colorize}};

/// Validates the session's draft, asks for confirmation and submits it.
///
/// Declining the prompt discards the draft. Validation errors are listed
/// inline and leave nothing sent.
pub fn confirm_and_submit<B>(
    session: &mut DraftSession,
    backend: &B,
    yes: bool,
    prompt: &str,
) -> anyhow::Result<()>
where
    B: StoryBackend + ?Sized,
{
    let Some(draft) = session.draft() else {
        anyhow::bail!("no draft is open");
    };

    if let Err(errors) = draft.validate_for_submit() {
        print_validation_errors(errors.iter());
        anyhow::bail!("Story not saved");
    }

    print_summary(draft);

    if !yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        if !proceed {
            session.discard()?;
            println!("Cancelled");
            std::process::exit(130);
        }
    }

    let submission = match session.begin_submission() {
        Ok(submission) => submission,
        Err(SubmitError::Validation(errors)) => {
            print_validation_errors(errors.iter());
            anyhow::bail!("Story not saved");
        }
        Err(e) => return Err(e.into()),
    };

    let spinner = terminal::spinner("Saving story...");
    let result = submission.send(backend);
    spinner.finish_and_clear();

    match session.complete(result) {
        Ok(record) => {
            let id = record
                .id
                .map_or_else(|| "?".to_string(), |id| id.to_string());
            println!(
                "{}",
                format!("✅ Saved story {id} ({})", submission.target).success()
            );
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to save story: {e}")),
    }
}

fn print_validation_errors<'a>(errors: impl Iterator<Item = &'a ValidationError>) {
    eprintln!("{}", "The story is incomplete:".warning());
    for error in errors {
        eprintln!("  • {}", error.to_string().error());
    }
}

fn print_summary(draft: &StoryDraft) {
    let heading = draft
        .identifier()
        .map_or_else(|| "New story".to_string(), |id| format!("Story {id}"));
    println!("{}", heading.dim());
    println!("  Title:     {}", draft.title());
    println!("  Author:    {}", draft.author());
    if let Some(category) = draft.category() {
        println!("  Category:  {category}");
    }
    if let Some(status) = draft.status() {
        println!("  Status:    {}", terminal::status_badge(status.as_str()));
    }
    if let Some(cover) = draft.cover_image() {
        println!("  Cover:     {cover}");
    }
    if !draft.tags().is_empty() {
        println!("  Tags:      {}", draft.tags().join(", "));
    }
    for (index, chapter) in draft.chapters().iter().enumerate() {
        println!(
            "  {:>2}. {} {}",
            index + 1,
            chapter.title,
            show::format_updated(chapter.last_updated).dim()
        );
    }
    println!();
}
