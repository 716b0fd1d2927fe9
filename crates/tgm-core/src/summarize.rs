//! Summarize recent history of a chosen group through an external summarizer.

use crate::{
    domain::GroupFilter,
    groups::GroupDirectory,
    ports::{GroupSelector, Summarizer},
    Result,
};

pub const DEFAULT_MESSAGE_LIMIT: usize = 100;

const SUMMARY_PROMPT: &str = "Summarize the following text: ";

/// Returns `None` when nothing was selected or the group has no text history.
pub async fn summarize_group(
    directory: &GroupDirectory,
    selector: &dyn GroupSelector,
    summarizer: &dyn Summarizer,
    message_limit: usize,
) -> Result<Option<String>> {
    let Some(group) = directory.select_group(GroupFilter::Any, selector).await? else {
        return Ok(None);
    };

    let messages = directory
        .client()
        .recent_messages(&group, message_limit)
        .await?;
    let mut text = String::new();
    for msg in messages {
        let Some(body) = msg.text.filter(|t| !t.is_empty()) else {
            continue;
        };
        text.push_str(&body);
        text.push('\n');
    }

    if text.trim().is_empty() {
        tracing::info!(group = %group.title, "nothing to summarize");
        return Ok(None);
    }

    tracing::debug!(group = %group.title, chars = text.len(), "text to summarize");
    let answer = summarizer.summarize(&format!("{SUMMARY_PROMPT}{text}")).await?;
    tracing::info!(group = %group.title, "summary ready");
    Ok(Some(answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::PlatformMessage,
        testing::{group, FakePlatform, FakeSummarizer, FixedSelector},
    };
    use std::sync::Arc;

    fn msg(text: Option<&str>) -> PlatformMessage {
        PlatformMessage {
            text: text.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn joins_recent_texts_oldest_first() {
        let p = FakePlatform::default()
            .with_group(group(1, "chat", false))
            .with_messages(
                1,
                vec![msg(Some("dropped")), msg(Some("hello")), msg(None), msg(Some("world"))],
            );
        let dir = GroupDirectory::new(Arc::new(p));
        let summarizer = FakeSummarizer::default();

        let out = summarize_group(&dir, &FixedSelector::new(Some(0)), &summarizer, 3)
            .await
            .unwrap();

        assert!(out.is_some());
        assert_eq!(
            summarizer.prompts(),
            vec!["Summarize the following text: hello\nworld\n".to_string()]
        );
    }

    #[tokio::test]
    async fn empty_history_skips_summarizer() {
        let p = FakePlatform::default()
            .with_group(group(1, "chat", false))
            .with_messages(1, vec![msg(None), msg(Some(""))]);
        let dir = GroupDirectory::new(Arc::new(p));
        let summarizer = FakeSummarizer::default();

        let out = summarize_group(&dir, &FixedSelector::new(Some(0)), &summarizer, 100)
            .await
            .unwrap();
        assert!(out.is_none());
        assert!(summarizer.prompts().is_empty());
    }

    #[tokio::test]
    async fn cancelled_selection_returns_none() {
        let dir = GroupDirectory::new(Arc::new(
            FakePlatform::default().with_group(group(1, "chat", false)),
        ));
        let summarizer = FakeSummarizer::default();
        let out = summarize_group(&dir, &FixedSelector::new(None), &summarizer, 100)
            .await
            .unwrap();
        assert!(out.is_none());
    }
}
