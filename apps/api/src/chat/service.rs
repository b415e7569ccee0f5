use std::collections::HashMap;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::assistant::{AssistantError, AssistantsApi, Message, Run, RunStatus};
use crate::chat::threads::ThreadStore;
use crate::chat::verticals::Vertical;
use crate::config::ChatSettings;
use crate::errors::AppError;

/// Returned when a completed run produced no assistant text.
pub const NO_RESPONSE: &str = "No response";

/// One user message addressed to a vertical's mentor.
pub struct ChatTurn<'a> {
    pub vertical: Vertical,
    pub assistant_id: &'a str,
    pub message: &'a str,
    pub thread_id: Option<&'a str>,
    pub user_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub message: String,
    pub thread_id: String,
}

/// Thread chosen for a turn. `stored` is set when the thread is the one kept
/// in the thread store for the signed-in user.
struct ResolvedThread {
    id: String,
    stored: bool,
}

/// Posts the message, runs the assistant to completion and returns its answer.
pub async fn converse(
    api: &dyn AssistantsApi,
    threads: &dyn ThreadStore,
    settings: &ChatSettings,
    turn: ChatTurn<'_>,
) -> Result<ChatReply, AppError> {
    if turn.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let mut thread = resolve_thread(api, threads, &turn).await?;

    match api.create_message(&thread.id, turn.message).await {
        Ok(_) => {}
        // The remembered thread is gone upstream; start over on a fresh one.
        Err(AssistantError::Api { status: 404, .. }) if thread.stored => {
            warn!("Remembered thread {} no longer exists, starting a new one", thread.id);
            thread = start_thread(api, threads, &turn).await?;
            api.create_message(&thread.id, turn.message).await?;
        }
        Err(e) => return Err(e.into()),
    }

    let run = api.create_run(&thread.id, turn.assistant_id).await?;
    info!(
        "Run {} started on thread {} ({} mentor)",
        run.id,
        thread.id,
        turn.vertical.slug()
    );

    let finished = match wait_for_run(api, &run, settings).await {
        Err(AppError::AssistantTimeout(secs)) => {
            abandon_run(api, threads, &turn, &thread, &run).await;
            return Err(AppError::AssistantTimeout(secs));
        }
        other => other?,
    };

    if finished.status != RunStatus::Completed {
        let (code, detail) = finished
            .last_error
            .as_ref()
            .map(|e| (e.code.as_deref().unwrap_or("unknown"), e.message.as_str()))
            .unwrap_or(("none", "no error detail"));
        return Err(AppError::Assistant(format!(
            "run {} ended with status {:?} ({code}): {detail}",
            finished.id, finished.status
        )));
    }

    let messages = api.list_messages(&thread.id).await?;
    Ok(ChatReply {
        message: extract_reply(&messages, &finished.id),
        thread_id: thread.id,
    })
}

/// Picks the thread for this turn: the one the client sent, the one remembered
/// for the signed-in user, or a fresh one.
async fn resolve_thread(
    api: &dyn AssistantsApi,
    threads: &dyn ThreadStore,
    turn: &ChatTurn<'_>,
) -> Result<ResolvedThread, AppError> {
    if let Some(thread_id) = turn.thread_id.filter(|t| !t.trim().is_empty()) {
        let thread = api.retrieve_thread(thread_id).await?;
        return Ok(ResolvedThread {
            id: thread.id,
            stored: false,
        });
    }

    if let Some(user_id) = turn.user_id {
        match threads.remembered(user_id, turn.vertical).await {
            Ok(Some(thread_id)) => {
                debug!("Reusing remembered thread {thread_id} for user {user_id}");
                return Ok(ResolvedThread {
                    id: thread_id,
                    stored: true,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Thread lookup failed for user {user_id}: {e:#}"),
        }
    }

    start_thread(api, threads, turn).await
}

/// Creates a thread and, for a signed-in user, remembers it for the vertical.
async fn start_thread(
    api: &dyn AssistantsApi,
    threads: &dyn ThreadStore,
    turn: &ChatTurn<'_>,
) -> Result<ResolvedThread, AppError> {
    let metadata = turn
        .user_id
        .map(|user_id| HashMap::from([("userId".to_string(), user_id.to_string())]));
    let thread = api.create_thread(metadata).await?;

    let mut stored = false;
    if let Some(user_id) = turn.user_id {
        match threads.remember(user_id, turn.vertical, &thread.id).await {
            Ok(()) => stored = true,
            Err(e) => warn!("Could not remember thread {} for user {user_id}: {e:#}", thread.id),
        }
    }

    Ok(ResolvedThread {
        id: thread.id,
        stored,
    })
}

/// Cancels a run that outlived the poll timeout. A thread with an active run
/// rejects new messages, so the remembered thread is dropped as well.
async fn abandon_run(
    api: &dyn AssistantsApi,
    threads: &dyn ThreadStore,
    turn: &ChatTurn<'_>,
    thread: &ResolvedThread,
    run: &Run,
) {
    if let Err(e) = api.cancel_run(&run.thread_id, &run.id).await {
        warn!("Could not cancel run {}: {e}", run.id);
    }
    if let (true, Some(user_id)) = (thread.stored, turn.user_id) {
        if let Err(e) = threads.forget(user_id, turn.vertical).await {
            warn!("Could not forget thread {} for user {user_id}: {e:#}", thread.id);
        }
    }
}

/// Polls the run at a fixed interval until it leaves the pending states.
pub async fn wait_for_run(
    api: &dyn AssistantsApi,
    run: &Run,
    settings: &ChatSettings,
) -> Result<Run, AppError> {
    let deadline = Instant::now() + settings.poll_timeout;
    let mut current = api.retrieve_run(&run.thread_id, &run.id).await?;

    while current.status.is_pending() {
        if Instant::now() >= deadline {
            return Err(AppError::AssistantTimeout(settings.poll_timeout.as_secs()));
        }
        tokio::time::sleep(settings.poll_interval).await;
        current = api.retrieve_run(&run.thread_id, &run.id).await?;
        debug!("Run {} status: {:?}", current.id, current.status);
    }

    Ok(current)
}

/// Text of the newest assistant message produced by `run_id`.
/// `messages` must be ordered newest first.
pub fn extract_reply(messages: &[Message], run_id: &str) -> String {
    messages
        .iter()
        .filter(|m| m.is_assistant() && m.run_id.as_deref() == Some(run_id))
        .find_map(|m| m.text())
        .map(str::to_string)
        .unwrap_or_else(|| NO_RESPONSE.to_string())
}
