//! Scripted in-process stand-in for the Assistants API, used by tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::types::{MessageContent, RunError, TextValue};
use super::{AssistantError, AssistantsApi, FileObject, Message, Run, RunStatus, Thread};

#[derive(Default)]
struct Script {
    next_id: u32,
    threads: HashSet<String>,
    thread_metadata: Vec<Option<HashMap<String, String>>>,
    run_statuses: VecDeque<RunStatus>,
    last_run: Option<(String, String)>,
    reply: Option<String>,
    posted: Vec<(String, String)>,
    polls: usize,
    cancelled: Vec<String>,
    uploads: Vec<(String, String)>,
    attachments: Vec<(String, String)>,
    deleted_files: Vec<String>,
}

#[derive(Default)]
pub struct ScriptedAssistants {
    script: Mutex<Script>,
}

impl ScriptedAssistants {
    pub fn replying(reply: &str) -> Self {
        let fake = Self::default();
        fake.script.lock().unwrap().reply = Some(reply.to_string());
        fake
    }

    /// Statuses returned by successive `retrieve_run` calls; `completed` once exhausted.
    pub fn with_statuses(self, statuses: &[RunStatus]) -> Self {
        self.script.lock().unwrap().run_statuses = statuses.iter().copied().collect();
        self
    }

    pub fn with_thread(self, thread_id: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .threads
            .insert(thread_id.to_string());
        self
    }

    pub fn posted(&self) -> Vec<(String, String)> {
        self.script.lock().unwrap().posted.clone()
    }

    pub fn polls(&self) -> usize {
        self.script.lock().unwrap().polls
    }

    pub fn created_thread_metadata(&self) -> Vec<Option<HashMap<String, String>>> {
        self.script.lock().unwrap().thread_metadata.clone()
    }

    pub fn uploads(&self) -> Vec<(String, String)> {
        self.script.lock().unwrap().uploads.clone()
    }

    /// Files currently attached, as `(vector_store_id, file_id)`.
    pub fn attachments(&self) -> Vec<(String, String)> {
        self.script.lock().unwrap().attachments.clone()
    }

    pub fn deleted_files(&self) -> Vec<String> {
        self.script.lock().unwrap().deleted_files.clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.script.lock().unwrap().cancelled.clone()
    }
}

fn thread_not_found(thread_id: &str) -> AssistantError {
    AssistantError::Api {
        status: 404,
        message: format!("No thread found with id '{thread_id}'."),
    }
}

fn assistant_message(id: &str, run_id: &str, text: &str) -> Message {
    Message {
        id: id.to_string(),
        role: "assistant".to_string(),
        run_id: Some(run_id.to_string()),
        content: vec![MessageContent {
            content_type: "text".to_string(),
            text: Some(TextValue {
                value: text.to_string(),
            }),
        }],
    }
}

#[async_trait]
impl AssistantsApi for ScriptedAssistants {
    async fn create_thread(
        &self,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<Thread, AssistantError> {
        let mut script = self.script.lock().unwrap();
        script.next_id += 1;
        let id = format!("thread_fake{}", script.next_id);
        script.threads.insert(id.clone());
        script.thread_metadata.push(metadata);
        Ok(Thread { id })
    }

    async fn retrieve_thread(&self, thread_id: &str) -> Result<Thread, AssistantError> {
        let script = self.script.lock().unwrap();
        if script.threads.contains(thread_id) {
            Ok(Thread {
                id: thread_id.to_string(),
            })
        } else {
            Err(thread_not_found(thread_id))
        }
    }

    async fn create_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<Message, AssistantError> {
        let mut script = self.script.lock().unwrap();
        if !script.threads.contains(thread_id) {
            return Err(thread_not_found(thread_id));
        }
        script
            .posted
            .push((thread_id.to_string(), content.to_string()));
        Ok(Message {
            id: format!("msg_user{}", script.posted.len()),
            role: "user".to_string(),
            run_id: None,
            content: Vec::new(),
        })
    }

    async fn create_run(&self, thread_id: &str, _assistant_id: &str) -> Result<Run, AssistantError> {
        let mut script = self.script.lock().unwrap();
        script.next_id += 1;
        let id = format!("run_fake{}", script.next_id);
        script.last_run = Some((thread_id.to_string(), id.clone()));
        Ok(Run {
            id,
            thread_id: thread_id.to_string(),
            status: RunStatus::Queued,
            last_error: None,
        })
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        let mut script = self.script.lock().unwrap();
        script.polls += 1;
        let status = script
            .run_statuses
            .pop_front()
            .unwrap_or(RunStatus::Completed);
        let last_error = (status == RunStatus::Failed).then(|| RunError {
            code: Some("server_error".to_string()),
            message: "Sorry, something went wrong.".to_string(),
        });
        Ok(Run {
            id: run_id.to_string(),
            thread_id: thread_id.to_string(),
            status,
            last_error,
        })
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        self.script.lock().unwrap().cancelled.push(run_id.to_string());
        Ok(Run {
            id: run_id.to_string(),
            thread_id: thread_id.to_string(),
            status: RunStatus::Cancelling,
            last_error: None,
        })
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<Message>, AssistantError> {
        let script = self.script.lock().unwrap();
        let mut messages = Vec::new();
        if let (Some(reply), Some((_, run_id))) = (&script.reply, &script.last_run) {
            messages.push(assistant_message("msg_new", run_id, reply));
        }
        // An answer from an earlier run on the same thread.
        messages.push(assistant_message(
            "msg_old",
            "run_earlier",
            "Earlier answer that must not be returned.",
        ));
        Ok(messages)
    }

    async fn upload_file(
        &self,
        filename: &str,
        contents: Bytes,
    ) -> Result<FileObject, AssistantError> {
        let mut script = self.script.lock().unwrap();
        script.next_id += 1;
        script.uploads.push((
            filename.to_string(),
            String::from_utf8_lossy(&contents).into_owned(),
        ));
        Ok(FileObject {
            id: format!("file_fake{}", script.next_id),
        })
    }

    async fn attach_file_to_vector_store(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> Result<(), AssistantError> {
        self.script
            .lock()
            .unwrap()
            .attachments
            .push((vector_store_id.to_string(), file_id.to_string()));
        Ok(())
    }

    async fn detach_file_from_vector_store(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> Result<(), AssistantError> {
        self.script
            .lock()
            .unwrap()
            .attachments
            .retain(|(store, file)| !(store == vector_store_id && file == file_id));
        Ok(())
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), AssistantError> {
        self.script
            .lock()
            .unwrap()
            .deleted_files
            .push(file_id.to_string());
        Ok(())
    }
}
