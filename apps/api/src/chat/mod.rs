// Mentor chat: per-vertical assistants, thread memory and the run-polling loop.
// All OpenAI traffic goes through crate::assistant.

pub mod handlers;
pub mod service;
pub mod threads;
pub mod verticals;
