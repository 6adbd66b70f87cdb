// src/handlers/practice.rs

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::Utc;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    error::AppError,
    generation::{GenerationBackend, generate_with_fallback},
    history,
    models::practice::{
        DraftRequest, DraftResponse, EvaluateRequest, EvaluateResponse, GenerateRequest,
        GenerateResponse, SessionView, StructureResponse, TimerResponse,
    },
    prompt::{build_feedback_prompt, build_question_prompt, build_structure_prompt},
    session::{Session, SessionId},
    state::AppState,
};

/// Topics offered by the topic selector. Free-text topics are accepted by
/// the generate endpoints regardless.
const PRESET_TOPICS: &[&str] = &[
    "Leadership vision",
    "Character education",
    "Smart campus strategy",
    "Curriculum innovation",
    "Crisis management",
    "Community engagement",
];

/// Lists the preset practice topics.
pub async fn list_topics() -> impl IntoResponse {
    Json(PRESET_TOPICS)
}

/// Generates a new interview question (whole-response mode).
///
/// * Builds the examiner prompt from the topic and optional reference text.
/// * Tries the candidate models in order; first success wins.
/// * On success, replaces the session's current question and clears stale
///   feedback and the outline hint.
/// * On failure, session state is left untouched and the last provider
///   error is surfaced inline.
pub async fn generate(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Json(req): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let backend = require_generator(&state)?;
    let prompt = build_question_prompt(&req.topic, req.grounding_text.as_deref());

    let generated = generate_with_fallback(backend.as_ref(), &state.config.model_candidates, &prompt)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    state
        .sessions
        .update(session_id, |s| s.install_prompt(&req.topic, &generated.text))
        .await
        .ok_or_else(session_gone)?;

    Ok(Json(GenerateResponse {
        question: generated.text,
        theme: req.topic,
        model: generated.model,
    }))
}

/// Generates a new interview question with incremental delivery (SSE).
///
/// Streaming resolves a single model (the first candidate) rather than
/// walking the fallback list. Each fragment is emitted as a `chunk` event
/// as it arrives; when the channel closes, the accumulated buffer becomes
/// the session's question and is re-emitted whole as the `done` event.
/// Failures surface as an `error` event and leave the session untouched.
pub async fn generate_stream(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Json(req): Json<GenerateRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let backend = require_generator(&state)?;
    let model = state
        .config
        .model_candidates
        .first()
        .cloned()
        .ok_or_else(|| {
            AppError::ServiceUnavailable("No generation models configured".to_string())
        })?;

    let prompt = build_question_prompt(&req.topic, req.grounding_text.as_deref());
    let theme = req.topic.clone();
    let sessions = state.sessions.clone();

    let (tx, rx) = mpsc::channel::<Event>(16);

    tokio::spawn(async move {
        match backend.stream(&model, &prompt).await {
            Ok(mut chunks) => {
                let mut full = String::new();
                while let Some(item) = chunks.next().await {
                    match item {
                        Ok(text) => {
                            full.push_str(&text);
                            if !emit(&tx, "chunk", &text).await {
                                // Client went away; drop the stream.
                                return;
                            }
                        }
                        Err(err) => {
                            tracing::warn!("stream from model {} broke: {}", model, err);
                            emit(&tx, "error", err.to_string()).await;
                            return;
                        }
                    }
                }

                if full.is_empty() {
                    emit(&tx, "error", "response contained no text").await;
                    return;
                }

                sessions
                    .update(session_id, |s| s.install_prompt(&theme, &full))
                    .await;
                emit(&tx, "done", &full).await;
            }
            Err(err) => {
                tracing::warn!("could not open stream with model {}: {}", model, err);
                emit(&tx, "error", err.to_string()).await;
            }
        }
    });

    let events = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok::<_, Infallible>(event), rx))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Sends one SSE event; returns false once the client has disconnected.
async fn emit(tx: &mpsc::Sender<Event>, kind: &str, data: impl Serialize) -> bool {
    match Event::default().event(kind).json_data(data) {
        Ok(event) => tx.send(event).await.is_ok(),
        Err(e) => {
            tracing::error!("failed to encode SSE event: {}", e);
            true
        }
    }
}

/// Returns the full session snapshot the client renders from after a
/// reload: question, theme, draft size, feedback, outline hint and the
/// freshly derived countdown.
pub async fn session_view(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(session_id).await.ok_or_else(session_gone)?;
    let timer = timer_view(&session, state.config.timer_seconds);

    Ok(Json(SessionView {
        question: session.current_prompt,
        theme: session.current_theme,
        draft_chars: session.draft_answer.chars().count(),
        feedback: session.last_feedback,
        structure: session.suggested_structure,
        timer,
    }))
}

/// Stores the answer draft and returns its character count.
/// The text is accepted verbatim; no length or content checks.
pub async fn update_draft(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Json(req): Json<DraftRequest>,
) -> Result<impl IntoResponse, AppError> {
    let chars = state
        .sessions
        .update(session_id, |s| s.set_draft(req.text))
        .await
        .ok_or_else(session_gone)?;

    Ok(Json(DraftResponse { chars }))
}

/// Returns an answer-outline hint for the current question.
///
/// The hint is cached on the session and served from cache until a new
/// question invalidates it, so repeated clicks cost one generation call.
pub async fn structure_hint(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(session_id).await.ok_or_else(session_gone)?;
    let question = session.current_prompt.ok_or_else(|| {
        AppError::BadRequest("Generate a question before asking for an outline".to_string())
    })?;

    if let Some(cached) = session.suggested_structure {
        return Ok(Json(StructureResponse {
            structure: cached,
            cached: true,
        }));
    }

    let backend = require_generator(&state)?;
    let prompt = build_structure_prompt(&question);

    let generated = generate_with_fallback(backend.as_ref(), &state.config.model_candidates, &prompt)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    state
        .sessions
        .update(session_id, |s| s.suggested_structure = Some(generated.text.clone()))
        .await
        .ok_or_else(session_gone)?;

    Ok(Json(StructureResponse {
        structure: generated.text,
        cached: false,
    }))
}

/// Submits an answer for evaluation.
///
/// * Requires a current question; the submitted answer (or the stored
///   draft when none is submitted) is embedded into the rubric prompt.
/// * On success, stores the feedback and best-effort records the attempt
///   to the external history store; `recorded: false` never fails the call.
/// * On generation failure, the draft and question are preserved so the
///   user can simply retry.
pub async fn evaluate(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Json(req): Json<EvaluateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let backend = require_generator(&state)?;

    let session = state.sessions.get(session_id).await.ok_or_else(session_gone)?;
    let question = session.current_prompt.clone().ok_or_else(|| {
        AppError::BadRequest("Generate a question before submitting an answer".to_string())
    })?;

    let answer = match req.answer {
        Some(text) => {
            // Keep the stored draft in sync with what was actually submitted.
            state
                .sessions
                .update(session_id, |s| {
                    s.set_draft(text.clone());
                })
                .await
                .ok_or_else(session_gone)?;
            text
        }
        None => session.draft_answer.clone(),
    };

    if answer.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Nothing to evaluate: the answer is empty".to_string(),
        ));
    }

    let prompt = build_feedback_prompt(&question, &answer);

    let generated = generate_with_fallback(backend.as_ref(), &state.config.model_candidates, &prompt)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    state
        .sessions
        .update(session_id, |s| s.set_feedback(generated.text.clone()))
        .await
        .ok_or_else(session_gone)?;

    let recorded = match &state.history {
        Some(store) => {
            history::record(store.as_ref(), &session.current_theme, &answer, &generated.text).await
        }
        None => false,
    };

    let score = history::extract_score(&generated.text);

    Ok(Json(EvaluateResponse {
        feedback: generated.text,
        score,
        recorded,
    }))
}

/// Arms (or re-arms) the practice countdown. Overwrites any previous start.
pub async fn arm_timer(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    state
        .sessions
        .update(session_id, |s| s.arm_timer(now))
        .await
        .ok_or_else(session_gone)?;

    Ok(Json(TimerResponse {
        armed: true,
        started_at: Some(now),
        duration_secs: state.config.timer_seconds,
        remaining_secs: state.config.timer_seconds,
    }))
}

/// Reports the countdown state, derived fresh from the wall clock.
pub async fn timer_status(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(session_id).await.ok_or_else(session_gone)?;
    Ok(Json(timer_view(&session, state.config.timer_seconds)))
}

fn timer_view(session: &Session, duration_secs: u64) -> TimerResponse {
    match session.timer_start {
        Some(start) => TimerResponse {
            armed: true,
            started_at: Some(start),
            duration_secs,
            remaining_secs: crate::timer::remaining_secs(start, duration_secs, Utc::now()),
        },
        None => TimerResponse {
            armed: false,
            started_at: None,
            duration_secs,
            remaining_secs: duration_secs,
        },
    }
}

fn require_generator(state: &AppState) -> Result<Arc<dyn GenerationBackend>, AppError> {
    state.generator.clone().ok_or_else(|| {
        AppError::ServiceUnavailable("Question generation is not configured".to_string())
    })
}

fn session_gone() -> AppError {
    AppError::AuthError("Session expired".to_string())
}
