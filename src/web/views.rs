use super::csrf::{csrf_token, validate_csrf};
use super::markdown::render_markdown;
use super::prelude::*;
use super::upload::{UploadError, inspect_upload};
use crate::constants::{LESSON_CONTENT_TYPE, LESSON_FILENAME};
use crate::lesson::{Difficulty, GameType, LessonRequest};
use crate::pipeline::{self, AnalysisOutcome, GenerationError};
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION};
use axum::response::{Redirect, Response};

const MISSING_KEY_WARNING: &str = "נא להזין מפתח API בסרגל הצד כדי להמשיך.";

#[derive(Clone, Debug)]
pub(crate) struct Choice {
    pub(crate) value: &'static str,
    pub(crate) label: &'static str,
    pub(crate) icon: &'static str,
}

fn game_choices() -> Vec<Choice> {
    GameType::ALL
        .into_iter()
        .map(|game| Choice {
            value: game.slug(),
            label: game.label(),
            icon: game.icon(),
        })
        .collect()
}

fn level_choices() -> Vec<Choice> {
    Difficulty::ALL
        .into_iter()
        .map(|level| Choice {
            value: level.slug(),
            label: level.label(),
            icon: "",
        })
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub(crate) struct IndexTemplate {
    csrf_token: String,
    notices: Vec<FlashMessage>,
    has_credential: bool,
    graph_filename: Option<String>,
    analysis_html: Option<String>,
    lesson_html: Option<String>,
    games: Vec<Choice>,
    levels: Vec<Choice>,
    model_name: String,
}

/// Renders the page, running the analysis first when the upload has none.
pub(crate) async fn root_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<IndexTemplate, GraphLessonError> {
    let csrf_token = csrf_token(&session).await?;
    let mut notices = take_flash_messages(&session).await?;
    let credential = session::load_credential(&session).await?;
    let graph = session::load_graph(&session).await?;
    let mut lesson_state = session::load_state(&session).await?;

    let mut analysis_html = None;
    let mut lesson_html = None;
    if let Some(graph) = &graph {
        match pipeline::ensure_analysis(
            &mut lesson_state,
            graph,
            credential.as_ref(),
            state.model.as_ref(),
        )
        .await
        {
            AnalysisOutcome::MissingCredential => {
                notices.push(FlashMessage::new(FlashClass::Warning, MISSING_KEY_WARNING));
            }
            AnalysisOutcome::Cached => {}
            AnalysisOutcome::Analyzed => {
                session::store_state(&session, &lesson_state).await?;
            }
            AnalysisOutcome::Failed(err) => {
                notices.push(FlashMessage::new(
                    FlashClass::Error,
                    format!("שגיאה בניתוח: {err}"),
                ));
            }
        }

        if credential.is_some()
            && let Some(analysis) = lesson_state.analysis_for(graph)
        {
            notices.push(FlashMessage::new(FlashClass::Success, "הניתוח הושלם!"));
            analysis_html = Some(render_markdown(analysis));
            lesson_html = lesson_state.lesson().map(render_markdown);
        }
    }

    Ok(IndexTemplate {
        csrf_token,
        notices,
        has_credential: credential.is_some(),
        graph_filename: graph.map(|graph| graph.filename),
        analysis_html,
        lesson_html,
        games: game_choices(),
        levels: level_choices(),
        model_name: state.model.name().to_string(),
    })
}

#[derive(Deserialize)]
pub(crate) struct CredentialForm {
    csrf_token: String,
    #[serde(default)]
    api_key: String,
}

/// Stores the API key for this session; an empty field forgets it.
pub(crate) async fn credential_handler(
    session: Session,
    Form(form): Form<CredentialForm>,
) -> Result<Redirect, GraphLessonError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let credential = session::Credential::new(form.api_key);
    debug!("Credential {}", if credential.is_some() { "set" } else { "cleared" });
    session::store_credential(&session, credential).await?;
    Ok(Redirect::to("/"))
}

#[derive(Default)]
struct UploadForm {
    csrf_token: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or_default() {
            "csrf_token" => {
                form.csrf_token = Some(field.text().await?);
            }
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.image = Some((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn reject_upload(session: &Session, err: &UploadError) -> Result<Redirect, GraphLessonError> {
    push_flash(
        session,
        FlashMessage::new(FlashClass::Error, format!("הקובץ לא התקבל: {err}")),
    )
    .await?;
    Ok(Redirect::to("/"))
}

/// Accepts a graph image from the `image` multipart field.
pub(crate) async fn upload_handler(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Redirect, GraphLessonError> {
    let form = match read_upload_form(&mut multipart).await {
        Ok(form) => form,
        Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            info!("Rejected upload over {} bytes", state.max_upload_bytes);
            return reject_upload(&session, &UploadError::TooLarge(state.max_upload_bytes)).await;
        }
        Err(err) => return Err(err.into()),
    };

    let csrf_token_value = form
        .csrf_token
        .ok_or_else(|| GraphLessonError::BadRequest("missing csrf_token field".to_string()))?;
    validate_csrf(&session, &csrf_token_value).await?;
    let (filename, bytes) = form
        .image
        .ok_or_else(|| GraphLessonError::BadRequest("missing image field".to_string()))?;

    match inspect_upload(&filename, bytes) {
        Ok(graph) => {
            info!("Received graph {} ({} bytes)", graph.filename, graph.bytes.len());
            let mut lesson_state = session::load_state(&session).await?;
            lesson_state.observe_upload(&graph);
            session::store_graph(&session, &graph).await?;
            session::store_state(&session, &lesson_state).await?;
            Ok(Redirect::to("/"))
        }
        Err(err) => {
            info!("Rejected upload {:?}: {}", filename, err);
            reject_upload(&session, &err).await
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct GenerateForm {
    csrf_token: String,
    game: String,
    level: String,
}

/// Runs the lesson generation for the selected game and level.
pub(crate) async fn generate_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GenerateForm>,
) -> Result<Redirect, GraphLessonError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let request = LessonRequest {
        game: form.game.parse()?,
        level: form.level.parse()?,
    };

    let Some(graph) = session::load_graph(&session).await? else {
        push_flash(
            &session,
            FlashMessage::new(FlashClass::Warning, "יש להעלות תמונה של גרף לפני יצירת מצגת."),
        )
        .await?;
        return Ok(Redirect::to("/"));
    };
    let credential = session::load_credential(&session).await?;
    let mut lesson_state = session::load_state(&session).await?;

    match pipeline::generate_lesson(
        &mut lesson_state,
        &graph,
        credential.as_ref(),
        request,
        state.model.as_ref(),
    )
    .await
    {
        Ok(()) => {
            session::store_state(&session, &lesson_state).await?;
            Ok(Redirect::to("/#lesson"))
        }
        Err(GenerationError::MissingCredential) => {
            push_flash(
                &session,
                FlashMessage::new(FlashClass::Warning, MISSING_KEY_WARNING),
            )
            .await?;
            Ok(Redirect::to("/"))
        }
        Err(GenerationError::MissingAnalysis) => Err(GraphLessonError::BadRequest(format!(
            "no analysis for {}",
            graph.filename
        ))),
        Err(GenerationError::Model(err)) => {
            push_flash(
                &session,
                FlashMessage::new(FlashClass::Error, format!("שגיאה ביצירה: {err}")),
            )
            .await?;
            Ok(Redirect::to("/"))
        }
    }
}

/// Serves the uploaded graph back for the preview.
pub(crate) async fn graph_handler(session: Session) -> Result<Response, GraphLessonError> {
    let graph = session::load_graph(&session)
        .await?
        .ok_or_else(|| GraphLessonError::NotFound("graph".to_string()))?;
    Response::builder()
        .header(CONTENT_TYPE, graph.mime_type)
        .header(CACHE_CONTROL, "no-store")
        .body(axum::body::Body::from(graph.bytes))
        .map_err(GraphLessonError::from)
}

/// Offers the stored lesson text, unchanged, as `lesson.md`.
pub(crate) async fn lesson_download_handler(
    session: Session,
) -> Result<Response, GraphLessonError> {
    let lesson_state = session::load_state(&session).await?;
    let lesson = lesson_state
        .lesson()
        .ok_or_else(|| GraphLessonError::NotFound(LESSON_FILENAME.to_string()))?
        .to_string();
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, LESSON_CONTENT_TYPE)
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{LESSON_FILENAME}\""),
        )
        .header(CACHE_CONTROL, "no-store")
        .body(axum::body::Body::from(lesson))
        .map_err(GraphLessonError::from)
}

pub(crate) async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}
