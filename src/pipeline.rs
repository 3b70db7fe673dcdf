//! The two model stages and the rule deciding when the analysis reruns.

use tracing::{error, info};

use crate::lesson::{LessonRequest, analysis_instruction, lesson_instruction};
use crate::model::{ModelError, VisionModel};
use crate::session::{Credential, SessionState, UploadedGraph};

/// What happened when a page render asked for the analysis.
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// No key yet, nothing was sent.
    MissingCredential,
    /// The stored analysis already matches the upload.
    Cached,
    /// A fresh analysis was fetched and stored.
    Analyzed,
    /// The call failed; the analysis stays unset.
    Failed(ModelError),
}

/// Why a generate request produced no lesson.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No key yet, nothing was sent.
    #[error("no API key has been entered")]
    MissingCredential,
    /// There is no analysis for the current upload to build on.
    #[error("the current graph has not been analyzed")]
    MissingAnalysis,
    /// The call itself failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Runs the analysis for `graph` unless `state` already holds it.
pub async fn ensure_analysis(
    state: &mut SessionState,
    graph: &UploadedGraph,
    credential: Option<&Credential>,
    model: &dyn VisionModel,
) -> AnalysisOutcome {
    let Some(credential) = credential else {
        return AnalysisOutcome::MissingCredential;
    };
    if !state.needs_analysis(graph) {
        return AnalysisOutcome::Cached;
    }

    info!("Analyzing {} with {}", graph.filename, model.name());
    match model
        .generate(credential, analysis_instruction(), graph)
        .await
    {
        Ok(analysis) => {
            state.record_analysis(graph, analysis);
            AnalysisOutcome::Analyzed
        }
        Err(err) => {
            error!("Analysis of {} failed: {}", graph.filename, err);
            AnalysisOutcome::Failed(err)
        }
    }
}

/// Generates the lesson for `request` from the stored analysis and keeps the reply in `state`.
///
/// On failure `state` is left as it was, including any earlier lesson.
pub async fn generate_lesson(
    state: &mut SessionState,
    graph: &UploadedGraph,
    credential: Option<&Credential>,
    request: LessonRequest,
    model: &dyn VisionModel,
) -> Result<(), GenerationError> {
    let credential = credential.ok_or(GenerationError::MissingCredential)?;
    let analysis = state
        .analysis_for(graph)
        .ok_or(GenerationError::MissingAnalysis)?;
    let instruction = lesson_instruction(request, analysis);

    info!(
        "Generating a {:?}/{:?} lesson for {} with {}",
        request.game,
        request.level,
        graph.filename,
        model.name()
    );
    let lesson = model
        .generate(credential, &instruction, graph)
        .await
        .inspect_err(|err| error!("Lesson generation for {} failed: {}", graph.filename, err))?;
    state.record_lesson(lesson);
    Ok(())
}
