//! AI message pipelines
//!
//! One pipeline per inbound content type: chat replies for text, image
//! analysis, and document analysis after content extraction. Pipelines
//! acknowledge with a reaction, talk to the AI backend, log the request
//! and stream the reply in transport-sized parts. AI failures resolve to
//! a canned fallback reply; audit-log failures are logged and swallowed
//! so they never break the conversation.

use std::time::Instant;

use tracing::warn;

use crate::handlers::replies;
use crate::models::{AiRequestType, CreateAiRequestLog, CreateFileProcessingLog, User};
use crate::services::ai::ChatContext;
use crate::services::files::extraction_failed;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::helpers::split_for_transport;
use crate::utils::logging::log_api_error;

const CHAT_REACTION: &str = "🤖";
const IMAGE_REACTION: &str = "👁️";
const FILE_REACTION: &str = "📄";

/// Generate and send a chat reply to a plain text message
pub async fn handle_chat(
    services: &ServiceFactory,
    user: &User,
    message_id: &str,
    text: &str,
) -> Result<()> {
    react(services, user, message_id, CHAT_REACTION).await;

    let context = ChatContext::from(user);
    let started = Instant::now();
    match services.ai.chat_response(text, Some(&context)).await {
        Ok(reply) => {
            log_ai_request(services, user, AiRequestType::Chat, text, &reply, started).await;
            send_parts(services, &user.phone_number, &reply).await
        }
        Err(e) => {
            log_api_error("gemini", &e.to_string(), Some("chat"));
            let fallback = replies::ai_unavailable();
            log_ai_request(services, user, AiRequestType::Chat, text, &fallback, started).await;
            services
                .whatsapp
                .send_text(&user.phone_number, &fallback)
                .await
        }
    }
}

/// Download and analyze an inbound image
pub async fn handle_image(
    services: &ServiceFactory,
    user: &User,
    message_id: &str,
    media_id: &str,
    mime_type: &str,
    caption: Option<&str>,
) -> Result<()> {
    react(services, user, message_id, IMAGE_REACTION).await;
    send_ack(services, &user.phone_number, &replies::analyzing_image()).await;

    let bytes = match services.whatsapp.fetch_media(media_id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log_api_error("whatsapp", &e.to_string(), Some("image download"));
            return services
                .whatsapp
                .send_text(&user.phone_number, &replies::media_download_failed())
                .await;
        }
    };

    let prompt = caption.unwrap_or("[image]").to_string();
    let started = Instant::now();
    match services.ai.analyze_image(&bytes, mime_type, caption).await {
        Ok(analysis) => {
            log_ai_request(
                services,
                user,
                AiRequestType::ImageAnalysis,
                &prompt,
                &analysis,
                started,
            )
            .await;
            send_parts(services, &user.phone_number, &analysis).await
        }
        Err(e) => {
            log_api_error("gemini", &e.to_string(), Some("image analysis"));
            let fallback = replies::image_analysis_failed();
            log_ai_request(
                services,
                user,
                AiRequestType::ImageAnalysis,
                &prompt,
                &fallback,
                started,
            )
            .await;
            services
                .whatsapp
                .send_text(&user.phone_number, &fallback)
                .await
        }
    }
}

/// Download an inbound document, extract its content and analyze it.
/// Extraction failures short-circuit into the marker message and are
/// recorded without an AI round trip.
pub async fn handle_document(
    services: &ServiceFactory,
    user: &User,
    message_id: &str,
    media_id: &str,
    filename: &str,
) -> Result<()> {
    react(services, user, message_id, FILE_REACTION).await;
    send_ack(services, &user.phone_number, &replies::processing_file(filename)).await;

    let started = Instant::now();
    let bytes = match services.whatsapp.fetch_media(media_id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log_api_error("whatsapp", &e.to_string(), Some("document download"));
            return services
                .whatsapp
                .send_text(&user.phone_number, &replies::media_download_failed())
                .await;
        }
    };

    let (content, info) = services.files.extract_content(&bytes, filename);

    if extraction_failed(&content) {
        log_file_processing(services, user, &info, false, false, started).await;
        return services.whatsapp.send_text(&user.phone_number, &content).await;
    }

    match services
        .ai
        .analyze_file_content(&content, &info.filename, &info.extension)
        .await
    {
        Ok(analysis) => {
            log_file_processing(services, user, &info, true, true, started).await;
            log_ai_request(
                services,
                user,
                AiRequestType::FileAnalysis,
                &info.filename,
                &analysis,
                started,
            )
            .await;
            let reply = format!("📄 *Analysis of {}*\n\n{}", info.filename, analysis);
            send_parts(services, &user.phone_number, &reply).await
        }
        Err(e) => {
            log_api_error("gemini", &e.to_string(), Some("file analysis"));
            let fallback = replies::file_analysis_failed();
            log_file_processing(services, user, &info, true, false, started).await;
            log_ai_request(
                services,
                user,
                AiRequestType::FileAnalysis,
                &info.filename,
                &fallback,
                started,
            )
            .await;
            services
                .whatsapp
                .send_text(&user.phone_number, &fallback)
                .await
        }
    }
}

/// Send a reply in transport-sized parts
async fn send_parts(services: &ServiceFactory, to: &str, text: &str) -> Result<()> {
    for part in split_for_transport(text) {
        services.whatsapp.send_text(to, &part).await?;
    }
    Ok(())
}

/// Acknowledgement reaction, best effort
async fn react(services: &ServiceFactory, user: &User, message_id: &str, emoji: &str) {
    if let Err(e) = services
        .whatsapp
        .send_reaction(&user.phone_number, message_id, emoji)
        .await
    {
        warn!(phone = %user.phone_number, error = %e, "Reaction failed");
    }
}

/// Acknowledgement text, best effort
async fn send_ack(services: &ServiceFactory, to: &str, text: &str) {
    if let Err(e) = services.whatsapp.send_text(to, text).await {
        warn!(phone = %to, error = %e, "Acknowledgement failed");
    }
}

async fn log_ai_request(
    services: &ServiceFactory,
    user: &User,
    request_type: AiRequestType,
    prompt: &str,
    response: &str,
    started: Instant,
) {
    let log = CreateAiRequestLog {
        user_id: user.id,
        request_type,
        prompt: prompt.to_string(),
        response: response.to_string(),
        processing_time: started.elapsed().as_secs_f64(),
    };
    if let Err(e) = services.db.ai_requests.create(log).await {
        warn!(error = %e, "Failed to log AI request");
    }
}

async fn log_file_processing(
    services: &ServiceFactory,
    user: &User,
    info: &crate::services::FileInfo,
    content_extracted: bool,
    ai_analyzed: bool,
    started: Instant,
) {
    let log = CreateFileProcessingLog {
        user_id: user.id,
        filename: info.filename.clone(),
        file_type: info.extension.clone(),
        file_size: info.size as i64,
        content_extracted,
        ai_analyzed,
        processing_time: started.elapsed().as_secs_f64(),
    };
    if let Err(e) = services.db.files.create(log).await {
        warn!(error = %e, "Failed to log file processing");
    }
}
