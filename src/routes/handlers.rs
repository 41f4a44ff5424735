use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use log::{debug, o, warn};
use time::OffsetDateTime;
use warp::{
    http::{StatusCode, Uri},
    redirect::see_other,
    reject,
    reply::{html, json, with_header, with_status, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::form::{FormController, Ignored, SubmitOutcome, SUCCESS_ROUTE, TOKEN_FIELD};
use crate::pages;
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::store::{self, EXPORT_FILE_NAME};
use crate::submission::Field;
use crate::timestamp;

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {
        let start = Instant::now();

        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn form_page(environment: Environment) -> RouteResult {
    timed! {
        let warmed = environment
            .store
            .blocking(|store| store.warm_up())
            .await
            .and_then(|warmed| warmed);

        if let Err(e) = warmed {
            warn!(environment.logger, "Failed to initialize submissions slot"; "error" => %e);
        }

        html(pages::form(&FormController::new(), false))
    }
}

pub async fn submit_form(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let Environment {
            logger,
            store,
            sync,
            tokens,
            ..
        } = environment.clone();

        let fields: HashMap<String, String> = url::form_urlencoded::parse(&body)
            .into_owned()
            .collect();

        let mut form = match fields.get(TOKEN_FIELD).filter(|token| !token.is_empty()) {
            Some(token) => FormController::resume(token.clone()),
            None => FormController::new(),
        };

        for field in Field::ALL.iter().copied() {
            if let Some(value) = fields.get(field.name()) {
                form.update(field, value);
            }
        }

        let logger = logger.new(o!("request" => "submit"));

        let outcome = form
            .submit(&logger, &*sync, &store, &tokens, OffsetDateTime::now_utc())
            .await
            .map_err(|e| Rejection::new(Context::submit(), e))?;

        match outcome {
            SubmitOutcome::Saved { submission, next } => {
                debug!(logger, "Saved submission"; "created_at" => &submission.created_at);

                Box::new(see_other(Uri::from_static(next))) as Box<dyn Reply>
            }
            SubmitOutcome::Ignored(Ignored::Submitting) => {
                debug!(logger, "Form already submitted");

                Box::new(see_other(Uri::from_static(SUCCESS_ROUTE))) as Box<dyn Reply>
            }
            SubmitOutcome::Ignored(Ignored::Invalid) => {
                debug!(logger, "Form rejected"; "errors" => form.errors().len());

                Box::new(with_status(
                    html(pages::form(&form, true)),
                    StatusCode::UNPROCESSABLE_ENTITY,
                )) as Box<dyn Reply>
            }
        }
    }
}

pub async fn success(_environment: Environment) -> RouteResult {
    timed! {
        html(pages::success())
    }
}

pub async fn listing(environment: Environment) -> RouteResult {
    timed! {
        let submissions = environment
            .store
            .blocking(|store| store.read_all())
            .await
            .map_err(|e| Rejection::new(Context::listing(), e))?;
        debug!(environment.logger, "Listing submissions"; "count" => submissions.len());

        html(pages::listing(&submissions, environment.config.display_offset))
    }
}

pub async fn export(environment: Environment) -> RouteResult {
    timed! {
        let submissions = environment
            .store
            .blocking(|store| store.read_all())
            .await
            .map_err(|e| Rejection::new(Context::export(), e))?;
        let body = store::export_json(&submissions)
            .map_err(|e| Rejection::new(Context::export(), e))?;

        with_header(
            with_header(body, "content-type", mime::APPLICATION_JSON.as_ref()),
            "content-disposition",
            format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
        )
    }
}

pub async fn clear(environment: Environment) -> RouteResult {
    timed! {
        environment
            .store
            .blocking(|store| store.clear())
            .await
            .and_then(|cleared| cleared)
            .map_err(|e| Rejection::new(Context::clear(), e))?;

        see_other(Uri::from_static("/data"))
    }
}

/// Acknowledges any JSON body without storing it.
pub async fn echo(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let body: serde_json::Value = serde_json::from_slice(&body)
            .map_err(BackendError::MalformedBody)
            .map_err(|e| Rejection::new(Context::echo(), e))?;

        let received_at = timestamp::now().map_err(|e| Rejection::new(Context::echo(), e))?;

        debug!(environment.logger, "Echoing request body");

        json(&SuccessResponse::Echo {
            ok: true,
            received_at,
            body,
        })
    }
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
