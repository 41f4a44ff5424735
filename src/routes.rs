use std::sync::Arc;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use futures::{pin_mut, Stream, TryStreamExt};
use log::{debug, error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BackendError;
use rejection::{Context, Rejection};

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The largest request body accepted by the form and echo routes.
const MAX_CONTENT_LENGTH: usize = 1024 * 1024;

/// Every page and API route, with rejections turned into JSON responses.
pub fn make_routes(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + Send + Sync + 'static {
    let logger = environment.logger.clone();

    make_form_route(environment.clone())
        .or(make_submit_route(environment.clone()))
        .or(make_success_route(environment.clone()))
        .or(make_listing_route(environment.clone()))
        .or(make_export_route(environment.clone()))
        .or(make_clear_route(environment.clone()))
        .or(make_echo_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        let status = status_code_for(e);

        if status.is_server_error() {
            error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        } else {
            debug!(logger, "Rejected request"; "context" => ?r.context, "status" => %status, "message" => %r.error);
        }

        return Ok(with_status(json(&r.flatten()), status));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        MalformedBody(..) | ReadBody(..) | BodyTooLarge { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The request body, read up to `MAX_CONTENT_LENGTH` bytes. Chunked
/// bodies are accepted.
fn limited_body(
    context: Context,
) -> impl Filter<Extract = (Bytes,), Error = reject::Rejection> + Clone {
    warp::body::stream().and_then(move |stream| async move {
        read_limited(stream, MAX_CONTENT_LENGTH)
            .await
            .map_err(|e| reject::custom(Rejection::new(context, e)))
    })
}

async fn read_limited<S, B>(stream: S, limit: usize) -> Result<Bytes, BackendError>
where
    S: Stream<Item = Result<B, warp::Error>>,
    B: Buf,
{
    pin_mut!(stream);

    let mut body = BytesMut::new();

    while let Some(chunk) = stream.try_next().await.map_err(BackendError::ReadBody)? {
        if body.len() + chunk.remaining() > limit {
            return Err(BackendError::BodyTooLarge { limit });
        }

        body.put(chunk);
    }

    Ok(body.freeze())
}

mod internal {
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{get as g, path as p, post};

    use super::rejection::Context;
    use super::{handlers, limited_body};
    use crate::environment::Environment;
    use crate::store::EXPORT_FILE_NAME;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
        ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
        ($route_variable:ident; $first:expr, $($rest:expr),+) => (
            let $route_variable = $route_variable.and($first);
            route_filter!($route_variable; $($rest),+);
        )
    }

    macro_rules! route {
        ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
            pub fn $name(environment: Environment) -> Route {
                let $route_variable = warp::any().map(move || environment.clone());

                route_filter!($route_variable; $($filters),+);

                $route_variable.and_then(handlers::$handler)
                    .boxed()
            }
        );
    }

    route!(make_form_route => form_page, rt; end(), g());
    route!(make_submit_route => submit_form, rt; end(), post(), limited_body(Context::submit()));
    route!(make_success_route => success, rt; p("success"), end(), g());
    route!(make_listing_route => listing, rt; p("data"), end(), g());
    route!(make_export_route => export, rt; p("data"), p(EXPORT_FILE_NAME), end(), g());
    route!(make_clear_route => clear, rt; p("data"), p("clear"), end(), post());
    route!(make_echo_route => echo, rt; p("api"), p("submit"), end(), post(), limited_body(Context::echo()));
}
