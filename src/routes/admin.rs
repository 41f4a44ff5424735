use warp::reject;
use warp::reply::{json, Reply};
use warp::Filter;

use super::response::SuccessResponse;

pub fn make_healthz_route(
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + Send + Sync + 'static {
    warp::path("healthz").and(warp::path::end()).and(warp::get()).map(|| {
        json(&SuccessResponse::Healthz {
            revision: info::REVISION,
            timestamp: info::BUILD_TIMESTAMP,
            version: info::VERSION,
        })
    })
}

#[cfg(test)]
mod tests {
    use warp::http::StatusCode;

    #[tokio::test]
    async fn healthz_reports_version() {
        let response = warp::test::request()
            .path("/healthz")
            .method("GET")
            .reply(&super::make_healthz_route())
            .await;

        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value =
            serde_json::from_slice(response.body()).expect("parse healthz response");
        assert_eq!(body["version"], info::VERSION);
    }
}
