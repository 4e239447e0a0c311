#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use chrono::NaiveDate;
    use fuelcast_api::{
        discovery_routes, prediction_routes, training_routes, with_observability, DiscoveryState,
        GatewayState, TrainingState,
    };
    use fuelcast_core::{
        Category, DataSource, FuelType, Observation, OrchestratorResult, TrainingWatermark,
    };
    use fuelcast_dispatcher::{
        DiscoveryClient, DiscoveryService, DispatchGateway, SlidingWindowLimiter, TrainingTrigger,
    };
    use fuelcast_infrastructure::{Backends, InMemoryServiceRegistry};
    use fuelcast_worker::{PredictionHandler, TrainingHandler, TrendModel, TrendTrainer, WorkerPool};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const WAIT: Duration = Duration::from_millis(50);

    struct StaticSeries;

    #[async_trait]
    impl DataSource for StaticSeries {
        async fn full(&self, _target: &str) -> OrchestratorResult<Vec<Observation>> {
            Ok(vec![
                Observation {
                    ds: "20240101".to_string(),
                    y: 0.81,
                },
                Observation {
                    ds: "20240115".to_string(),
                    y: 0.84,
                },
            ])
        }

        async fn latest(&self, target: &str) -> OrchestratorResult<Vec<Observation>> {
            self.full(target).await
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn discovery_app() -> Router {
        discovery_routes(DiscoveryState {
            discovery: DiscoveryService::new(Arc::new(InMemoryServiceRegistry::new())),
        })
    }

    fn gateway_app(backends: &Backends, limiter: Option<SlidingWindowLimiter>) -> Router {
        prediction_routes(GatewayState {
            gateway: DispatchGateway::new(backends.fabric()),
            limiter: limiter.map(Arc::new),
        })
    }

    fn training_setup(backends: &Backends, api_key: Option<&str>) -> (Router, WorkerPool) {
        let trigger = TrainingTrigger::new(
            DispatchGateway::new(backends.fabric()),
            Arc::new(StaticSeries),
            backends.watermarks.clone(),
            vec!["euro95_1".into(), "diesel_2".into(), "lpg_3".into()],
        );
        let pool = WorkerPool::new(
            Category::Training,
            backends.fabric(),
            Arc::new(TrainingHandler::new(Arc::new(TrendTrainer))),
            1,
            WAIT,
        )
        .with_hook(Arc::new(trigger.watermark_hook()));

        let app = training_routes(TrainingState::new(trigger, api_key.map(str::to_string)));
        (app, pool)
    }

    #[tokio::test]
    async fn test_register_then_discover() {
        let app = discovery_app();

        let (status, body) = send(
            &app,
            post_json(
                "/register",
                json!({"name": "dataservice", "host": "10.0.0.5", "port": 3000}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Service dataservice registered successfully");

        let (status, body) = send(&app, get("/discover/dataservice")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"name": "dataservice", "host": "10.0.0.5", "port": 3000})
        );

        let (status, body) = send(&app, get("/services")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_discover_unknown_service() {
        let (status, body) = send(&discovery_app(), get("/discover/nothing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "SERVICE_NOT_FOUND");
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_register_rejects_incomplete_body() {
        let app = discovery_app();

        let (status, body) = send(
            &app,
            post_json("/register", json!({"name": "dataservice", "host": "10.0.0.5"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "INVALID_REGISTRATION");
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("Invalid data provided"));

        let malformed = Request::builder()
            .method(Method::POST)
            .uri("/register")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_prediction_submit_and_poll() {
        let backends = Backends::in_memory();
        let app = gateway_app(&backends, None);
        let lpg = Category::Prediction(FuelType::Lpg);
        let pool = WorkerPool::new(
            lpg,
            backends.fabric(),
            Arc::new(PredictionHandler::new(
                FuelType::Lpg,
                Arc::new(TrendModel::new(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    1.0,
                    0.0,
                )),
                0.5,
                1.5,
            )),
            1,
            WAIT,
        );

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/predictions",
                json!({"fuelType": "lpg", "dates": ["20240101"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["taskType"], "lpg");
        assert_eq!(body["status"], "Pending");
        let task_id = body["taskId"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/predictions/lpg/{task_id}");
        let (status, body) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["taskId"], task_id.as_str());

        pool.process_next(WAIT).await.unwrap().unwrap();

        let (status, body) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Success");
        assert_eq!(body["taskId"], task_id.as_str());
        assert_eq!(
            body["result"],
            json!({"results": [{"ds": "20240101", "yhat": 1.0}]})
        );

        let (status, _) = send(&app, get(&format!("/api/v1/predictions/diesel/{task_id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_prediction_rejects_bad_input() {
        let backends = Backends::in_memory();
        let app = gateway_app(&backends, None);

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/predictions",
                json!({"fuelType": "kerosene", "dates": ["20240101"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "INVALID_CATEGORY");

        let (status, body) = send(
            &app,
            post_json("/api/v1/predictions", json!({"fuelType": "lpg", "dates": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "INVALID_PAYLOAD");

        let (status, body) = send(
            &app,
            post_json("/api/v1/predictions", json!({"dates": ["20240101"]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "INVALID_CATEGORY");

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/predictions",
                json!({"fuelType": 95, "dates": ["20240101"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "INVALID_CATEGORY");

        let (status, body) = send(
            &app,
            post_json("/api/v1/predictions", json!({"fuelType": "lpg"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "INVALID_PAYLOAD");

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/predictions",
                json!({"fuelType": "lpg", "dates": "20240101"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "INVALID_PAYLOAD");

        let malformed = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/predictions")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "BAD_REQUEST");

        let lpg = Category::Prediction(FuelType::Lpg);
        assert_eq!(backends.fabric().queue_size(lpg).await.unwrap_or(0), 0);
    }

    #[tokio::test]
    async fn test_prediction_poll_unknown_task_and_category() {
        let app = gateway_app(&Backends::in_memory(), None);

        let (status, body) = send(
            &app,
            get("/api/v1/predictions/lpg/7b0f3a52-0d3e-4a59-9d43-3a3f4f6c2f11"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "UNKNOWN_TASK");

        let (status, body) = send(
            &app,
            get("/api/v1/predictions/kerosene/7b0f3a52-0d3e-4a59-9d43-3a3f4f6c2f11"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "UNKNOWN_CATEGORY");
    }

    #[tokio::test]
    async fn test_rate_limit_after_ten_requests() {
        let backends = Backends::in_memory();
        let limiter = SlidingWindowLimiter::new(10, Duration::from_secs(60));
        let app = gateway_app(&backends, Some(limiter));

        for _ in 0..10 {
            let (status, _) = send(
                &app,
                post_json(
                    "/api/v1/predictions",
                    json!({"fuelType": "diesel", "dates": ["20240101"]}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/predictions",
                json!({"fuelType": "diesel", "dates": ["20240101"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["kind"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_training_flow_and_watermark() {
        let backends = Backends::in_memory();
        let (app, pool) = training_setup(&backends, None);

        let (status, body) = send(
            &app,
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/triggers/lpg_3")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let task_id = body["taskId"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get(&format!("/api/v1/results/{task_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Pending");

        pool.process_next(WAIT).await.unwrap().unwrap();

        let (status, body) = send(&app, get(&format!("/api/v1/results/{task_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Success");
        assert_eq!(body["result"]["trainedThrough"], "2024-01-15");

        let (status, body) = send(&app, get("/api/v1/trainingdate?target=lpg_3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"target": "lpg_3", "trainedDate": "2024-01-15"}));
    }

    #[tokio::test]
    async fn test_training_rejects_unknown_target() {
        let backends = Backends::in_memory();
        let (app, _pool) = training_setup(&backends, None);

        let (status, body) = send(
            &app,
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/triggers/kerosene_9")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "INVALID_CATEGORY");

        let (status, body) = send(&app, get("/api/v1/trainingdate")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "WATERMARK_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_training_date_requires_api_key() {
        let backends = Backends::in_memory();
        backends
            .watermarks
            .record(TrainingWatermark::new(
                "diesel_2",
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            ))
            .await
            .unwrap();
        let (app, _pool) = training_setup(&backends, Some("s3cret"));

        let (status, body) = send(&app, get("/api/v1/trainingdate")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["kind"], "UNAUTHORIZED");

        let request = Request::builder()
            .uri("/api/v1/trainingdate")
            .header("x-api-key", "s3cret")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["target"], "diesel_2");
        assert_eq!(body["trainedDate"], "2024-02-01");

        let (status, _) = send(
            &app,
            get("/api/v1/results/7b0f3a52-0d3e-4a59-9d43-3a3f4f6c2f11"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = with_observability(discovery_app(), "servicediscovery", None);

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "servicediscovery");
    }

    #[tokio::test]
    async fn test_discovery_client_against_live_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = with_observability(discovery_app(), "servicediscovery", None);
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client =
            DiscoveryClient::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let record = fuelcast_core::ServiceRecord::new("dataservice", "10.0.0.5", 3000).unwrap();
        client.register(&record).await.unwrap();

        let found = client.lookup("dataservice").await.unwrap();
        assert_eq!(found, record);

        let missing = client.lookup("predservice").await.unwrap_err();
        assert_eq!(missing.kind(), "SERVICE_NOT_FOUND");

        server.abort();
    }
}
