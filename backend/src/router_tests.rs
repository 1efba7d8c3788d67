#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use crate::bus::LocalBus;
    use crate::context::ModelContext;
    use crate::events::{EventPayload, EventType};
    use crate::jobs::InMemoryJobClient;
    use crate::router::{EventRouter, RouteOutcome};

    fn router() -> (EventRouter, Arc<LocalBus>, Arc<InMemoryJobClient>) {
        let bus = Arc::new(LocalBus::default());
        let jobs = Arc::new(InMemoryJobClient::new(201));
        let router = EventRouter::new(
            Arc::new(ModelContext::fallback_only()),
            80.0,
            bus.clone(),
            jobs.clone(),
        );
        (router, bus, jobs)
    }

    #[tokio::test]
    async fn test_non_json_is_dropped() {
        let (router, bus, _) = router();
        let outcome = router.handle_message("not json at all").await;
        assert!(matches!(outcome, RouteOutcome::Malformed(_)));
        assert!(bus.history().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_terminal_types_are_unhandled() {
        let (router, bus, _) = router();
        assert_eq!(
            router
                .handle_message(r#"{"event_type":"heartbeat","hospital_id":"H-1"}"#)
                .await,
            RouteOutcome::Unhandled("heartbeat".into())
        );
        let alert = r#"{"event_type":"alert_sent","hospital_id":"H-1","message":"m","severity":"high","recipients":[]}"#;
        assert_eq!(
            router.handle_message(alert).await,
            RouteOutcome::Unhandled("alert_sent".into())
        );
        assert!(bus.history().is_empty());
    }

    #[tokio::test]
    async fn test_prediction_ready_runs_optimizer_then_alerter() {
        let (router, _, _) = router();
        let raw = r#"{
            "event_type": "prediction_ready",
            "hospital_id": "H-1",
            "predictions": [
                {"ds": "2024-01-01", "yhat": 90, "yhat_lower": 85, "yhat_upper": 95},
                {"ds": "2024-01-02", "yhat": 60, "yhat_lower": 55, "yhat_upper": 65}
            ]
        }"#;
        let outcome = router.handle_message(raw).await;
        let published = outcome.published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].event_type(), EventType::OptimizedPlan);
        assert_eq!(published[1].event_type(), EventType::AlertSent);

        let EventPayload::AlertSent(alert) = &published[1].payload else {
            panic!("expected alert_sent");
        };
        assert_eq!(alert.message, "Predicted occupancy 90.0 >= 80.0 on 2024-01-01");
    }

    #[tokio::test]
    async fn test_optimized_plan_runs_logistics_then_alerter() {
        let (router, _, jobs) = router();
        let raw = r#"{
            "event_type": "optimized_plan",
            "hospital_id": "H-2",
            "plan": [
                {"action": "request_tanker", "quantity": 3, "reason": "first"},
                {"action": "request_tanker", "quantity": 9, "reason": "second"}
            ]
        }"#;
        let outcome = router.handle_message(raw).await;
        let published = outcome.published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].event_type(), EventType::JobCreated);
        assert_eq!(published[1].event_type(), EventType::AlertSent);

        let requests = jobs.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].quantity, 3);
        assert_eq!(requests[0].hospital_id, "H-2");
    }

    #[tokio::test]
    async fn test_no_action_plan_publishes_nothing() {
        let (router, bus, jobs) = router();
        let raw = r#"{"event_type":"optimized_plan","hospital_id":"H-2","plan":[{"action":"no_action","reason":"ok"}]}"#;
        let outcome = router.handle_message(raw).await;
        assert_eq!(
            outcome,
            RouteOutcome::Dispatched {
                event_type: EventType::OptimizedPlan,
                published: vec![]
            }
        );
        assert!(jobs.requests().is_empty());
        assert!(bus.history().is_empty());
    }

    #[tokio::test]
    async fn test_data_uploaded_publishes_forecast() {
        let (router, _, _) = router();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ds,y").unwrap();
        for day in 1..=8 {
            writeln!(file, "2024-01-{:02},{}", day, day * 10).unwrap();
        }
        let raw = serde_json::json!({
            "event_type": "data_uploaded",
            "hospital_id": "H-3",
            "file_path": file.path().to_str().unwrap(),
        })
        .to_string();

        let outcome = router.handle_message(&raw).await;
        let published = outcome.published();
        assert_eq!(published.len(), 1);
        let EventPayload::PredictionReady(ready) = &published[0].payload else {
            panic!("expected prediction_ready");
        };
        assert_eq!(ready.model_meta.model, "moving_average");
        assert_eq!(ready.model_meta.trained_rows, 8);
        // Mean of 20..=80.
        assert!(ready.predictions.iter().all(|p| p.yhat == 50.0));
    }

    #[tokio::test]
    async fn test_run_survives_bad_messages() {
        let (router, bus, _) = router();
        let messages = vec![
            "{{{".to_string(),
            r#"{"event_type":"optimized_plan","plan":[]}"#.to_string(),
            r#"{"event_type":"optimized_plan","hospital_id":"H-4","plan":[{"action":"request_tanker","quantity":1,"reason":"r"}]}"#.to_string(),
        ];
        let handled = router.run(futures::stream::iter(messages)).await;
        assert_eq!(handled, 3);
        // job_created and alert_sent from the last message only.
        assert_eq!(bus.history().len(), 2);
    }

    #[tokio::test]
    async fn test_unrecognized_plan_action_still_alerts() {
        let (router, _, jobs) = router();
        let raw = r#"{"event_type":"optimized_plan","hospital_id":"H-5","plan":[{"action":"call_vendor","vendor":"acme"}]}"#;
        let outcome = router.handle_message(raw).await;
        let published = outcome.published();
        assert_eq!(published.len(), 1);
        let EventPayload::AlertSent(alert) = &published[0].payload else {
            panic!("expected alert_sent");
        };
        assert_eq!(alert.message, r#"Optimization recommends: {"action":"unrecognized"}"#);
        assert!(jobs.requests().is_empty());
    }
}
