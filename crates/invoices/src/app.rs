use axum::{
    http::{header, Method, StatusCode},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        health::{livez, readyz},
        invoices::{create_invoice, delete_invoice, get_invoice, list_invoices, update_invoice},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]);

    let invoice_routes = Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/{customer_id}/{invoice_id}",
            get(get_invoice)
                .patch(update_invoice)
                .put(update_invoice)
                .delete(delete_invoice),
        )
        .layer(cors);

    let timeout = state.request_timeout;

    Router::new()
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
        .merge(invoice_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::{storage::FailingRepository, store::InvoiceStore};

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn send_json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn invoice_body(email: &str, date: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "email": email,
            "name": "Jane",
            "amount": 100,
            "date": date,
            "status": status
        })
    }

    #[tokio::test]
    async fn test_livez() {
        let app = create_app(AppState::default());

        let response = app.oneshot(get_request("/livez")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readyz() {
        let app = create_app(AppState::default());

        let response = app.oneshot(get_request("/readyz")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["ready"], true);
    }

    #[tokio::test]
    async fn test_readyz_unavailable_hides_store_detail() {
        let state = AppState {
            store: InvoiceStore::new(Arc::new(FailingRepository)),
            request_timeout: Duration::from_secs(10),
        };
        let app = create_app(state);

        let response = app.oneshot(get_request("/readyz")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await, serde_json::json!({"ready": false}));
    }

    #[tokio::test]
    async fn test_create_invalid_status_and_amount() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(post_json(
                "/invoices",
                invoice_body("a@x.com", "2024-01-01", "paid#date#x"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Invalid status 'paid#date#x': must not contain '#'"
        );

        let mut body = invoice_body("a@x.com", "2024-01-01", "open");
        body["amount"] = serde_json::json!(1e200);
        let response = app.oneshot(post_json("/invoices", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_invoices_empty() {
        let app = create_app(AppState::default());

        let response = app.oneshot(get_request("/invoices")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json,
            serde_json::json!({"data": [], "count": 0, "pageSize": 10})
        );
    }

    #[tokio::test]
    async fn test_create_and_get_invoice() {
        let app = create_app(AppState::default());

        // Create an invoice
        let response = app
            .clone()
            .oneshot(post_json(
                "/invoices",
                invoice_body("a@x.com", "2024-01-01", "Open"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let invoice = body_json(response).await;
        assert_eq!(invoice["customerId"], "478abec7430569163161dfea");
        assert_eq!(invoice["status"], "open");
        assert_eq!(invoice["StatusDate"], "status#open#date#2024-01-01");
        let invoice_id = invoice["invoiceId"].as_str().unwrap();
        assert_eq!(
            location,
            format!("/invoices/478abec7430569163161dfea/{invoice_id}")
        );

        // Get the invoice
        let response = app.oneshot(get_request(&location)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, invoice);
    }

    #[tokio::test]
    async fn test_create_missing_fields() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(post_json(
                "/invoices",
                serde_json::json!({"email": "a@x.com", "name": ""}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Missing required fields: name, amount, date, status"
        );
    }

    #[tokio::test]
    async fn test_create_invalid_json() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/invoices")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["message"].is_string());
    }

    #[tokio::test]
    async fn test_get_nonexistent_invoice() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(get_request("/invoices/abc/def"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["message"],
            "Invoice not found: abc/def"
        );
    }

    #[tokio::test]
    async fn test_update_invoice() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(post_json(
                "/invoices",
                invoice_body("a@x.com", "2024-01-01", "open"),
            ))
            .await
            .unwrap();
        let invoice = body_json(response).await;
        let uri = format!(
            "/invoices/{}/{}",
            invoice["customerId"].as_str().unwrap(),
            invoice["invoiceId"].as_str().unwrap()
        );

        // PATCH status
        let response = app
            .clone()
            .oneshot(send_json(
                "PATCH",
                &uri,
                serde_json::json!({"status": "Overdue"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["status"], "overdue");
        assert_eq!(updated["PK_STATUS"], "overdue");
        assert_eq!(updated["StatusDate"], "status#overdue#date#2024-01-01");
        assert_eq!(updated["amount"], 100.0);

        // PUT amount
        let response = app
            .clone()
            .oneshot(send_json("PUT", &uri, serde_json::json!({"amount": "250.5"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["amount"], 250.5);

        // Nothing updatable
        let response = app
            .oneshot(send_json("PATCH", &uri, serde_json::json!({"name": "B"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "No valid fields provided for update (status, amount)"
        );
    }

    #[tokio::test]
    async fn test_update_nonexistent_invoice() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(send_json(
                "PATCH",
                "/invoices/abc/def",
                serde_json::json!({"status": "paid"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_invoice() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(post_json(
                "/invoices",
                invoice_body("a@x.com", "2024-01-01", "open"),
            ))
            .await
            .unwrap();
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri(&location)
                .body(Body::empty())
                .unwrap()
        };

        // Delete the invoice, twice
        let response = app.clone().oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = app.clone().oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Verify the invoice is gone
        let response = app.oneshot(get_request(&location)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_invoices_paginates() {
        let app = create_app(AppState::default());
        for (email, date) in [
            ("a@x.com", "2024-01-01"),
            ("b@x.com", "2024-01-02"),
            ("c@x.com", "2024-01-03"),
        ] {
            let response = app
                .clone()
                .oneshot(post_json("/invoices", invoice_body(email, date, "PAID")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .clone()
            .oneshot(get_request("/invoices?status=Paid&pageSize=2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let first = body_json(response).await;
        assert_eq!(first["count"], 2);
        assert_eq!(first["pageSize"], 2);
        assert_eq!(first["data"][0]["date"], "2024-01-03");

        let cursor = first["cursor"].as_str().unwrap();
        let uri = format!(
            "/invoices?status=paid&pageSize=2&cursor={}",
            urlencoding::encode(cursor)
        );
        let response = app.oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let second = body_json(response).await;
        assert_eq!(second["count"], 1);
        assert_eq!(second["data"][0]["date"], "2024-01-01");
        assert!(second.get("cursor").is_none());
    }

    #[tokio::test]
    async fn test_list_invoices_malformed_cursor() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(get_request("/invoices?cursor=nope"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
