//! Versioned routes and bucket selection.

#[cfg(test)]
mod tests {
    use crate::{client, spawn_gateway};

    #[tokio::test]
    async fn test_should_serve_from_selected_prefix() {
        let gw = spawn_gateway().await;
        let resp = client()
            .get(gw.url("/api/hips/v2/ds1/a.fits"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.expect("body"), "ds1 fits");

        let resp = client()
            .get(gw.url("/api/hips/v2/ds1/"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.expect("body"), "<html>ds1</html>");
    }

    #[tokio::test]
    async fn test_should_isolate_selector_prefixes() {
        let gw = spawn_gateway().await;
        let resp = client()
            .get(gw.url("/api/hips/v2/ds1/only-ds2.txt"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 404);

        let resp = client()
            .get(gw.url("/api/hips/v2/ds2/only-ds2.txt"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.expect("body"), "ds2");
    }

    #[tokio::test]
    async fn test_should_require_selector() {
        let gw = spawn_gateway().await;
        for path in ["/api/hips/v2", "/api/hips/v2/"] {
            let resp = client().get(gw.url(path)).send().await.expect("request");
            assert_eq!(resp.status(), 400, "{path}");
            let body: serde_json::Value = resp.json().await.expect("json");
            let detail = body["detail"].as_str().expect("detail");
            assert!(detail.contains("/api/hips/v2"), "{detail}");
        }
    }

    #[tokio::test]
    async fn test_should_list_keys_for_unknown_selector() {
        let gw = spawn_gateway().await;
        for path in ["/api/hips/v2/nope/a.fits", "/api/hips/v2/nope"] {
            let resp = client().get(gw.url(path)).send().await.expect("request");
            assert_eq!(resp.status(), 404, "{path}");
            let body: serde_json::Value = resp.json().await.expect("json");
            assert_eq!(
                body["detail"],
                "Bucket key nope not found. Available bucket keys: default, ds1, ds2"
            );
        }
    }
}
