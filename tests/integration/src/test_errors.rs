//! Error responses: invalid paths, missing files and unsupported methods.

#[cfg(test)]
mod tests {
    use crate::{BUCKET, client, header, spawn_gateway};

    #[tokio::test]
    async fn test_should_reject_invalid_paths() {
        let gw = spawn_gateway().await;
        for path in [
            "/api/hips/a.b.fits",
            "/api/hips/Norder3.x/Allsky.png",
            "/api/hips/Norder3/",
            "/api/hips/v2/ds1/Norder3/",
        ] {
            let resp = client().get(gw.url(path)).send().await.expect("request");
            assert_eq!(resp.status(), 422, "{path}");
            let body: serde_json::Value = resp.json().await.expect("json");
            assert!(body["detail"].is_string());

            let resp = client().head(gw.url(path)).send().await.expect("request");
            assert_eq!(resp.status(), 422, "{path}");
        }
    }

    #[tokio::test]
    async fn test_should_reject_invalid_path_before_selector_lookup() {
        let gw = spawn_gateway().await;
        let resp = client()
            .get(gw.url("/api/hips/v2/nope/a.b.c"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 422);
    }

    #[tokio::test]
    async fn test_should_return_not_found_for_missing_files() {
        let gw = spawn_gateway().await;
        for path in ["/api/hips/missing.fits", "/api/hips/v2/ds2/"] {
            let resp = client().get(gw.url(path)).send().await.expect("request");
            assert_eq!(resp.status(), 404, "{path}");
            let body: serde_json::Value = resp.json().await.expect("json");
            assert_eq!(body["detail"], "File not found");

            let resp = client().head(gw.url(path)).send().await.expect("request");
            assert_eq!(resp.status(), 404, "{path}");
        }
    }

    #[tokio::test]
    async fn test_should_return_not_found_after_delete() {
        let gw = spawn_gateway().await;
        assert!(gw.store.delete_object(BUCKET, "index.html"));
        let resp = client()
            .get(gw.url("/api/hips/"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_should_return_not_found_outside_prefixes() {
        let gw = spawn_gateway().await;
        let resp = client()
            .get(gw.url("/elsewhere/a.fits"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_should_reject_unsupported_methods() {
        let gw = spawn_gateway().await;
        let c = client();
        for req in [
            c.post(gw.url("/api/hips/a.fits")),
            c.put(gw.url("/api/hips/a.fits")),
            c.delete(gw.url("/api/hips/v2/ds1/a.fits")),
        ] {
            let resp = req.send().await.expect("request");
            assert_eq!(resp.status(), 405);
            assert_eq!(header(&resp, "allow"), Some("GET, HEAD"));
        }
    }
}
