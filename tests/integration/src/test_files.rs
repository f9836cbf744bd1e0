//! File retrieval over HTTP: content, headers and streaming.

#[cfg(test)]
mod tests {
    use crate::{BUCKET, MAX_BUFFERED, client, header, spawn_gateway};

    #[tokio::test]
    async fn test_should_serve_file_with_caching_headers() {
        let gw = spawn_gateway().await;
        let resp = client()
            .get(gw.url("/api/hips/a.fits"))
            .send()
            .await
            .expect("request");

        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "content-type"), Some("application/fits"));
        assert_eq!(header(&resp, "cache-control"), Some("private, max-age=3600"));
        assert_eq!(header(&resp, "content-length"), Some("9"));
        assert_eq!(
            header(&resp, "last-modified"),
            Some("Sat, 01 Jun 2024 12:00:00 GMT")
        );
        let etag = header(&resp, "etag").expect("etag").to_owned();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert!(header(&resp, "x-request-id").is_some());

        assert_eq!(resp.text().await.expect("body"), "root fits");
    }

    #[tokio::test]
    async fn test_should_serve_index_for_prefix_root() {
        let gw = spawn_gateway().await;
        let resp = client()
            .get(gw.url("/api/hips/"))
            .send()
            .await
            .expect("request");

        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(resp.text().await.expect("body"), "<html>root</html>");
    }

    #[tokio::test]
    async fn test_should_infer_media_types() {
        let gw = spawn_gateway().await;
        for (path, expected) in [
            ("/api/hips/properties", "text/plain; charset=utf-8"),
            ("/api/hips/Norder3/Allsky.png", "image/png"),
            ("/api/hips/Moc.xml", "application/x-votable+xml"),
            ("/api/hips/big.bin", "text/plain; charset=utf-8"),
        ] {
            let resp = client().get(gw.url(path)).send().await.expect("request");
            assert_eq!(resp.status(), 200, "{path}");
            assert_eq!(header(&resp, "content-type"), Some(expected), "{path}");
        }
    }

    #[tokio::test]
    async fn test_should_answer_head_without_body() {
        let gw = spawn_gateway().await;
        let get = client()
            .get(gw.url("/api/hips/Norder4/Dir0/Npix1794.png"))
            .send()
            .await
            .expect("request");
        let head = client()
            .head(gw.url("/api/hips/Norder4/Dir0/Npix1794.png"))
            .send()
            .await
            .expect("request");

        assert_eq!(head.status(), 200);
        for name in ["etag", "last-modified", "cache-control", "content-type"] {
            assert_eq!(header(&head, name), header(&get, name), "{name}");
        }
        assert!(head.bytes().await.expect("body").is_empty());
    }

    #[tokio::test]
    async fn test_should_stream_large_files() {
        let gw = spawn_gateway().await;
        let resp = client()
            .get(gw.url("/api/hips/big.bin"))
            .send()
            .await
            .expect("request");

        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "content-length"), Some("10240"));
        let body = resp.bytes().await.expect("body");
        assert!(body.len() as u64 > MAX_BUFFERED);
        assert!(body.iter().all(|b| *b == 7));
    }

    #[tokio::test]
    async fn test_should_return_identical_headers_for_repeated_requests() {
        let gw = spawn_gateway().await;
        let first = client()
            .get(gw.url("/api/hips/properties"))
            .send()
            .await
            .expect("request");
        let second = client()
            .get(gw.url("/api/hips/properties"))
            .send()
            .await
            .expect("request");

        for name in ["etag", "last-modified", "cache-control", "content-type", "content-length"] {
            assert_eq!(header(&first, name), header(&second, name), "{name}");
        }
        assert_ne!(header(&first, "x-request-id"), header(&second, "x-request-id"));
    }

    #[tokio::test]
    async fn test_should_serve_objects_added_after_startup() {
        let gw = spawn_gateway().await;
        gw.store.put_object(BUCKET, "Norder5/Npix1.png", vec![1u8, 2, 3]);

        let resp = client()
            .get(gw.url("/api/hips/Norder5/Npix1.png"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 200);
        assert_eq!(&resp.bytes().await.expect("body")[..], &[1u8, 2, 3][..]);
    }

    #[tokio::test]
    async fn test_should_report_health_and_metadata() {
        let gw = spawn_gateway().await;
        let health: serde_json::Value = client()
            .get(gw.url("/health"))
            .send()
            .await
            .expect("request")
            .json()
            .await
            .expect("json");
        assert_eq!(health["status"], "running");

        let meta: serde_json::Value = client()
            .get(gw.url("/"))
            .send()
            .await
            .expect("request")
            .json()
            .await
            .expect("json");
        assert_eq!(meta["name"], "hipsgate");
        assert!(meta["version"].is_string());
    }
}
