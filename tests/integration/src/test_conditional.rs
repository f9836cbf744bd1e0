//! `If-None-Match` handling over HTTP.

#[cfg(test)]
mod tests {
    use crate::{client, header, spawn_gateway};

    async fn etag_of(base: &crate::TestGateway, path: &str) -> String {
        let resp = client().get(base.url(path)).send().await.expect("request");
        header(&resp, "etag").expect("etag").to_owned()
    }

    #[tokio::test]
    async fn test_should_return_not_modified_for_matching_etag() {
        let gw = spawn_gateway().await;
        let etag = etag_of(&gw, "/api/hips/a.fits").await;

        let resp = client()
            .get(gw.url("/api/hips/a.fits"))
            .header("if-none-match", &etag)
            .send()
            .await
            .expect("request");

        assert_eq!(resp.status(), 304);
        assert_eq!(header(&resp, "etag"), Some(etag.as_str()));
        assert_eq!(header(&resp, "cache-control"), Some("private, max-age=3600"));
        assert!(header(&resp, "last-modified").is_some());
        assert!(resp.bytes().await.expect("body").is_empty());
    }

    #[tokio::test]
    async fn test_should_match_weak_and_listed_etags() {
        let gw = spawn_gateway().await;
        let etag = etag_of(&gw, "/api/hips/a.fits").await;

        for value in [
            format!("W/{etag}"),
            format!("\"other\", {etag}"),
            format!("bogus, {etag}"),
        ] {
            let resp = client()
                .get(gw.url("/api/hips/a.fits"))
                .header("if-none-match", &value)
                .send()
                .await
                .expect("request");
            assert_eq!(resp.status(), 304, "{value}");
        }
    }

    #[tokio::test]
    async fn test_should_serve_content_for_stale_or_invalid_etags() {
        let gw = spawn_gateway().await;
        for value in ["\"stale\"", "no-quotes", "*", ""] {
            let resp = client()
                .get(gw.url("/api/hips/a.fits"))
                .header("if-none-match", value)
                .send()
                .await
                .expect("request");
            assert_eq!(resp.status(), 200, "{value:?}");
            assert_eq!(resp.text().await.expect("body"), "root fits");
        }
    }

    #[tokio::test]
    async fn test_should_ignore_if_none_match_on_head() {
        let gw = spawn_gateway().await;
        let etag = etag_of(&gw, "/api/hips/a.fits").await;

        let resp = client()
            .head(gw.url("/api/hips/a.fits"))
            .header("if-none-match", &etag)
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_should_change_etag_when_content_changes() {
        let gw = spawn_gateway().await;
        let before = etag_of(&gw, "/api/hips/properties").await;
        gw.store.put_object(crate::BUCKET, "properties", "creator_did = ivo://other");

        let resp = client()
            .get(gw.url("/api/hips/properties"))
            .header("if-none-match", &before)
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 200);
        assert_ne!(header(&resp, "etag"), Some(before.as_str()));
    }
}
