//! Redirects for duplicate separators and route roots.

#[cfg(test)]
mod tests {
    use crate::{client, header, spawn_gateway};

    #[tokio::test]
    async fn test_should_redirect_duplicate_separators_permanently() {
        let gw = spawn_gateway().await;
        for (raw, location) in [
            ("/api/hips//a.fits", "/api/hips/a.fits"),
            ("/api/hips/Norder3//Allsky.png", "/api/hips/Norder3/Allsky.png"),
            ("/api/hips/v2/ds1//a.fits", "/api/hips/v2/ds1/a.fits"),
        ] {
            let resp = client().get(gw.url(raw)).send().await.expect("request");
            assert_eq!(resp.status(), 301, "{raw}");
            assert_eq!(header(&resp, "location"), Some(location), "{raw}");

            let resp = client().head(gw.url(raw)).send().await.expect("request");
            assert_eq!(resp.status(), 301, "{raw}");
        }
    }

    #[tokio::test]
    async fn test_should_redirect_prefix_root_temporarily() {
        let gw = spawn_gateway().await;
        let resp = client()
            .get(gw.url("/api/hips"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 307);
        assert_eq!(header(&resp, "location"), Some("/api/hips/"));
    }

    #[tokio::test]
    async fn test_should_redirect_selector_root_temporarily() {
        let gw = spawn_gateway().await;
        let resp = client()
            .get(gw.url("/api/hips/v2/ds1"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 307);
        assert_eq!(header(&resp, "location"), Some("/api/hips/v2/ds1/"));

        let resp = client()
            .head(gw.url("/api/hips/v2/ds2"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 307);
    }

    #[tokio::test]
    async fn test_should_drop_query_from_redirect_location() {
        let gw = spawn_gateway().await;
        let resp = client()
            .get(gw.url("/api/hips?x=1"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 307);
        assert_eq!(header(&resp, "location"), Some("/api/hips/"));
    }
}
