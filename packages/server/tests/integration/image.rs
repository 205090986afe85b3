use crate::common::{TestApp, routes};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake image body";

fn blob_files(app: &TestApp) -> usize {
    fn walk(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .flatten()
                    .map(|entry| {
                        let path = entry.path();
                        if path.is_dir() { walk(&path) } else { 1 }
                    })
                    .sum::<usize>()
            })
            .unwrap_or(0)
    }
    walk(app.blob_dir.path())
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn uploaded_image_is_served_back() {
        let app = TestApp::spawn().await;

        let res = app.upload_image("soup.png", PNG.to_vec()).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["filename"], "soup.png");
        assert_eq!(res.body["content_type"], "image/png");
        assert_eq!(res.body["size"].as_i64().unwrap(), PNG.len() as i64);
        let url = res.body["url"].as_str().unwrap().to_string();
        assert_eq!(url, routes::image(&res.id()));

        let download = app.get_raw(&url).await;
        assert_eq!(download.status, 200);
        assert_eq!(download.bytes, PNG);
        assert_eq!(download.headers["content-type"], "image/png");
        assert!(download.headers.contains_key("etag"));
    }

    #[tokio::test]
    async fn upload_without_image_field_is_rejected() {
        let app = TestApp::spawn().await;
        let form = reqwest::multipart::Form::new().text("note", "no file here");

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::IMAGES))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn listed_images_include_uploads() {
        let app = TestApp::spawn().await;
        app.upload_image("a.png", b"first".to_vec()).await;
        app.upload_image("b.png", b"second".to_vec()).await;

        let res = app.get(routes::IMAGES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::image("not-a-uuid")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn deleting_removes_row_and_blob() {
        let app = TestApp::spawn().await;
        let id = app.upload_image("soup.png", PNG.to_vec()).await.id();
        assert_eq!(blob_files(&app), 1);

        let res = app.delete(&routes::image(&id)).await;

        assert_eq!(res.status, 204);
        assert_eq!(app.get(&routes::image(&id)).await.status, 404);
        assert_eq!(blob_files(&app), 0);
    }

    #[tokio::test]
    async fn shared_blob_survives_until_last_image_is_deleted() {
        let app = TestApp::spawn().await;
        let first = app.upload_image("one.png", PNG.to_vec()).await;
        let second = app.upload_image("two.png", PNG.to_vec()).await;
        assert_eq!(first.body["content_hash"], second.body["content_hash"]);
        assert_ne!(first.id(), second.id());
        assert_eq!(blob_files(&app), 1);

        app.delete(&routes::image(&first.id())).await;

        let still_there = app.get_raw(&routes::image(&second.id())).await;
        assert_eq!(still_there.status, 200);
        assert_eq!(still_there.bytes, PNG);

        app.delete(&routes::image(&second.id())).await;
        assert_eq!(blob_files(&app), 0);
    }

    #[tokio::test]
    async fn deleting_a_missing_image_returns_404() {
        let app = TestApp::spawn().await;

        let res = app
            .delete(&routes::image("01936f0e-1234-7abc-8000-000000000001"))
            .await;

        assert_eq!(res.status, 404);
    }
}

mod shared_blobs {
    use std::io::Write;

    use super::*;

    fn source_file(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create source file");
        file.write_all(bytes).expect("write source file");
        file
    }

    #[tokio::test]
    async fn delete_racing_an_identical_upload_keeps_the_blob() {
        let app = TestApp::spawn().await;
        let source = source_file(PNG);
        let images = &app.services.images;

        for _ in 0..10 {
            let existing = images.upload("old.png", source.path()).await.unwrap();

            let (deleted, uploaded) = tokio::join!(
                images.delete(existing.id),
                images.upload("new.png", source.path()),
            );
            deleted.unwrap();
            let uploaded = uploaded.unwrap();

            let download = app.get_raw(&routes::image(&uploaded.id.to_string())).await;
            assert_eq!(download.status, 200);
            assert_eq!(download.bytes, PNG);
        }

        for image in images.list().await.unwrap() {
            assert!(images.open(image.id).await.is_ok());
        }
    }

    #[tokio::test]
    async fn concurrent_deletes_of_the_last_two_rows_remove_the_blob() {
        let app = TestApp::spawn().await;
        let source = source_file(PNG);
        let images = &app.services.images;

        let first = images.upload("one.png", source.path()).await.unwrap();
        let second = images.upload("two.png", source.path()).await.unwrap();
        assert_eq!(blob_files(&app), 1);

        let (a, b) = tokio::join!(images.delete(first.id), images.delete(second.id));
        a.unwrap();
        b.unwrap();

        assert!(images.list().await.unwrap().is_empty());
        assert_eq!(blob_files(&app), 0);
    }

    #[tokio::test]
    async fn deleting_the_same_image_twice_concurrently_reports_one_not_found() {
        let app = TestApp::spawn().await;
        let source = source_file(PNG);
        let images = &app.services.images;
        let image = images.upload("one.png", source.path()).await.unwrap();

        let (a, b) = tokio::join!(images.delete(image.id), images.delete(image.id));

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(blob_files(&app), 0);
    }
}
