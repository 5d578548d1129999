use std::collections::HashSet;

use super::*;
use crate::backend::memory::MemoryBackend;
use crate::state::test_helpers::{png_bytes, seed_editor};

fn acme() -> CaseInput {
    CaseInput {
        company_name: "Acme".into(),
        description: "Nyt website med booking".into(),
        city: "Aarhus".into(),
        country: "Danmark".into(),
        contact_person: "Mette".into(),
        layout: CaseLayout::Single,
        created_at: None,
    }
}

fn with_image() -> CaseUploads {
    CaseUploads { image: Some(png_bytes(40, 30)), ..CaseUploads::default() }
}

#[tokio::test]
async fn anonymous_create_is_rejected_without_backend_call() {
    let (fake, backend) = MemoryBackend::bundle();
    let err = create(&backend, None, acme(), with_image()).await.unwrap_err();
    assert!(matches!(err, ActionError::Unauthenticated));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn missing_city_is_a_field_error_without_backend_call() {
    let (fake, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;
    let calls_before = fake.call_count();

    let input = CaseInput { city: String::new(), ..acme() };
    let err = create(&backend, Some(&editor), input, with_image()).await.unwrap_err();

    let ActionError::Invalid(fields) = err else {
        panic!("expected Invalid, got {err:?}");
    };
    assert_eq!(serde_json::to_value(&fields).unwrap(), serde_json::json!({"city": "City is required"}));
    assert_eq!(fake.call_count(), calls_before);
    assert_eq!(fake.object_count(), 0);
}

#[tokio::test]
async fn overlong_description_is_rejected() {
    let (_, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;

    let input = CaseInput { description: "x".repeat(260), ..acme() };
    let Err(ActionError::Invalid(fields)) = create(&backend, Some(&editor), input, CaseUploads::default()).await else {
        panic!("expected Invalid");
    };
    assert_eq!(fields.get("description"), Some("Must be at most 250 characters"));

    let input = CaseInput { description: "x".repeat(250), ..acme() };
    assert!(create(&backend, Some(&editor), input, CaseUploads::default()).await.is_ok());
}

#[tokio::test]
async fn create_with_image_persists_uploaded_url() {
    let (fake, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;

    let record = create(&backend, Some(&editor), acme(), with_image()).await.unwrap();
    let url = record.image.clone().unwrap();
    assert!(fake.object_at(&url).is_some(), "persisted url must address the uploaded object");
    assert_eq!(record.creator_id, Some(editor.id));

    let stored = get(&backend, Some(&editor), record.id).await.unwrap();
    assert_eq!(stored.image, Some(url));
}

#[tokio::test]
async fn update_without_image_keeps_stored_urls() {
    let (_, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;
    let uploads = CaseUploads {
        image_before: Some(png_bytes(10, 10)),
        image_after: Some(png_bytes(10, 10)),
        ..CaseUploads::default()
    };
    let input = CaseInput { layout: CaseLayout::BeforeAfter, ..acme() };
    let record = create(&backend, Some(&editor), input.clone(), uploads).await.unwrap();

    let renamed = CaseInput { company_name: "Acme ApS".into(), ..input };
    update(&backend, Some(&editor), record.id, renamed, CaseUploads::default())
        .await
        .unwrap();

    let after = get(&backend, Some(&editor), record.id).await.unwrap();
    assert_eq!(after.company_name, "Acme ApS");
    assert_eq!(after.image_before, record.image_before);
    assert_eq!(after.image_after, record.image_after);
    assert_eq!(after.creator_id, record.creator_id);
}

#[tokio::test]
async fn update_with_new_image_replaces_only_that_slot() {
    let (_, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;
    let uploads = CaseUploads {
        image_before: Some(png_bytes(10, 10)),
        image_after: Some(png_bytes(10, 10)),
        ..CaseUploads::default()
    };
    let record = create(&backend, Some(&editor), acme(), uploads).await.unwrap();

    let replace_after = CaseUploads { image_after: Some(png_bytes(12, 12)), ..CaseUploads::default() };
    update(&backend, Some(&editor), record.id, acme(), replace_after)
        .await
        .unwrap();

    let after = get(&backend, Some(&editor), record.id).await.unwrap();
    assert_eq!(after.image_before, record.image_before);
    assert_ne!(after.image_after, record.image_after);
    assert!(after.image_after.is_some());
}

#[tokio::test]
async fn update_can_override_created_at() {
    let (_, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;
    let record = create(&backend, Some(&editor), acme(), CaseUploads::default()).await.unwrap();

    let backdated = OffsetDateTime::from_unix_timestamp(1_600_000_000).unwrap();
    let input = CaseInput { created_at: Some(backdated), ..acme() };
    update(&backend, Some(&editor), record.id, input, CaseUploads::default())
        .await
        .unwrap();

    assert_eq!(get(&backend, Some(&editor), record.id).await.unwrap().created_at, backdated);
}

#[tokio::test]
async fn update_missing_case_is_not_found() {
    let (_, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;
    let err = update(&backend, Some(&editor), 999, acme(), CaseUploads::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::NotFound { entity: "case", .. }));
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let (_, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;
    let record = create(&backend, Some(&editor), acme(), CaseUploads::default()).await.unwrap();

    delete(&backend, Some(&editor), record.id).await.unwrap();
    let err = get(&backend, Some(&editor), record.id).await.unwrap_err();
    assert!(matches!(err, ActionError::NotFound { entity: "case", .. }));

    let again = delete(&backend, Some(&editor), record.id).await.unwrap_err();
    assert!(matches!(again, ActionError::NotFound { .. }));
}

#[tokio::test]
async fn pages_cover_every_case_once_newest_first() {
    let (_, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;
    for i in 0..14 {
        let input = CaseInput { company_name: format!("Firma {i}"), ..acme() };
        create(&backend, Some(&editor), input, CaseUploads::default()).await.unwrap();
    }

    let first = list(&backend, Some(&editor), PageQuery::new(1, 6)).await.unwrap();
    assert_eq!(first.total, 14);
    let pages = (first.total + 5) / 6;

    let mut seen = Vec::new();
    for page in 1..=pages {
        let page = list(&backend, Some(&editor), PageQuery::new(page, 6)).await.unwrap();
        assert!(page.items.len() <= 6);
        seen.extend(page.items);
    }

    assert_eq!(seen.len(), 14);
    let distinct: HashSet<i64> = seen.iter().map(|c| c.id).collect();
    assert_eq!(distinct.len(), 14);
    assert!(seen.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert_eq!(seen[0].company_name, "Firma 13");
}

#[tokio::test]
async fn public_listing_needs_no_caller() {
    let (_, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;
    create(&backend, Some(&editor), acme(), CaseUploads::default()).await.unwrap();

    assert_eq!(list_published(&backend, PageQuery::default()).await.unwrap().total, 1);
    assert!(matches!(list(&backend, None, PageQuery::default()).await, Err(ActionError::Unauthenticated)));
}

#[tokio::test]
async fn insert_failure_is_wrapped_and_orphans_the_upload() {
    let (fake, backend) = MemoryBackend::bundle();
    let editor = seed_editor(&backend).await;
    fake.fail_tables(true);

    let err = create(&backend, Some(&editor), acme(), with_image()).await.unwrap_err();
    assert!(err.to_string().starts_with("failed to create case:"), "{err}");
    // Known gap: the image stored before the failed insert stays behind.
    assert_eq!(fake.object_count(), 1);
}
