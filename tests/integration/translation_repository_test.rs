// Integration tests for the generic translation repository against an
// in-memory SQLite database.

mod database_setup;

use database_setup::{
    seed_categories, setup_test_db, translation, Category, CategoryTranslation,
};
use translatable::{CrudRepository, PageRequest, TranslatableRepository, TranslationRepository};

fn repo(pool: &sqlx::SqlitePool) -> TranslationRepository<CategoryTranslation> {
    TranslationRepository::new(pool.clone())
}

#[tokio::test]
async fn exists_by_locale_reflects_seeded_rows() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    assert!(translations.exists_by_locale("en").await.unwrap());
    assert!(translations.exists_by_locale("tr").await.unwrap());
    assert!(!translations.exists_by_locale("fr").await.unwrap());
}

#[tokio::test]
async fn exists_by_owner_id_filters_by_owner_not_locale() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    assert!(translations.exists_by_owner_id(&"drinks".to_string()).await.unwrap());
    // "empty" has no translations; other owners' rows must not leak in
    assert!(!translations.exists_by_owner_id(&"empty".to_string()).await.unwrap());
    assert!(!translations.exists_by_owner_id(&"missing".to_string()).await.unwrap());
}

#[tokio::test]
async fn exists_by_owner_id_and_locale() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    assert!(translations
        .exists_by_owner_id_and_locale(&"drinks".to_string(), "tr")
        .await
        .unwrap());
    assert!(!translations
        .exists_by_owner_id_and_locale(&"food".to_string(), "tr")
        .await
        .unwrap());
}

#[tokio::test]
async fn find_by_owner_id_returns_all_rows_ordered_by_id() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    let rows = translations
        .find_by_owner_id(&"drinks".to_string())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "tr-drinks-en");
    assert_eq!(rows[1].id, "tr-drinks-tr");
}

#[tokio::test]
async fn find_by_owner_id_paged_reports_total_across_pages() {
    let pool = setup_test_db().await;
    let categories = TranslatableRepository::<Category>::new(pool.clone());
    let translations = repo(&pool);

    categories
        .save(&database_setup::category("colors", "colors"))
        .await
        .unwrap();
    for (index, locale) in ["en", "tr", "de", "fr", "es"].iter().enumerate() {
        translations
            .save(&translation(
                &format!("tr-colors-{index}"),
                "colors",
                locale,
                "Colors",
            ))
            .await
            .unwrap();
    }

    let page = translations
        .find_by_owner_id_paged(&"colors".to_string(), PageRequest::new(0, 2))
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages(), 3);

    // Stable across repeated calls absent mutation
    let again = translations
        .find_by_owner_id_paged(&"colors".to_string(), PageRequest::new(0, 2))
        .await
        .unwrap();
    assert_eq!(page.items, again.items);
    assert_eq!(again.total, 5);

    let last = translations
        .find_by_owner_id_paged(&"colors".to_string(), PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last.total, 5);
}

#[tokio::test]
async fn find_by_owner_id_and_locale_returns_the_matching_row() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    let row = translations
        .find_by_owner_id_and_locale(&"drinks".to_string(), "tr")
        .await
        .unwrap()
        .expect("expected a tr translation");
    assert_eq!(row.name, "Icecekler");

    let absent = translations
        .find_by_owner_id_and_locale(&"drinks".to_string(), "fr")
        .await
        .unwrap();
    assert!(absent.is_none());
}

#[tokio::test]
async fn find_by_owner_id_and_locale_prefers_lowest_id_on_duplicates() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    // Violates the uniqueness invariant on purpose; the schema leaves
    // enforcement to the deploying application
    translations
        .save(&translation("tr-drinks-en-2", "drinks", "en", "Beverages"))
        .await
        .unwrap();

    let row = translations
        .find_by_owner_id_and_locale(&"drinks".to_string(), "en")
        .await
        .unwrap()
        .expect("expected an en translation");
    assert_eq!(row.id, "tr-drinks-en");
}

#[tokio::test]
async fn find_by_name_and_locale_matches_name_in_one_locale() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    translations
        .save(&translation("tr-food-tr", "food", "tr", "Yemek"))
        .await
        .unwrap();

    let rows = translations.find_by_name_and_locale("Food", "en").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category_id, "food");

    let wrong_locale = translations.find_by_name_and_locale("Food", "tr").await.unwrap();
    assert!(wrong_locale.is_empty());
}

#[tokio::test]
async fn delete_by_locale_removes_every_row_for_that_locale() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    let deleted = translations.delete_by_locale("en").await.unwrap();
    assert_eq!(deleted, 2);
    assert!(!translations.exists_by_locale("en").await.unwrap());
    // Other locales untouched
    assert!(translations.exists_by_locale("tr").await.unwrap());
}

#[tokio::test]
async fn delete_by_owner_id_and_locale_removes_at_most_one_row() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    let deleted = translations
        .delete_by_owner_id_and_locale(&"drinks".to_string(), "tr")
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let again = translations
        .delete_by_owner_id_and_locale(&"drinks".to_string(), "tr")
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn save_round_trips_and_updates_on_conflict() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    let mut row = translation("tr-food-de", "food", "de", "Essen");
    row.description = Some("Speisen und Gerichte".to_string());
    let saved = translations.save(&row).await.unwrap();
    assert_eq!(saved, row);

    let fetched = translations
        .find_by_id(&"tr-food-de".to_string())
        .await
        .unwrap()
        .expect("expected the saved row");
    assert_eq!(fetched, row);

    // Same primary key updates in place instead of inserting
    let before = translations.count().await.unwrap();
    row.name = "Lebensmittel".to_string();
    translations.save(&row).await.unwrap();
    assert_eq!(translations.count().await.unwrap(), before);

    let updated = translations
        .find_by_id(&"tr-food-de".to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Lebensmittel");
}

#[tokio::test]
async fn crud_surface_counts_lists_and_deletes() {
    let pool = setup_test_db().await;
    seed_categories(&pool).await;
    let translations = repo(&pool);

    assert_eq!(translations.count().await.unwrap(), 3);
    assert!(translations.exists_by_id(&"tr-food-en".to_string()).await.unwrap());

    let all = translations.find_all(None, None).await.unwrap();
    assert_eq!(all.len(), 3);

    let limited = translations.find_all(Some(2), Some(1)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, all[1].id);

    assert_eq!(
        translations.delete_by_id(&"tr-food-en".to_string()).await.unwrap(),
        1
    );
    assert_eq!(translations.count().await.unwrap(), 2);
}
