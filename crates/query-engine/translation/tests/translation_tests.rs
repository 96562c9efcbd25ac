mod common;

use common::{params, translate, translate_endpoint};
use query_engine_translation::translation::error::Error;
use similar_asserts::assert_eq;

#[tokio::test]
async fn it_filters_and_loads_includes() {
    let result = translate_endpoint("modeles", params("name__contains=Alpha&rows=5&first=0"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."modeles" AS "%0_modeles" WHERE ("%0_modeles"."name" ILIKE $1)"#);
    insta::assert_snapshot!(result.rows, @r#"SELECT row_to_json("%0_modeles") AS "row", (SELECT row_to_json("%1_marques") AS "marque" FROM "public"."marques" AS "%1_marques" WHERE ("%0_modeles"."marque_id" = "%1_marques"."id") LIMIT 1) AS "marque", (SELECT row_to_json("%2_gammes") AS "gamme" FROM "public"."gammes" AS "%2_gammes" WHERE ("%0_modeles"."gamme_id" = "%2_gammes"."id") LIMIT 1) AS "gamme" FROM "public"."modeles" AS "%0_modeles" WHERE ("%0_modeles"."name" ILIKE $1) LIMIT 5 OFFSET 0"#);
    assert_eq!(result.count_params, vec!["%Alpha%".to_string()]);
    assert_eq!(result.rows_params, vec!["%Alpha%".to_string()]);
}

#[tokio::test]
async fn it_filters_and_sorts_through_a_relationship() {
    let result = translate(
        "modeles",
        params("marque__name__equals=Renault&sortField=marque.name&sortOrder=-1"),
    )
    .await
    .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."modeles" AS "%0_modeles" WHERE EXISTS (SELECT 1 FROM "public"."marques" AS "%1_marques" WHERE (("%0_modeles"."marque_id" = "%1_marques"."id") AND ("%1_marques"."name" = $1)))"#);
    insta::assert_snapshot!(result.rows, @r#"SELECT row_to_json("%0_modeles") AS "row" FROM "public"."modeles" AS "%0_modeles" WHERE EXISTS (SELECT 1 FROM "public"."marques" AS "%1_marques" WHERE (("%0_modeles"."marque_id" = "%1_marques"."id") AND ("%1_marques"."name" = $1))) ORDER BY (SELECT "%2_marques"."name" AS "name" FROM "public"."marques" AS "%2_marques" WHERE ("%0_modeles"."marque_id" = "%2_marques"."id") LIMIT 1) DESC, "%0_modeles"."id" ASC LIMIT 10 OFFSET 0"#);
    assert_eq!(result.rows_params, vec!["Renault".to_string()]);
}

#[tokio::test]
async fn it_sorts_by_a_column() {
    let result = translate("modeles", params("sortField=name"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.rows, @r#"SELECT row_to_json("%0_modeles") AS "row" FROM "public"."modeles" AS "%0_modeles" ORDER BY "%0_modeles"."name" ASC, "%0_modeles"."id" ASC LIMIT 10 OFFSET 0"#);
}

#[tokio::test]
async fn it_casts_range_values_to_the_column_type() {
    let result = translate("vehicules", params("valeur__gte=100&valeur__lte=200"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."vehicules" AS "%0_vehicules" WHERE (("%0_vehicules"."valeur" >= CAST($1 AS numeric)) AND ("%0_vehicules"."valeur" <= CAST($2 AS numeric)))"#);
    assert_eq!(
        result.count_params,
        vec!["100".to_string(), "200".to_string()]
    );
}

#[tokio::test]
async fn it_casts_booleans() {
    let result = translate("vehicules", params("statut__equals=true"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."vehicules" AS "%0_vehicules" WHERE ("%0_vehicules"."statut" = CAST($1 AS boolean))"#);
}

#[tokio::test]
async fn repeated_equals_is_membership() {
    let result = translate("modeles", params("id__equals=1&id__equals=2"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."modeles" AS "%0_modeles" WHERE ("%0_modeles"."id" IN (CAST($1 AS bigint), CAST($2 AS bigint)))"#);
    assert_eq!(result.count_params, vec!["1".to_string(), "2".to_string()]);
}

#[tokio::test]
async fn empty_lists_match_nothing_or_everything() {
    let mut raw = params("");
    raw.insert(
        "id__in".to_string(),
        query_engine_translation::translation::request::ParamValue::List(vec![]),
    );
    let result = translate("modeles", raw).await.unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."modeles" AS "%0_modeles" WHERE false"#);

    let mut raw = params("");
    raw.insert(
        "id__notEquals".to_string(),
        query_engine_translation::translation::request::ParamValue::List(vec![]),
    );
    let result = translate("modeles", raw).await.unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."modeles" AS "%0_modeles""#);
}

#[tokio::test]
async fn date_operators_compare_the_calendar_date() {
    let result = translate("vehicules", params("created_at__dateIs=2024-02-01T10:00:00"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."vehicules" AS "%0_vehicules" WHERE (CAST("%0_vehicules"."created_at" AS date) = CAST($1 AS date))"#);
    assert_eq!(result.count_params, vec!["2024-02-01".to_string()]);
}

#[tokio::test]
async fn unreadable_dates_are_sent_as_the_epoch() {
    let result = translate("vehicules", params("created_at__dateAfter=someday"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."vehicules" AS "%0_vehicules" WHERE (CAST("%0_vehicules"."created_at" AS date) > CAST($1 AS date))"#);
    assert_eq!(result.count_params, vec!["1970-01-01".to_string()]);
}

#[tokio::test]
async fn pattern_operators_match_non_text_columns_as_text() {
    let result = translate("vehicules", params("valeur__contains=99"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."vehicules" AS "%0_vehicules" WHERE (CAST("%0_vehicules"."valeur" AS text) ILIKE $1)"#);
    assert_eq!(result.count_params, vec!["%99%".to_string()]);
}

#[tokio::test]
async fn unknown_operators_apply_no_predicate() {
    let result = translate("modeles", params("name__between=1"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."modeles" AS "%0_modeles""#);

    let result = translate("modeles", params("marque__name__between=1"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."modeles" AS "%0_modeles" WHERE EXISTS (SELECT 1 FROM "public"."marques" AS "%1_marques" WHERE ("%0_modeles"."marque_id" = "%1_marques"."id"))"#);
    assert!(result.count_params.is_empty());
}

#[tokio::test]
async fn it_filters_through_a_has_many_relationship() {
    let result = translate("marques", params("modeles__name__contains=Alpha"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."marques" AS "%0_marques" WHERE EXISTS (SELECT 1 FROM "public"."modeles" AS "%1_modeles" WHERE (("%0_marques"."id" = "%1_modeles"."marque_id") AND ("%1_modeles"."name" ILIKE $1)))"#);
}

#[tokio::test]
async fn filters_combine_in_order() {
    let result = translate(
        "vehicules",
        params("couleur__equals=Blanc&modele__name__startsWith=Al&valeur__lt=150"),
    )
    .await
    .unwrap();
    insta::assert_snapshot!(result.count, @r#"SELECT COUNT(*) AS "totalRecords" FROM "public"."vehicules" AS "%0_vehicules" WHERE ((("%0_vehicules"."couleur" = $1) AND EXISTS (SELECT 1 FROM "public"."modeles" AS "%1_modeles" WHERE (("%0_vehicules"."modele_id" = "%1_modeles"."id") AND ("%1_modeles"."name" ILIKE $2)))) AND ("%0_vehicules"."valeur" < CAST($3 AS numeric)))"#);
    assert_eq!(
        result.count_params,
        vec!["Blanc".to_string(), "Al%".to_string(), "150".to_string()]
    );
}

#[tokio::test]
async fn rows_are_clamped_to_the_configured_maximum() {
    let result = translate("modeles", params("rows=1000&first=20"))
        .await
        .unwrap();
    insta::assert_snapshot!(result.rows, @r#"SELECT row_to_json("%0_modeles") AS "row" FROM "public"."modeles" AS "%0_modeles" LIMIT 100 OFFSET 20"#);
}

#[tokio::test]
async fn unknown_names_are_rejected() {
    assert_eq!(
        translate("modeles", params("foo__bar__equals=1"))
            .await
            .unwrap_err(),
        Error::RelationshipNotFound("foo".to_string(), "modeles".to_string())
    );
    assert_eq!(
        translate("modeles", params("price__gte=1"))
            .await
            .unwrap_err(),
        Error::ColumnNotFoundInCollection("price".to_string(), "modeles".to_string())
    );
    assert_eq!(
        translate("modeles", params("sortField=foo.name"))
            .await
            .unwrap_err(),
        Error::RelationshipNotFound("foo".to_string(), "modeles".to_string())
    );
    assert_eq!(
        translate("modeles", params("sortField=marque.name.long"))
            .await
            .unwrap_err(),
        Error::ColumnNotFoundInCollection("name.long".to_string(), "marques".to_string())
    );
}
