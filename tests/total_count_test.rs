use listing_query::{
    prepare_query_builder_for_total_count, AnyQueryBuilder, DatabaseBackend, LegacyColumn,
    LegacyQuery, ListingDao, ListingSpecification, OrderDirection, QueryBuilder,
};

#[test]
fn test_primary_query_becomes_count() {
    let mut query = QueryBuilder::new(DatabaseBackend::Postgres)
        .from("users")
        .select(vec!["id", "name"])
        .where_eq("active", true)
        .order_by("name", OrderDirection::Asc)
        .limit(10)
        .offset(5);

    prepare_query_builder_for_total_count(&mut query);

    assert_eq!(query.select_columns(), ["COUNT(*)".to_string()]);
    assert!(query.order_by_clauses().is_empty());
    assert_eq!(query.max_results(), None);
    assert_eq!(query.first_result(), 0);

    let (sql, params) = query.build().unwrap();
    assert_eq!(sql, "SELECT COUNT(*) FROM \"users\" WHERE \"active\" = $1");
    assert_eq!(params.len(), 1);
}

#[test]
fn test_legacy_query_becomes_count() {
    let mut query = LegacyQuery::new(DatabaseBackend::MySQL).from("users", ["id", "name"]);
    query.where_("active = 1");
    query.order("name DESC");
    query.limit(Some(10), 5);

    prepare_query_builder_for_total_count(&mut query);

    assert_eq!(
        query.columns_part(),
        [LegacyColumn::Expression("COUNT(*)".to_string())]
    );
    assert!(query.order_part().is_empty());
    assert_eq!(query.limit_count(), None);
    assert_eq!(query.limit_offset(), 0);

    let (sql, _) = query.assemble().unwrap();
    assert_eq!(sql, "SELECT COUNT(*) FROM `users` WHERE (active = 1)");
}

#[test]
fn test_count_rewrite_is_idempotent() {
    let mut query = QueryBuilder::new(DatabaseBackend::SQLite)
        .from("users")
        .order_by("id", OrderDirection::Desc);

    prepare_query_builder_for_total_count(&mut query);
    let once = query.clone();
    prepare_query_builder_for_total_count(&mut query);

    assert_eq!(query, once);
}

#[test]
fn test_total_count_query_keeps_filter_and_grouping() {
    let spec = ListingSpecification::new()
        .with_condition("score > 10")
        .with_group_by("team")
        .with_order_key(["score"])
        .with_order(["desc"])
        .with_offset(100)
        .with_limit(25);
    let dao = ListingDao::new(spec, "players");

    let count = dao.total_count_query().unwrap();
    let (sql, _) = count.to_sql().unwrap();
    assert_eq!(
        sql,
        "SELECT COUNT(*) FROM \"players\" WHERE score > 10 GROUP BY \"team\""
    );

    let page = dao.load_query().unwrap();
    let (sql, _) = page.to_sql().unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM \"players\" WHERE score > 10 GROUP BY \"team\" \
         ORDER BY \"score\" DESC LIMIT 25 OFFSET 100"
    );
}

#[test]
fn test_total_count_query_on_legacy_backend() {
    let spec = ListingSpecification::new()
        .with_condition("score > 10")
        .with_order_key(["score"])
        .with_limit(25);
    let dao = ListingDao::new(spec, "players")
        .with_backend(DatabaseBackend::SQLite)
        .with_legacy_compatibility(true);

    let count = dao.total_count_query().unwrap();

    assert!(matches!(count, AnyQueryBuilder::Legacy(_)));
    let (sql, _) = count.to_sql().unwrap();
    assert_eq!(sql, "SELECT COUNT(*) FROM \"players\" WHERE (score > 10)");
}
