use super::*;
use shelfscan_catalog::{BookStore, Catalog, MemoryStore};
use shelfscan_lookup::AttemptReport;

fn sub_matches(args: &[&str]) -> ArgMatches {
    let matches = crate::build_cli()
        .try_get_matches_from(args)
        .expect("arguments should parse");
    let (_, sub) = matches.subcommand().expect("a subcommand");
    sub.clone()
}

fn catalog_with(titles: &[&str]) -> (AppCatalog, Vec<CatalogBook>) {
    let store: Box<dyn BookStore> = Box::new(MemoryStore::new());
    let mut catalog = Catalog::new(store, "Unsorted");
    let books = titles
        .iter()
        .map(|t| catalog.add_book(BookRecord::titled(*t), "Shelf A").unwrap())
        .collect();
    (catalog, books)
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is a longer string", 7), "this is...");
}

#[test]
fn test_truncate_multibyte() {
    assert_eq!(truncate("吾輩は猫である", 3), "吾輩は...");
}

#[test]
fn test_record_from_matches_collects_fields() {
    let sub = sub_matches(&[
        "shelfscan", "add", "--title", " Dune ", "-a", "Frank Herbert", "--pages", "412",
        "--isbn", "978-0-441-17271-9", "--description", "",
    ]);
    let record = record_from_matches(&sub);

    assert_eq!(record.title.as_deref(), Some("Dune"));
    assert_eq!(record.author.as_deref(), Some("Frank Herbert"));
    assert_eq!(record.pages, Some(412));
    assert_eq!(record.isbn.as_deref(), Some("9780441172719"));
    assert_eq!(record.description, None);
    assert_eq!(record.publisher, None);
}

#[test]
fn test_record_from_matches_empty_update() {
    let sub = sub_matches(&["shelfscan", "update", "abc"]);
    assert!(record_from_matches(&sub).is_empty());
}

#[test]
fn test_isbn_for_code() {
    assert_eq!(isbn_for_code("9784822283940").as_deref(), Some("9784822283940"));
    assert_eq!(isbn_for_code("4822283941").as_deref(), Some("4822283941"));
    assert_eq!(isbn_for_code("4914822283940").as_deref(), Some("9784822283940"));
    assert_eq!(isbn_for_code("12345"), None);
}

#[test]
fn test_find_book_by_full_id() {
    let (mut catalog, books) = catalog_with(&["Dune", "Emma"]);
    let found = find_book(&mut catalog, &books[1].id.to_string()).unwrap();
    assert_eq!(found.title(), "Emma");
}

#[test]
fn test_find_book_by_prefix() {
    let (mut catalog, books) = catalog_with(&["Dune"]);
    let prefix = &books[0].id.to_string()[..6];
    let found = find_book(&mut catalog, &prefix.to_uppercase()).unwrap();
    assert_eq!(found.id, books[0].id);
}

#[test]
fn test_find_book_ambiguous_and_missing() {
    let (mut catalog, _) = catalog_with(&["Dune", "Emma"]);

    // Every UUID string starts with a hex digit, so the empty prefix matches all
    let err = find_book(&mut catalog, "").unwrap_err();
    assert!(err.to_string().contains("matches 2 books"));

    let err = find_book(&mut catalog, "zzzz").unwrap_err();
    assert!(err.to_string().contains("Book not found"));

    let missing = BookId::new().to_string();
    assert!(find_book(&mut catalog, &missing).is_err());
}

#[test]
fn test_parse_callback() {
    let (code, state) =
        parse_callback("http://localhost:8080/callback?state=abc123&code=4%2F0Adeu&scope=books\n")
            .unwrap();
    assert_eq!(code, "4/0Adeu");
    assert_eq!(state, "abc123");
}

#[test]
fn test_parse_callback_errors() {
    let err = parse_callback("http://localhost/callback?error=access_denied&state=x").unwrap_err();
    assert!(err.to_string().contains("access_denied"));

    assert!(parse_callback("http://localhost/callback?state=x").is_err());
    assert!(parse_callback("http://localhost/callback?code=x").is_err());
    assert!(parse_callback("not a url").is_err());
}

#[test]
fn test_count_by_location() {
    let books = vec![
        CatalogBook::new(BookRecord::titled("A"), "Shelf A"),
        CatalogBook::new(BookRecord::titled("B"), "Shelf A "),
        CatalogBook::new(BookRecord::titled("C"), "Box 1"),
    ];
    let counts = count_by_location(&books);
    assert_eq!(counts.get("Shelf A"), Some(&2));
    assert_eq!(counts.get("Box 1"), Some(&1));
}

#[test]
fn test_mask() {
    let mut secret = "hunter2".to_string();
    mask(&mut secret);
    assert_eq!(secret, "********");

    let mut empty = String::new();
    mask(&mut empty);
    assert!(empty.is_empty());
}

#[test]
fn test_outcome_json_shape() {
    let outcome = LookupOutcome {
        plan: resolve_lookup_plan("4914822283940"),
        record: None,
        attempts: Vec::new(),
    };
    let value = outcome_json(&outcome);
    assert_eq!(value["kind"], "japanese_jan");
    assert!(value["record"].is_null());
}

#[test]
fn test_found_record_names_serving_provider() {
    let outcome = LookupOutcome {
        plan: resolve_lookup_plan("4914822283940"),
        record: Some(BookRecord::titled("日経")),
        attempts: vec![
            AttemptReport {
                source: LookupSource::JanCatalog,
                provider: Some("openBD".to_string()),
                code: "4914822283940".to_string(),
                status: AttemptStatus::Empty,
            },
            AttemptReport {
                source: LookupSource::IsbnCatalog,
                provider: Some("Google Books".to_string()),
                code: "4914822283940".to_string(),
                status: AttemptStatus::Found,
            },
        ],
    };

    let (provider, record) = found_record(outcome).unwrap();
    assert_eq!(provider, "Google Books");
    assert_eq!(record.title.as_deref(), Some("日経"));
}

#[test]
fn test_found_record_empty_outcome() {
    let outcome = LookupOutcome {
        plan: resolve_lookup_plan("12345"),
        record: None,
        attempts: Vec::new(),
    };
    assert!(found_record(outcome).is_none());
}

#[test]
fn test_describe_source() {
    let meta = SourceMetadata {
        name: "NDL".to_string(),
        description: "National bibliography".to_string(),
        base_url: "https://ndlsearch.ndl.go.jp/api/opensearch".to_string(),
        requires_auth: true,
    };
    let line = describe_source(LookupSource::SecondaryIsbnCatalog, &meta);
    assert!(line.starts_with("NDL (secondary ISBN catalog) https://ndlsearch"));
    assert!(line.contains("[sign-in required]"));
    assert!(line.ends_with("National bibliography"));
}

#[test]
fn test_status_lists_every_configured_source() {
    let executor = LookupExecutor::from_config(&shelfscan_config::LookupConfig::default());
    for kind in LookupSource::ALL {
        let source = executor.source(kind).expect("registered source");
        assert!(!describe_source(kind, &source.metadata()).is_empty());
    }
}
