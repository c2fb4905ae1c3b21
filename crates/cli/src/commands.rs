use crate::context::{AppCatalog, AppContext};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, Utc};
use clap::ArgMatches;
use console::style;
use shelfscan_auth::{AuthState, TokenSet};
use shelfscan_catalog::{export, import, BookQuery, DataFormat, SortOrder, StoreStatus};
use shelfscan_core::{
    classify, convert_jan_to_isbn, is_valid_isbn13, jan_hypotheses, normalize_code,
    resolve_lookup_plan, AppError, BookId, BookRecord, CatalogBook, CodeKind, LookupSource,
};
use shelfscan_lookup::{
    AttemptStatus, LookupExecutor, LookupOutcome, MetadataSource, SourceMetadata,
};
use shelfscan_scanner::{BarcodeScanner, CloudTextDetector, VisionClient};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

/// Classify a scanned code
pub fn classify_code(matches: &ArgMatches) -> Result<()> {
    let code = normalize_code(required(matches, "code")?);
    let kind = classify(&code);

    println!("Code: {}", code);
    println!("Kind: {}", style(kind).bold());
    if code.len() == 13 {
        let checksum = if is_valid_isbn13(&code) {
            style("valid").green()
        } else {
            style("invalid").red()
        };
        println!("ISBN-13 checksum: {}", checksum);
    }
    if kind == CodeKind::JapaneseJan {
        match convert_jan_to_isbn(&code) {
            Some(isbn) => println!("Converts to ISBN: {}", isbn),
            None => println!("No ISBN recoverable from this JAN"),
        }
    }

    Ok(())
}

/// Convert a JAN to an ISBN-13
pub fn convert_code(matches: &ArgMatches) -> Result<()> {
    let code = normalize_code(required(matches, "code")?);

    if matches.get_flag("explain") {
        let candidates: Vec<_> = jan_hypotheses(&code).collect();
        if candidates.is_empty() {
            println!("{} is not a Japanese book JAN", code);
        }
        for (i, h) in candidates.iter().enumerate() {
            println!("{:>2}. {}  {}", i + 1, h.candidate, style(h.rule).dim());
        }
    }

    match convert_jan_to_isbn(&code) {
        Some(isbn) => println!("{} {} → {}", style("✓").green().bold(), code, style(isbn).bold()),
        None => bail!("No ISBN could be recovered from {}", code),
    }

    Ok(())
}

/// Show the lookup plan for a code
pub fn show_plan(matches: &ArgMatches) -> Result<()> {
    let code = normalize_code(required(matches, "code")?);
    let plan = resolve_lookup_plan(&code);

    println!("{} classified as {}", code, style(plan.kind).bold());
    for (i, attempt) in plan.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, attempt.source, attempt.code);
    }

    Ok(())
}

/// Look up metadata for a code
pub fn lookup_code(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let code = required(matches, "code")?;
    let executor = ctx.lookup_executor()?;
    let outcome = executor.lookup(code);

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
        return Ok(());
    }

    print_attempts(&outcome);
    match &outcome.record {
        Some(record) => {
            println!();
            print_record(record);
        }
        None => println!("\nNo metadata found for {}", code),
    }

    Ok(())
}

/// Add a book, optionally filled in from a lookup
pub fn add_book(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let mut record = BookRecord::default();

    if let Some(code) = matches.get_one::<String>("code") {
        let code = normalize_code(code);
        if ctx.offline {
            println!("Offline: skipping metadata lookup for {}", code);
        } else {
            let outcome = ctx.lookup_executor()?.lookup(&code);
            match found_record(outcome) {
                Some((provider, found)) => {
                    println!("Found metadata via {}", provider);
                    record = found;
                }
                None => println!("No metadata found for {}; using the values given", code),
            }
        }
        if record.isbn.is_none() {
            record.isbn = isbn_for_code(&code);
        }
    }

    record.merge(record_from_matches(matches));
    if record.title.is_none() {
        bail!("A title is required: pass --title or a code that can be looked up");
    }

    let location = matches
        .get_one::<String>("location")
        .map(String::as_str)
        .unwrap_or_default();

    let mut catalog = ctx.open_catalog()?;
    let book = catalog
        .add_book(record, location)
        .map_err(AppError::from)
        .context("Failed to add book")?;
    warn_if_degraded(&catalog);

    println!("{} Book added successfully!", style("✓").green().bold());
    println!("  ID: {}", book.id);
    println!("  Title: {}", book.title());
    println!("  Location: {}", book.location);

    Ok(())
}

/// List books
pub fn list_books(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let sort = matches
        .get_one::<String>("sort")
        .map(|s| s.parse::<SortOrder>())
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or_default();

    let query = BookQuery {
        search: None,
        category: matches.get_one::<String>("category").cloned(),
        location: matches.get_one::<String>("location").cloned(),
        sort,
    };

    let mut catalog = ctx.open_catalog()?;
    let books = catalog
        .query(&query)
        .map_err(AppError::from)
        .context("Failed to list books")?;
    warn_if_degraded(&catalog);

    if matches.get_flag("json") {
        println!("{}", export::export_json(&books)?);
        return Ok(());
    }

    if books.is_empty() {
        println!("No books in catalog. Use 'add' or 'import' to catalog books.");
        return Ok(());
    }

    println!("\n{} Books in Catalog", style(books.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for book in &books {
        print_book_summary(book);
    }

    Ok(())
}

/// Search titles, authors and ISBNs
pub fn search_books(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let query = required(matches, "query")?;

    let mut catalog = ctx.open_catalog()?;
    let results = catalog
        .search(query)
        .map_err(AppError::from)
        .context("Failed to search books")?;

    if results.is_empty() {
        println!("No books found matching '{}'", query);
        return Ok(());
    }

    println!(
        "\n{} Search Results for '{}'",
        style(results.len()).bold().cyan(),
        query
    );
    println!("{}", "=".repeat(80));
    for book in &results {
        print_book_summary(book);
    }

    Ok(())
}

/// Show one book
pub fn show_book(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let mut catalog = ctx.open_catalog()?;
    let book = find_book(&mut catalog, required(matches, "id")?)?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&book)?);
        return Ok(());
    }

    println!("\n{}", style("Book Information").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("ID: {}", book.id);
    print_record(&book.record);
    println!("Location: {}", book.location);
    println!("Added: {}", book.added_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    if let Some(updated) = book.updated_at {
        println!("Updated: {}", updated.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    }

    Ok(())
}

/// Edit a book
pub fn update_book(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let edits = record_from_matches(matches);
    let location = matches.get_one::<String>("location").cloned();
    if edits.is_empty() && location.is_none() {
        bail!("Nothing to update: pass at least one field flag");
    }

    let mut catalog = ctx.open_catalog()?;
    let book = find_book(&mut catalog, required(matches, "id")?)?;

    let updated = catalog
        .update_book(&book.id, |b| {
            b.record.merge(edits);
            if let Some(location) = location {
                b.location = location;
            }
        })
        .map_err(AppError::from)
        .context("Failed to update book")?;
    warn_if_degraded(&catalog);

    println!("{} Book updated: {}", style("✓").green().bold(), updated.title());

    Ok(())
}

/// Delete a book
pub fn delete_book(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let mut catalog = ctx.open_catalog()?;
    let book = find_book(&mut catalog, required(matches, "id")?)?;

    if !matches.get_flag("force") {
        println!("Are you sure you want to delete '{}'? (y/N)", book.title());
        let input = read_line()?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    catalog
        .delete_book(&book.id)
        .map_err(AppError::from)
        .context("Failed to delete book")?;
    warn_if_degraded(&catalog);

    println!("{} Book deleted: {}", style("✓").green().bold(), book.title());

    Ok(())
}

/// List locations with book counts
pub fn list_locations(ctx: &AppContext) -> Result<()> {
    let mut catalog = ctx.open_catalog()?;
    let books = catalog.books().map_err(AppError::from)?;
    let locations = catalog.locations().map_err(AppError::from)?;

    if locations.is_empty() {
        println!("No locations yet.");
        return Ok(());
    }

    let counts = count_by_location(&books);
    println!("\n{}", style("Locations").bold().cyan());
    println!("{}", "=".repeat(80));
    for location in &locations {
        println!(
            "  {}  {}",
            style(location).bold(),
            style(format!("({})", counts.get(location.as_str()).copied().unwrap_or(0))).dim()
        );
    }

    Ok(())
}

/// Export the catalog
pub fn export_catalog(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let format = crate::parse_format(matches.get_one::<String>("format")).unwrap_or(DataFormat::Json);
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format.export_file_name(Local::now().date_naive())));

    let mut catalog = ctx.open_catalog()?;
    let books = catalog.books().map_err(AppError::from)?;
    let contents = export::export(&books, format)
        .map_err(AppError::from)
        .context("Failed to export catalog")?;

    std::fs::write(&output, contents)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} Exported {} books to {}",
        style("✓").green().bold(),
        books.len(),
        output.display()
    );

    Ok(())
}

/// Import books from a file
pub fn import_catalog(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("file")
        .ok_or_else(|| anyhow!("File is required"))?;
    let format = crate::parse_format(matches.get_one::<String>("format"))
        .or_else(|| DataFormat::from_path(path))
        .ok_or_else(|| anyhow!("Cannot tell the format of {}; pass --format", path.display()))?;

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entries = import::import(&text, format)
        .map_err(AppError::from)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let mut catalog = ctx.open_catalog()?;
    let books = catalog.import_entries(entries).map_err(AppError::from)?;
    warn_if_degraded(&catalog);

    println!(
        "{} Imported {} books from {}",
        style("✓").green().bold(),
        books.len(),
        path.display()
    );

    Ok(())
}

/// Read a book code from a photo
pub fn scan_image(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    ctx.require_online("Scanning")?;
    let image = matches
        .get_one::<PathBuf>("image")
        .ok_or_else(|| anyhow!("Image path is required"))?;

    let vision = VisionClient::from_config(&ctx.config.scanner).map_err(AppError::from)?;
    let mut scanner = BarcodeScanner::new(CloudTextDetector::new(vision, ctx.oauth_client()?));
    let report = scanner
        .scan_file(image)
        .map_err(AppError::from)
        .with_context(|| format!("Failed to scan {}", image.display()))?;

    for detected in &report.codes {
        println!("  {:?}: {}", detected.kind, detected.code);
    }

    let Some(isbn) = report.isbn else {
        println!("No book code found in {}", image.display());
        return Ok(());
    };
    println!("{} ISBN {}", style("✓").green().bold(), style(&isbn).bold());

    if matches.get_flag("lookup") {
        let outcome = ctx.lookup_executor()?.lookup(&isbn);
        match &outcome.record {
            Some(record) => print_record(record),
            None => println!("No metadata found for {}", isbn),
        }
    }

    Ok(())
}

/// Sign in through the browser
pub fn auth_login(ctx: &AppContext) -> Result<()> {
    ctx.require_online("Sign-in")?;
    let mut client = ctx.oauth_client()?;
    let url = client.authorization_url().map_err(AppError::from)?;

    println!("Open this URL in a browser and approve access:\n\n  {}\n", url);
    print!("Paste the full address you were redirected to: ");
    std::io::stdout().flush()?;

    let (code, state) = parse_callback(&read_line()?)?;
    client
        .exchange_code(&code, &state)
        .map_err(AppError::from)
        .context("Sign-in failed")?;

    println!("{} Signed in", style("✓").green().bold());
    if let Some(tokens) = client.tokens() {
        println!("  Token valid until {}", describe_expiry(tokens));
    }

    Ok(())
}

/// Show sign-in state
pub fn auth_status(ctx: &AppContext) -> Result<()> {
    let client = ctx.oauth_client()?;

    if !ctx.config.auth.is_configured() {
        println!("Sign-in is not configured (set auth.client_id)");
        return Ok(());
    }

    println!("State: {}", style_auth_state(client.state()));
    if let Some(tokens) = client.tokens() {
        println!("Expires: {}", describe_expiry(tokens));
        println!(
            "Refresh token: {}",
            if tokens.can_refresh() { "stored" } else { "none" }
        );
    }

    Ok(())
}

/// Forget stored tokens
pub fn auth_logout(ctx: &AppContext) -> Result<()> {
    ctx.oauth_client()?.logout().map_err(AppError::from)?;
    println!("{} Signed out", style("✓").green().bold());
    Ok(())
}

/// Catalog and service overview
pub fn show_status(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let mut catalog = ctx.open_catalog()?;

    if matches.get_flag("reconnect") {
        match catalog.reconnect() {
            Ok(count) => println!(
                "{} Remote store online ({} cached books uploaded)",
                style("✓").green().bold(),
                count
            ),
            Err(e) => println!("{} Reconnect failed: {}", style("✗").red().bold(), e),
        }
    }

    let books = catalog.books().map_err(AppError::from)?;
    let locations = catalog.locations().map_err(AppError::from)?;
    let categories = catalog.categories().map_err(AppError::from)?;

    println!("\n{}", style("ShelfScan Status").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("Config: {}", ctx.manager.config_path().display());
    println!("Catalog: {}", ctx.local_store_path().display());
    println!("Store: {}", style_store_status(&catalog.status()));
    println!("Books: {}", style(books.len()).bold());
    println!("Locations: {}", locations.len());
    if !categories.is_empty() {
        println!("Categories: {}", categories.join(", "));
    }
    if ctx.offline {
        println!("Mode: {}", style("offline").yellow());
    } else if ctx.config.auth.is_configured() {
        println!("Sign-in: {}", style_auth_state(ctx.oauth_client()?.state()));
    }

    let executor = LookupExecutor::from_config(&ctx.config.lookup);
    println!("\nMetadata sources:");
    for kind in LookupSource::ALL {
        if let Some(source) = executor.source(kind) {
            let marker = if source.is_available() && !ctx.offline {
                style("✓").green().bold()
            } else {
                style("✗").red().bold()
            };
            println!("  {} {}", marker, describe_source(kind, &source.metadata()));
        }
    }

    Ok(())
}

/// Write a default config file
pub fn config_init(ctx: &AppContext) -> Result<()> {
    let path = ctx.manager.config_path();
    if ctx.manager.initialize()? {
        println!("{} Created {}", style("✓").green().bold(), path.display());
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

/// Print the effective configuration with secrets masked
pub fn config_show(ctx: &AppContext) -> Result<()> {
    let mut config = ctx.config.clone();
    mask(&mut config.lookup.google_books_api_key);
    mask(&mut config.storage.auth_token);
    mask(&mut config.auth.client_secret);

    print!("{}", toml::to_string_pretty(&config).context("Failed to render config")?);

    if let Err(errors) = config.validate() {
        println!();
        for error in errors {
            println!("{} {}", style("!").yellow().bold(), error);
        }
    }

    Ok(())
}

pub fn config_path(ctx: &AppContext) -> Result<()> {
    println!("{}", ctx.manager.config_path().display());
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} is required", name))
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input)
}

/// Field flags of `add`/`update` as a partial record
fn record_from_matches(matches: &ArgMatches) -> BookRecord {
    let text = |name: &str| {
        matches
            .get_one::<String>(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    BookRecord {
        title: text("title"),
        author: text("author"),
        publisher: text("publisher"),
        publish_date: text("published"),
        pages: matches.get_one::<u32>("pages").copied(),
        category: text("category"),
        description: text("description"),
        isbn: text("isbn").map(|i| normalize_code(&i)),
        ..BookRecord::default()
    }
}

/// The record a lookup produced and the name of the source that served it
fn found_record(outcome: LookupOutcome) -> Option<(String, BookRecord)> {
    let provider = outcome.provider().unwrap_or("lookup").to_string();
    outcome.record.map(|record| (provider, record))
}

/// ISBN to store for a scanned code, when one is known
fn isbn_for_code(code: &str) -> Option<String> {
    match classify(code) {
        CodeKind::Isbn13 | CodeKind::Isbn10 => Some(code.to_string()),
        CodeKind::JapaneseJan => convert_jan_to_isbn(code),
        CodeKind::Unknown => None,
    }
}

/// Resolves a full id or a unique id prefix
fn find_book(catalog: &mut AppCatalog, id: &str) -> Result<CatalogBook> {
    if let Ok(book_id) = id.parse::<BookId>() {
        return catalog
            .get_book(&book_id)
            .map_err(AppError::from)?
            .ok_or_else(|| anyhow!("Book not found: {}", id));
    }

    let prefix = id.to_lowercase();
    let mut matching: Vec<CatalogBook> = catalog
        .books()
        .map_err(AppError::from)?
        .into_iter()
        .filter(|b| b.id.to_string().starts_with(&prefix))
        .collect();

    match matching.len() {
        0 => bail!("Book not found: {}", id),
        1 => Ok(matching.remove(0)),
        n => bail!("'{}' matches {} books; use more of the ID", id, n),
    }
}

/// Extracts `code` and `state` from the OAuth redirect address
fn parse_callback(input: &str) -> Result<(String, String)> {
    let url = url::Url::parse(input.trim()).context("Not a valid URL")?;
    let params: BTreeMap<String, String> = url.query_pairs().into_owned().collect();

    if let Some(error) = params.get("error") {
        bail!("Authorization was denied: {}", error);
    }
    let code = params
        .get("code")
        .ok_or_else(|| anyhow!("The address has no 'code' parameter"))?;
    let state = params
        .get("state")
        .ok_or_else(|| anyhow!("The address has no 'state' parameter"))?;

    Ok((code.clone(), state.clone()))
}

fn describe_source(kind: LookupSource, meta: &SourceMetadata) -> String {
    let mut line = format!("{} ({}) {}", meta.name, kind, meta.base_url);
    if meta.requires_auth {
        line.push_str(" [sign-in required]");
    }
    if !meta.description.is_empty() {
        line.push_str(&format!("\n      {}", meta.description));
    }
    line
}

fn count_by_location(books: &[CatalogBook]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for book in books {
        *counts.entry(book.location.trim()).or_insert(0) += 1;
    }
    counts
}

fn mask(secret: &mut String) {
    if !secret.is_empty() {
        *secret = "********".to_string();
    }
}

fn warn_if_degraded(catalog: &AppCatalog) {
    if let StoreStatus::Degraded { reason } = catalog.status() {
        eprintln!(
            "{} Remote store unavailable, changes saved locally ({})",
            style("!").yellow().bold(),
            reason
        );
    }
}

fn describe_expiry(tokens: &TokenSet) -> String {
    let remaining = tokens.expires_at - Utc::now();
    let when = tokens.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    if remaining.num_seconds() > 0 {
        format!("{} (in {} min)", when, remaining.num_minutes())
    } else {
        format!("{} (expired)", when)
    }
}

fn style_auth_state(state: AuthState) -> console::StyledObject<AuthState> {
    match state {
        AuthState::Valid => style(state).green(),
        AuthState::Expired | AuthState::Refreshing => style(state).yellow(),
        AuthState::Unauthenticated => style(state).dim(),
    }
}

fn style_store_status(status: &StoreStatus) -> console::StyledObject<String> {
    let text = status.to_string();
    match status {
        StoreStatus::Online => style(text).green(),
        StoreStatus::Degraded { .. } => style(text).yellow(),
    }
}

fn outcome_json(outcome: &LookupOutcome) -> serde_json::Value {
    let attempts: Vec<serde_json::Value> = outcome
        .attempts
        .iter()
        .map(|a| {
            serde_json::json!({
                "source": a.source,
                "provider": a.provider,
                "code": a.code,
                "status": a.status.to_string(),
            })
        })
        .collect();

    serde_json::json!({
        "kind": outcome.plan.kind,
        "attempts": attempts,
        "record": outcome.record,
    })
}

fn print_attempts(outcome: &LookupOutcome) {
    println!("Classified as {}", style(outcome.plan.kind).bold());
    for report in &outcome.attempts {
        let marker = match report.status {
            AttemptStatus::Found => style("✓").green().bold(),
            AttemptStatus::Empty | AttemptStatus::Skipped => style("·").dim(),
            AttemptStatus::Failed(_) => style("✗").red().bold(),
        };
        let name = report
            .provider
            .clone()
            .unwrap_or_else(|| report.source.to_string());
        println!("  {} {}: {}", marker, name, report.status);
    }
}

fn print_record(record: &BookRecord) {
    let field = |label: &str, value: &Option<String>| {
        if let Some(value) = value {
            println!("{}: {}", label, value);
        }
    };

    println!("Title: {}", style(record.title.as_deref().unwrap_or("(untitled)")).bold());
    field("Author", &record.author);
    field("Publisher", &record.publisher);
    field("Published", &record.publish_date);
    if let Some(pages) = record.pages {
        println!("Pages: {}", pages);
    }
    field("ISBN", &record.isbn);
    field("Category", &record.category);
    field("Language", &record.language);
    field("Source", &record.source);
    if let Some(description) = &record.description {
        println!("\nDescription:\n{}", description);
    }
}

fn print_book_summary(book: &CatalogBook) {
    println!("\n{}", style(book.title()).bold());
    if !book.author().is_empty() {
        println!("  by {}", book.author());
    }
    println!(
        "  ID: {} | Location: {}{}",
        truncate(&book.id.to_string(), 8),
        book.location,
        book.record
            .isbn
            .as_deref()
            .map(|isbn| format!(" | ISBN: {}", isbn))
            .unwrap_or_default()
    );
}

fn truncate(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests;
