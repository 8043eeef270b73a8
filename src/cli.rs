use crate::Command;
use anyhow::{anyhow, Result};
use log::{debug, info};
use orgreview::api::{HttpTransport, Transport};
use orgreview::auth::Auth;
use orgreview::config::Config;
use orgreview::format::{format_duration_years, format_number, format_salary};
use orgreview::journal::{record, Journal, JournalingTransport, SharedJournal};
use orgreview::mappers::{ratings_mapper, salary_mapper};
use orgreview::models::{Account, Industry, Interview, Organisation, Post, Review};
use orgreview::search::{DefaultHost, FilterArgs, IndexedFilter, TextIndex};
use orgreview::session::{SessionStore, SubscriptionId};
use orgreview::timeago::format_timestamp;
use orgreview::validators::{validate_values, FieldRule, FormSchema};
use orgreview::{ApiService, Credentials, OrgQuery};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

/// Rows shown per picker query
const PICKER_PAGE: usize = 15;
/// Posts shown under an organisation or account
const POSTS_SHOWN: usize = 10;

pub struct Context {
    pub config: Config,
    pub session_id: String,
    pub auth: Auth<Box<dyn Transport>>,
    journal: Option<SharedJournal>,
    subscription: SubscriptionId,
}

impl Context {
    pub fn new(config: Config) -> Result<Self> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let http = HttpTransport::new(config.api.base_url(), config.api.timeout_ms());

        let journal = if config.journal.enabled() {
            let journal = Journal::in_dir(&config.journal.dir(), &session_id)?;
            debug!("journal: {}", journal.path.display());
            Some(Arc::new(Mutex::new(journal)))
        } else {
            None
        };
        let transport: Box<dyn Transport> = match &journal {
            Some(journal) => Box::new(JournalingTransport::new(http, Arc::clone(journal))),
            None => Box::new(http),
        };

        let store = Arc::new(SessionStore::new());
        let listener = journal.clone();
        let subscription = store.subscribe(move |account: Option<&Account>| {
            match account {
                Some(account) => info!("session: signed in as {}", account.username),
                None => debug!("session: signed out"),
            }
            if let Some(journal) = &listener {
                match account {
                    Some(account) => record(journal, |j| j.signed_in(&account.username)),
                    None => record(journal, |j| j.signed_out()),
                }
            }
        });

        Ok(Self {
            auth: Auth::new(ApiService::with_transport(transport), store),
            config,
            session_id,
            journal,
            subscription,
        })
    }

    pub fn api(&self) -> &ApiService<Box<dyn Transport>> {
        self.auth.api()
    }

    pub fn store(&self) -> &SessionStore {
        self.auth.store()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.auth.store().unsubscribe(self.subscription);
    }
}

pub fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Search {
            name,
            industry,
            limit,
            offset,
        } => {
            let query = OrgQuery {
                org_name: Some(name),
                industry,
                limit,
                offset,
                ..Default::default()
            };
            let orgs = ctx.api().search_orgs(&query)?;
            if orgs.is_empty() {
                println!("No organisations found");
            }
            for org in &orgs {
                println!("{:>6}  {}", org.id, org.label);
            }
        }
        Command::Org {
            id,
            review_limit,
            interview_limit,
            position,
        } => {
            let query = OrgQuery {
                review_limit,
                interview_limit,
                position,
                ..Default::default()
            };
            let org = ctx.api().get_org(id, &query)?;
            print_org(&org);
        }
        Command::Names {
            industry,
            limit,
            offset,
        } => {
            let query = OrgQuery {
                industry,
                limit,
                offset,
                ..Default::default()
            };
            for entry in ctx.api().get_org_names(&query)? {
                println!("{:>6}  {}", entry.id, entry.label);
            }
        }
        Command::Account { id } => {
            let account = ctx.api().get_account(id)?;
            print_account(&account);
        }
        Command::Login { username, password } => {
            let credentials = checked_credentials(&username, &password)?;
            let account = ctx.auth.login(&credentials)?;
            println!("Signed in as {}", account.username);
        }
        Command::Signup { username, password } => {
            let credentials = checked_credentials(&username, &password)?;
            let account = ctx.auth.signup(&credentials)?;
            println!("Created account {} ({})", account.username, account.id);
        }
        Command::Logout => {
            ctx.auth.logout()?;
            println!("Signed out");
        }
        Command::Whoami => print_whoami(ctx)?,
        Command::Pick { industry } => run_picker(ctx, industry)?,
        Command::Industries => {
            for industry in Industry::ALL_INDUSTRIES {
                println!("{:<34} {}", industry.key(), industry.label());
            }
        }
    }
    Ok(())
}

/// Rules applied to credentials before they leave the machine
fn credentials_schema() -> Result<FormSchema> {
    Ok(FormSchema::new()
        .field(
            "username",
            FieldRule::text(3, Some(32)).with_pattern(r"^[A-Za-z0-9_.-]+$")?,
        )
        .field("password", FieldRule::text(6, Some(128))))
}

fn checked_credentials(username: &str, password: &str) -> Result<Credentials> {
    let mut values = Map::new();
    values.insert("username".to_string(), json!(username));
    values.insert("password".to_string(), json!(password));

    let validation = validate_values(&values, &credentials_schema()?);
    if validation.has_errors {
        let details: Vec<String> = validation
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        return Err(anyhow!("Invalid credentials ({})", details.join("; ")));
    }
    Ok(Credentials::new(username, password))
}

fn print_whoami(ctx: &Context) -> Result<()> {
    match ctx.auth.check_session()? {
        Some(account) => {
            let role = if account.is_admin() { " [admin]" } else { "" };
            println!("{} (#{}){}", account.username, account.id, role);
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

fn print_org(org: &Organisation) {
    println!("{} (#{})", org.name, org.id);
    println!("  Industry:     {}", org.industry);
    println!("  Headquarters: {}", org.headquarters);
    println!("  Size:         {} employees", format_number(org.size));
    if let Some(url) = &org.url {
        println!("  Website:      {}", url);
    }
    println!(
        "  {} reviews, {} interviews",
        org.reviews.len(),
        org.interviews.len()
    );
    print_posts(&org.posts());
}

fn print_account(account: &Account) {
    println!("{} (#{})", account.username, account.id);
    println!("  Joined {}", format_timestamp(account.created_at));
    if !account.is_active() {
        println!("  Account is not active");
    }
    print_posts(&account.posts());
}

fn print_posts(posts: &[Post]) {
    for post in posts.iter().take(POSTS_SHOWN) {
        println!();
        match post {
            Post::Review(review) => print_review(review),
            Post::Interview(interview) => print_interview(interview),
        }
        println!(
            "    score {:+}  ·  {}",
            post.score(),
            format_timestamp(post.created_at())
        );
    }
    if posts.len() > POSTS_SHOWN {
        println!("\n  ... {} more", posts.len() - POSTS_SHOWN);
    }
}

fn print_review(review: &Review) {
    let tag = review.tag.map(ratings_mapper).unwrap_or("Unrated");
    println!("  [review] {} in {} ({})", review.position, review.location, tag);
    println!(
        "    {} for {}",
        format_salary(review.salary, review.currency),
        format_duration_years(review.duration_years)
    );
    println!("    {}", review.review);
}

fn print_interview(interview: &Interview) {
    let tag = interview.tag.map(ratings_mapper).unwrap_or("Unrated");
    println!(
        "  [interview] {} in {} ({})",
        interview.position, interview.location, tag
    );
    match (interview.offer, interview.currency) {
        (Some(offer), Some(currency)) => println!("    Offer: {}", format_salary(offer, currency)),
        (Some(offer), None) => println!("    Offer: {}", format_number(offer)),
        (None, Some(currency)) => println!("    No offer ({})", salary_mapper(currency)),
        (None, None) => {}
    }
    println!("    {}", interview.interview);
}

/// Interactive picker over the preloaded organisation names.
///
/// Only a page of names is ever "visible", as with a dropdown fed a capped
/// list; queries go through the index so every preloaded name is reachable.
pub fn run_picker(ctx: &Context, industry: Option<Industry>) -> Result<()> {
    let query = OrgQuery {
        industry,
        limit: Some(ctx.config.search.preload_limit()),
        ..Default::default()
    };
    let names = ctx.api().get_org_names(&query)?;
    let original: Vec<Value> = names
        .iter()
        .map(|entry| json!({ "value": entry.id, "label": entry.label }))
        .collect();
    let index = TextIndex::from_labels(names.iter().map(|entry| entry.label.as_str()));
    let filter =
        IndexedFilter::new(&index, &original).with_max_results(ctx.config.search.max_results());
    let visible = &original[..original.len().min(PICKER_PAGE)];
    debug!(
        "picker: {} names indexed, {} visible",
        index.len(),
        visible.len()
    );

    let mut rl = DefaultEditor::new()?;
    let mut last: Vec<Value> = Vec::new();

    println!(
        "orgreview - {} organisations loaded. Type to search, /help for commands, /exit to quit",
        original.len()
    );

    loop {
        match rl.readline("org> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if line.starts_with('/') {
                    if handle_command(ctx, line, &last) {
                        break;
                    }
                    continue;
                }

                let args = FilterArgs {
                    filter_text: line,
                    items: Some(visible),
                    ..Default::default()
                };
                last = filter.filter(&args, &DefaultHost);
                print_results(&last);
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

fn print_results(results: &[Value]) {
    if results.is_empty() {
        println!("No matches");
        return;
    }
    for (n, item) in results.iter().take(PICKER_PAGE).enumerate() {
        let label = item.get("label").and_then(Value::as_str).unwrap_or("?");
        println!("  {:>2}. {}", n + 1, label);
    }
    if results.len() > PICKER_PAGE {
        println!("  ... {} more, refine the search", results.len() - PICKER_PAGE);
    }
}

/// Returns true when the picker should exit
fn handle_command(ctx: &Context, cmd: &str, last: &[Value]) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let result: Result<()> = match parts[0] {
        "/exit" | "/quit" => return true,
        "/help" => {
            println!("Commands:");
            println!("  <text>                  - search organisation names");
            println!("  /open <n>               - show result n from the last search");
            println!("  /login <user> <pass>    - sign in");
            println!("  /logout                 - sign out");
            println!("  /whoami                 - show the signed-in account");
            println!("  /session                - show session info");
            println!("  /exit                   - quit");
            Ok(())
        }
        "/session" => {
            println!("Session: {}", ctx.session_id);
            if let Some(journal) = &ctx.journal {
                let path = journal
                    .lock()
                    .map(|j| j.path.display().to_string())
                    .unwrap_or_default();
                println!("Journal: {}", path);
            }
            match ctx.store().current() {
                Some(account) => println!("Signed in as {}", account.username),
                None => println!("Not signed in"),
            }
            Ok(())
        }
        "/open" => open_result(ctx, parts.get(1).copied(), last),
        "/login" => match (parts.get(1), parts.get(2)) {
            (Some(username), Some(password)) => checked_credentials(username, password)
                .and_then(|c| ctx.auth.login(&c).map_err(Into::into))
                .map(|account| println!("Signed in as {}", account.username)),
            _ => Err(anyhow!("Usage: /login <username> <password>")),
        },
        "/logout" => ctx
            .auth
            .logout()
            .map(|_| println!("Signed out"))
            .map_err(Into::into),
        "/whoami" => print_whoami(ctx),
        other => Err(anyhow!("Unknown command: {}. Type /help", other)),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }
    false
}

fn open_result(ctx: &Context, arg: Option<&str>, last: &[Value]) -> Result<()> {
    let n: usize = arg
        .ok_or_else(|| anyhow!("Usage: /open <n>"))?
        .parse()
        .map_err(|_| anyhow!("Expected a result number"))?;
    let item = n
        .checked_sub(1)
        .and_then(|i| last.get(i))
        .ok_or_else(|| anyhow!("No result {} in the last search", n))?;
    let id = item
        .get("value")
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow!("Result {} has no organisation id", n))?;

    let org = ctx.api().get_org(id, &OrgQuery::default())?;
    print_org(&org);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgreview::search::SearchIndex;

    #[test]
    fn test_checked_credentials_accepts_valid() {
        let credentials = checked_credentials("kim_lee", "hunter22").unwrap();
        assert_eq!(credentials.username, "kim_lee");
    }

    #[test]
    fn test_checked_credentials_reports_every_field() {
        let err = checked_credentials("k!", "pw").unwrap_err().to_string();
        assert!(err.contains("username"));
        assert!(err.contains("password"));
    }

    #[test]
    fn test_picker_reaches_items_beyond_visible_page() {
        let labels: Vec<String> = (0..40).map(|n| format!("Company {}", n)).collect();
        let original: Vec<Value> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| json!({ "value": i, "label": l }))
            .collect();
        let index = TextIndex::from_labels(&labels);
        let filter = IndexedFilter::new(&index, &original);
        let args = FilterArgs {
            filter_text: "37",
            items: Some(&original[..PICKER_PAGE]),
            ..Default::default()
        };
        let results = filter.filter(&args, &DefaultHost);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["value"], 37);
        assert_eq!(index.search("company", 5).len(), 5);
    }
}
