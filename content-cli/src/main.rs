use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{info, warn};

use content_client::{ClientConfig, FetchClient, PageSource, SortSpec, ENV_API_TOKEN, ENV_API_URL};
use content_common::{
    extract_headings, Attributes, BlogPost, Certification, Document, Education, Experience,
    Project, Publication, Resource, Skill,
};
use content_feed::{fetch_all, IncrementalPaginator, LoadOutcome, ResourceView};
use content_filter::{FilterState, SortBy};

const DEFAULT_PAGE_SIZE: u32 = 25;

fn cli() -> Command {
    Command::new("portfolio-content")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Read, filter and sort portfolio content from the headless backend")
        .arg(Arg::new("url")
            .long("url")
            .value_name("URL")
            .env(ENV_API_URL)
            .help("Backend base URL")
            .required(true))
        .arg(Arg::new("token")
            .long("token")
            .value_name("TOKEN")
            .env(ENV_API_TOKEN)
            .hide_env_values(true)
            .help("API token sent as a bearer credential")
            .required(true))
        .arg(Arg::new("resource")
            .value_name("RESOURCE")
            .help("Collection name, e.g. blogs, projects, skills")
            .required(true))
        .arg(Arg::new("all")
            .short('a')
            .long("all")
            .help("Load every page before filtering")
            .action(ArgAction::SetTrue)
            .conflicts_with("pages"))
        .arg(Arg::new("pages")
            .long("pages")
            .value_name("N")
            .help("Number of pages to load incrementally")
            .value_parser(clap::value_parser!(u32).range(1..))
            .default_value("1"))
        .arg(Arg::new("page_size")
            .long("page-size")
            .value_name("M")
            .help("Items per page")
            .value_parser(clap::value_parser!(u32).range(1..))
            .default_value("25"))
        .arg(Arg::new("search")
            .long("search")
            .value_name("TERM")
            .help("Case-insensitive search over title, teaser, body and categories"))
        .arg(Arg::new("category")
            .long("category")
            .value_name("NAME")
            .help("Only items in this category"))
        .arg(Arg::new("sort")
            .long("sort")
            .value_name("ORDER")
            .value_parser(["newest", "oldest", "alphabetical"])
            .default_value("newest"))
        .arg(Arg::new("slug")
            .long("slug")
            .value_name("SLUG")
            .help("Print a single item instead of a listing")
            .conflicts_with_all(["all", "search", "category", "categories"]))
        .arg(Arg::new("toc")
            .long("toc")
            .help("With --slug, print the heading outline of the item body")
            .action(ArgAction::SetTrue)
            .requires("slug"))
        .arg(Arg::new("categories")
            .long("categories")
            .help("Print the category list of the loaded items")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Debug logging (overridden by RUST_LOG)")
            .action(ArgAction::SetTrue))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_sort<R: Resource>() -> Option<SortSpec> {
    R::DEFAULT_SORT.map(|(field, direction)| SortSpec::new(field, direction))
}

/// Server-side order for the collections the site knows about.
fn server_sort(resource: &str) -> Option<SortSpec> {
    let known: [(&str, fn() -> Option<SortSpec>); 7] = [
        (BlogPost::PATH, default_sort::<BlogPost>),
        (Project::PATH, default_sort::<Project>),
        (Education::PATH, default_sort::<Education>),
        (Experience::PATH, default_sort::<Experience>),
        (Publication::PATH, default_sort::<Publication>),
        (Certification::PATH, default_sort::<Certification>),
        (Skill::PATH, default_sort::<Skill>),
    ];
    known
        .iter()
        .find(|(path, _)| *path == resource)
        .and_then(|(_, sort)| sort())
}

fn filter_state(matches: &ArgMatches) -> Result<FilterState> {
    let mut state = FilterState::new();
    if let Some(term) = matches.get_one::<String>("search") {
        state = state.with_search(term.as_str());
    }
    if let Some(category) = matches.get_one::<String>("category") {
        state = state.with_category(category.as_str());
    }
    if let Some(sort) = matches.get_one::<String>("sort") {
        state = state.with_sort(SortBy::from_str(sort)?);
    }
    Ok(state)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("failed to serialize output")?);
    Ok(())
}

fn render<S: PageSource<Document>>(
    view: &ResourceView<S, Document>,
    state: FilterState,
    categories_only: bool,
) -> Result<()> {
    view.set_filter_state(state);
    let snapshot = view.snapshot();

    if let Some(error) = &snapshot.error {
        if snapshot.loaded == 0 {
            bail!("nothing loaded: {} ({})", error.message, error.kind);
        }
        warn!(kind = error.kind, message = %error.message, "listing is incomplete");
    }
    info!(
        loaded = snapshot.loaded,
        shown = snapshot.items.len(),
        has_more = snapshot.has_more,
        "listing ready"
    );

    if categories_only {
        print_json(&snapshot.categories)
    } else {
        print_json(&snapshot)
    }
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let url = matches.get_one::<String>("url").context("missing --url")?;
    let token = matches.get_one::<String>("token").context("missing --token")?;
    let resource = matches
        .get_one::<String>("resource")
        .context("missing resource")?;
    let page_size = *matches.get_one::<u32>("page_size").unwrap_or(&DEFAULT_PAGE_SIZE);

    let config = ClientConfig::new(url.as_str(), token.as_str()).context("invalid configuration")?;
    let client = Arc::new(FetchClient::from_config(&config).context("failed to build HTTP client")?);

    if let Some(slug) = matches.get_one::<String>("slug") {
        let item = client
            .find_by_slug::<Document>(resource, slug)
            .await
            .with_context(|| format!("failed to look up `{slug}` in {resource}"))?;
        let Some(item) = item else {
            bail!("no {resource} entry with slug `{slug}`");
        };
        return if matches.get_flag("toc") {
            print_json(&extract_headings(item.attributes.body().unwrap_or_default()))
        } else {
            print_json(&item)
        };
    }

    let mut collection = client.collection::<Document>(resource.as_str());
    if let Some(sort) = server_sort(resource) {
        collection = collection.with_default_sort(sort);
    }
    let state = filter_state(matches)?;
    let categories_only = matches.get_flag("categories");

    if matches.get_flag("all") {
        let result = fetch_all(&collection, page_size, None).await;
        info!(pages = result.pages_fetched, items = result.items.len(), "exhaustive load finished");
        render(&ResourceView::from_exhaustive(result), state, categories_only)
    } else {
        let pages = *matches.get_one::<u32>("pages").unwrap_or(&1);
        let paginator = IncrementalPaginator::new(collection, page_size);
        for _ in 0..pages {
            if !matches!(paginator.load_next().await, LoadOutcome::Loaded { .. }) {
                break;
            }
        }
        render(&ResourceView::incremental(paginator), state, categories_only)
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    if let Err(e) = run(&matches).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn known_collections_get_their_default_sort() {
        assert_eq!(server_sort("blogs").map(|s| s.to_query_value()), Some("publishedAt:desc".into()));
        assert_eq!(server_sort("skills").map(|s| s.to_query_value()), Some("name:asc".into()));
        assert_eq!(server_sort("unknown"), None);
    }

    #[test]
    fn filter_arguments_build_state() {
        let matches = cli().get_matches_from([
            "portfolio-content",
            "--url",
            "https://cms.example.com",
            "--token",
            "secret",
            "blogs",
            "--search",
            "rust",
            "--category",
            "AI",
            "--sort",
            "alphabetical",
        ]);
        let state = filter_state(&matches).unwrap();
        assert_eq!(state.search_term, "rust");
        assert_eq!(state.active_category, "AI");
        assert_eq!(state.sort_by, SortBy::Alphabetical);
    }

    #[test]
    fn all_conflicts_with_pages() {
        let result = cli().try_get_matches_from([
            "portfolio-content",
            "--url",
            "https://cms.example.com",
            "--token",
            "secret",
            "blogs",
            "--all",
            "--pages",
            "3",
        ]);
        assert!(result.is_err());
    }
}
