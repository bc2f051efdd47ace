use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use release_changelog_builder::changelog::collector::{validate_mode, DEFAULT_MAX_PULL_REQUESTS};
use release_changelog_builder::changelog::tags::DEFAULT_MAX_TAGS_TO_FETCH;
use release_changelog_builder::changelog::template::contributors;
use release_changelog_builder::changelog::{
    collect_pull_requests, fallback_changelog, generate_changelog, resolve_tags, CollectRequest,
    Mode, ResolvedTags, TagQuery,
};
use release_changelog_builder::config::{resolve_configuration, Configuration};
use release_changelog_builder::environment::{
    api_base_url, detect_owner_repo, detect_platform, detect_token, Environment, OwnerRepo,
};
use release_changelog_builder::error::ChangelogError;
use release_changelog_builder::git::GitRepository;
use release_changelog_builder::outputs::ActionOutputs;
use release_changelog_builder::provider::{create_provider, Provider, TagInfo};

/// Every option can also come from the `INPUT_*` variable a CI runner sets for
/// the matching action input.
#[derive(Parser)]
#[command(name = "release-changelog-builder")]
#[command(about = "Build a release changelog from the pull requests and commits between two tags")]
struct Cli {
    /// Hosting platform: github, gitea, local or git (detected when omitted)
    #[arg(long, env = "INPUT_PLATFORM")]
    platform: Option<String>,

    /// API token (falls back to GITHUB_TOKEN / GITEA_TOKEN)
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API base URL of the platform
    #[arg(long, env = "INPUT_BASEURL")]
    base_url: Option<String>,

    /// Repository as owner/repo or clone URL
    #[arg(long, env = "INPUT_REPO")]
    repo: Option<String>,

    /// Path of the local checkout
    #[arg(long, env = "INPUT_PATH")]
    path: Option<String>,

    /// Older tag of the range (defaults to the tag before --to-tag)
    #[arg(long, env = "INPUT_FROMTAG")]
    from_tag: Option<String>,

    /// Newer tag of the range (defaults to the CI tag ref, then the latest tag)
    #[arg(long, env = "INPUT_TOTAG")]
    to_tag: Option<String>,

    /// PR, COMMIT or HYBRID
    #[arg(long, env = "INPUT_MODE")]
    mode: Option<String>,

    /// Configuration as inline JSON
    #[arg(long, env = "INPUT_CONFIGURATIONJSON")]
    configuration_json: Option<String>,

    /// Configuration file, relative to the repository path
    #[arg(long, env = "INPUT_CONFIGURATION")]
    configuration: Option<String>,

    /// Skip pre-release tags when looking for the previous tag
    #[arg(long, env = "INPUT_IGNOREPRERELEASES", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    ignore_pre_releases: bool,

    /// Put the annotation of the newer tag at the top of the changelog
    #[arg(long, env = "INPUT_FETCHTAGANNOTATIONS", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    fetch_tag_annotations: bool,

    /// Text placed before the changelog
    #[arg(long, env = "INPUT_PREFIXMESSAGE")]
    prefix_message: Option<String>,

    /// Text placed after the changelog
    #[arg(long, env = "INPUT_POSTFIXMESSAGE")]
    postfix_message: Option<String>,

    /// Also list pull requests that are still open
    #[arg(long, env = "INPUT_INCLUDEOPEN", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    include_open: bool,

    /// Exit with status 1 when the changelog could not be built
    #[arg(long, env = "INPUT_FAILONERROR", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    fail_on_error: bool,

    /// Upper bound of tags searched when resolving the range
    #[arg(long, env = "INPUT_MAXTAGSTOFETCH", default_value_t = DEFAULT_MAX_TAGS_TO_FETCH)]
    max_tags_to_fetch: usize,

    /// Upper bound of pull requests fetched per query
    #[arg(long, env = "INPUT_MAXPULLREQUESTS", default_value_t = DEFAULT_MAX_PULL_REQUESTS)]
    max_pull_requests: usize,

    /// Debug logging
    #[arg(short, long, env = "INPUT_VERBOSE", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    verbose: bool,

    /// Write the changelog to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn prefix_message(&self) -> Option<&str> {
        self.prefix_message.as_deref().filter(|m| !m.trim().is_empty())
    }

    fn postfix_message(&self) -> Option<&str> {
        self.postfix_message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the changelog, so logs go to stderr
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let env = Environment::capture();
    let repository_path = non_blank(cli.path.as_deref())
        .or_else(|| env.workspace())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let config = resolve_configuration(
        &repository_path,
        cli.configuration_json.as_deref(),
        cli.configuration.as_deref(),
    );

    let outputs = match run(&cli, &env, &repository_path, &config).await {
        Ok(outputs) => {
            info!("✅ Changelog generated successfully");
            outputs
        }
        Err(err) => {
            error!("❌ {:#}", err);
            ActionOutputs::failure(fallback_changelog(
                &config,
                &err,
                cli.prefix_message(),
                cli.postfix_message(),
            ))
        }
    };

    outputs.publish(&env, cli.output.as_deref())?;

    if outputs.failed && cli.fail_on_error {
        std::process::exit(1);
    }

    Ok(())
}

async fn run(
    cli: &Cli,
    env: &Environment,
    repository_path: &Path,
    config: &Configuration,
) -> Result<ActionOutputs, ChangelogError> {
    let platform = detect_platform(cli.platform.as_deref(), cli.path.as_deref(), env)?;
    let mode: Mode = cli.mode.as_deref().unwrap_or_default().parse()?;
    validate_mode(mode, platform)?;

    let base_url = api_base_url(platform, cli.base_url.as_deref(), env);
    let token = detect_token(platform, cli.token.as_deref(), env)?;

    let remote_url = if platform.is_local() {
        GitRepository::new(repository_path).remote_origin_url().await
    } else {
        None
    };
    let OwnerRepo { owner, repo } =
        detect_owner_repo(cli.repo.as_deref(), platform, env, remote_url.as_deref())?;
    info!("ℹ️ Processing {}/{} on {} ({} mode)", owner, repo, platform, mode);

    let provider = create_provider(platform, token, base_url, repository_path.to_path_buf())?;

    let query = TagQuery {
        from_tag: cli.from_tag.as_deref(),
        to_tag: cli.to_tag.as_deref(),
        ci_ref: env.event_ref(platform),
        max_tags_to_fetch: cli.max_tags_to_fetch,
        ignore_pre_releases: cli.ignore_pre_releases,
        ..TagQuery::new(&owner, &repo, repository_path, platform)
    };
    let ResolvedTags { from_tag, to_tag } = resolve_tags(provider.as_ref(), &query).await?;
    info!("ℹ️ Comparing {}...{}", from_tag.name, to_tag.name);

    let tag_annotation = if cli.fetch_tag_annotations {
        tag_annotation(provider.as_ref(), &to_tag).await
    } else {
        None
    };

    let request = CollectRequest {
        owner: &owner,
        repo: &repo,
        from_tag: &from_tag,
        to_tag: &to_tag,
        mode,
        include_open: cli.include_open,
        platform,
        max_pull_requests: cli.max_pull_requests,
    };
    let pull_requests = collect_pull_requests(provider.as_ref(), &request).await?;
    info!("ℹ️ Found {} items to include in changelog", pull_requests.len());

    let changelog = generate_changelog(
        &pull_requests,
        config,
        tag_annotation.as_deref(),
        cli.prefix_message(),
        cli.postfix_message(),
    );

    Ok(ActionOutputs {
        changelog,
        from_tag: from_tag.name,
        to_tag: to_tag.name,
        contributors: contributors(&pull_requests).join(", "),
        pull_requests: ActionOutputs::pull_request_numbers(&pull_requests),
        tag_annotation: tag_annotation.unwrap_or_default(),
        failed: false,
        owner,
        repo,
    })
}

/// A missing annotation never fails the run.
async fn tag_annotation(provider: &dyn Provider, tag: &TagInfo) -> Option<String> {
    if let Some(annotation) = tag.annotation.as_deref().filter(|a| !a.trim().is_empty()) {
        return Some(annotation.to_string());
    }

    match provider.get_tag_annotation(&tag.name).await {
        Ok(Some(annotation)) => {
            info!("ℹ️ Retrieved tag annotation for {}", tag.name);
            Some(annotation)
        }
        Ok(None) => None,
        Err(e) => {
            warn!("⚠️ Could not fetch annotation for {}: {:#}", tag.name, e);
            None
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
