use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::error::{ChangelogError, Result};
use crate::provider::types::{Platform, TagInfo};
use crate::provider::Provider;

/// Most repositories have fewer tags than this, so it is fetched first.
pub const INITIAL_TAG_LIMIT: usize = 200;
pub const DEFAULT_MAX_TAGS_TO_FETCH: usize = 1000;

const TAG_REF_PREFIX: &str = "refs/tags/";

static PRE_RELEASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?\d+(\.\d+)*-[0-9A-Za-z.\-]+").expect("pre-release pattern is valid")
});

/// Inputs for [`resolve_tags`].
#[derive(Debug, Clone)]
pub struct TagQuery<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub repository_path: &'a Path,
    pub platform: Platform,
    pub from_tag: Option<&'a str>,
    pub to_tag: Option<&'a str>,
    /// Ref of the CI event that started the run, e.g. `refs/tags/v1.2.0`.
    pub ci_ref: Option<&'a str>,
    pub max_tags_to_fetch: usize,
    pub ignore_pre_releases: bool,
}

impl<'a> TagQuery<'a> {
    pub fn new(owner: &'a str, repo: &'a str, repository_path: &'a Path, platform: Platform) -> Self {
        Self {
            owner,
            repo,
            repository_path,
            platform,
            from_tag: None,
            to_tag: None,
            ci_ref: None,
            max_tags_to_fetch: DEFAULT_MAX_TAGS_TO_FETCH,
            ignore_pre_releases: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTags {
    pub from_tag: TagInfo,
    pub to_tag: TagInfo,
}

pub fn is_pre_release(tag_name: &str) -> bool {
    PRE_RELEASE.is_match(tag_name)
}

/// Newest-first tag list that grows to `max_tags_to_fetch` the first time a
/// lookup misses.
pub struct TagCatalog<'p> {
    provider: &'p dyn Provider,
    owner: String,
    repo: String,
    max_tags_to_fetch: usize,
    tags: Vec<TagInfo>,
}

impl<'p> TagCatalog<'p> {
    pub async fn load(
        provider: &'p dyn Provider,
        owner: &str,
        repo: &str,
        max_tags_to_fetch: usize,
    ) -> Result<TagCatalog<'p>> {
        let initial_limit = INITIAL_TAG_LIMIT.min(max_tags_to_fetch);
        let tags = provider.get_tags(owner, repo, initial_limit).await?;
        if tags.is_empty() {
            return Err(ChangelogError::NoTagsFound);
        }
        debug!("Fetched {} tags (limit: {})", tags.len(), initial_limit);

        Ok(Self {
            provider,
            owner: owner.to_string(),
            repo: repo.to_string(),
            max_tags_to_fetch,
            tags,
        })
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn latest(&self) -> Option<&TagInfo> {
        self.tags.first()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tags.iter().position(|t| t.name == name)
    }

    pub async fn find(&mut self, tag_name: &str) -> Result<Option<TagInfo>> {
        let name = tag_name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        if let Some(index) = self.position(name) {
            return Ok(Some(self.tags[index].clone()));
        }

        if self.tags.len() < self.max_tags_to_fetch {
            debug!(
                "Tag '{}' not found in first {} tags, fetching more...",
                name,
                self.tags.len()
            );
            let tags = self
                .provider
                .get_tags(&self.owner, &self.repo, self.max_tags_to_fetch)
                .await?;
            // Keep what we had if the larger request came back short.
            if tags.len() > self.tags.len() {
                self.tags = tags;
            }
            debug!(
                "Fetched {} total tags (up to limit: {})",
                self.tags.len(),
                self.max_tags_to_fetch
            );
        }

        Ok(self.position(name).map(|index| self.tags[index].clone()))
    }

    /// The next older tag after `tag_name`, optionally skipping pre-releases.
    pub fn predecessor(&self, tag_name: &str, ignore_pre_releases: bool) -> Option<TagInfo> {
        let index = self.position(tag_name)?;
        self.tags[index + 1..]
            .iter()
            .find(|tag| !(ignore_pre_releases && is_pre_release(&tag.name)))
            .cloned()
    }
}

/// Picks the `(from, to)` tag pair for the changelog.
///
/// `to` comes from the first step that yields a tag: explicit input, the CI tag
/// ref, the newest tag. `from` is the explicit input or the tag right before
/// `to`. A missing explicit `to` degrades to auto-detection; a missing explicit
/// `from` is an error.
pub async fn resolve_tags(provider: &dyn Provider, query: &TagQuery<'_>) -> Result<ResolvedTags> {
    let mut catalog =
        TagCatalog::load(provider, query.owner, query.repo, query.max_tags_to_fetch).await?;

    let explicit_from = match non_blank(query.from_tag) {
        Some(name) => match catalog.find(name).await? {
            Some(tag) => Some(tag),
            None => {
                return Err(ChangelogError::TagNotFound {
                    name: name.to_string(),
                    searched: catalog.len(),
                    max_tags_to_fetch: query.max_tags_to_fetch,
                })
            }
        },
        None => None,
    };

    let mut to_tag = explicit_to_tag(&mut catalog, query).await?;
    if to_tag.is_none() {
        to_tag = context_tag(&mut catalog, query).await?;
    }
    let to_tag = match to_tag {
        Some(tag) => tag,
        None => {
            let latest = catalog.latest().cloned().ok_or(ChangelogError::NoTagsFound)?;
            info!("✓ Auto-detected toTag (latest): {}", latest.name);
            latest
        }
    };

    let from_tag = match explicit_from {
        Some(tag) => {
            info!("✓ Using provided fromTag: {}", tag.name);
            tag
        }
        None => {
            let previous = catalog
                .predecessor(&to_tag.name, query.ignore_pre_releases)
                .ok_or_else(|| ChangelogError::NoPredecessorTag {
                    to_tag: to_tag.name.clone(),
                    searched: catalog.len(),
                    max_tags_to_fetch: query.max_tags_to_fetch,
                })?;
            info!("✓ Auto-detected fromTag (previous): {}", previous.name);
            previous
        }
    };

    let to_tag = fill(provider, query, to_tag).await?;
    let from_tag = fill(provider, query, from_tag).await?;

    Ok(ResolvedTags { from_tag, to_tag })
}

async fn explicit_to_tag(catalog: &mut TagCatalog<'_>, query: &TagQuery<'_>) -> Result<Option<TagInfo>> {
    let Some(name) = non_blank(query.to_tag) else {
        return Ok(None);
    };

    let found = catalog.find(name).await?;
    match &found {
        Some(tag) => info!("✓ Using provided toTag: {}", tag.name),
        None => warn!(
            "⚠️ toTag '{}' not found in repository. Falling back to latest tag. Searched {} tag(s).",
            name,
            catalog.len()
        ),
    }
    Ok(found)
}

async fn context_tag(catalog: &mut TagCatalog<'_>, query: &TagQuery<'_>) -> Result<Option<TagInfo>> {
    let Some(tag_name) = query.ci_ref.and_then(|r| r.strip_prefix(TAG_REF_PREFIX)) else {
        return Ok(None);
    };
    debug!("Detected tag from {} context: {}", query.platform, tag_name);

    let found = catalog.find(tag_name).await?;
    match &found {
        Some(tag) => info!("✓ Using toTag from context: {}", tag.name),
        None => debug!("Tag {} not found in repository tags", tag_name),
    }
    Ok(found)
}

async fn fill(provider: &dyn Provider, query: &TagQuery<'_>, tag: TagInfo) -> Result<TagInfo> {
    Ok(provider
        .fill_tag_information(query.repository_path, query.owner, query.repo, tag)
        .await?)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
